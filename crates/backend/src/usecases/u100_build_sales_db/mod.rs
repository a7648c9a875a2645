//! U100: clean the sales CSV and write it to the SQLite `sales` table.

pub mod executor;
