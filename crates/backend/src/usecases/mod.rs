pub mod u100_build_sales_db;
