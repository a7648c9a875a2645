//! D100: retail sales & returns dashboard.
//!
//! The dataset is loaded once (SQLite export first, CSV second), cached in a
//! [`cache::DatasetCache`] and aggregated per request.

pub mod cache;
pub mod csv_source;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod repository;
pub mod service;
pub mod source;

pub use cache::DatasetCache;
pub use error::LoadError;
pub use loader::SalesLoader;
pub use model::{OrderRecord, SalesTable};
