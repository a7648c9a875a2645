use super::csv_source::CsvSalesSource;
use super::error::LoadError;
use super::model::SalesTable;
use super::repository::SqliteSalesSource;
use super::source::SalesSource;
use crate::shared::config::DataConfig;

/// Two-step loader: the primary source first, then the fallback.
///
/// Only recoverable primary failures (and an empty primary table) fall
/// through. An unavailable or empty fallback ends in `LoadError::NoData`.
pub struct SalesLoader {
    primary: Box<dyn SalesSource>,
    fallback: Box<dyn SalesSource>,
}

impl SalesLoader {
    pub fn new(primary: Box<dyn SalesSource>, fallback: Box<dyn SalesSource>) -> Self {
        Self { primary, fallback }
    }

    /// SQLite export first, CSV second
    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(
            Box::new(SqliteSalesSource::new(&config.database_path)),
            Box::new(CsvSalesSource::new(&config.csv_path)),
        )
    }

    pub async fn load(&self) -> Result<SalesTable, LoadError> {
        match self.primary.load().await {
            Ok(table) if !table.is_empty() => return Ok(table),
            Ok(_) => {
                tracing::warn!(
                    "Source {} returned no rows, trying {}",
                    self.primary.name(),
                    self.fallback.name()
                );
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!(
                    "Source {} unavailable ({}), trying {}",
                    self.primary.name(),
                    e,
                    self.fallback.name()
                );
            }
            Err(e) => return Err(e),
        }

        match self.fallback.load().await {
            Ok(table) if !table.is_empty() => Ok(table),
            Ok(_) => {
                tracing::error!("Source {} returned no rows", self.fallback.name());
                Err(LoadError::NoData)
            }
            Err(e @ LoadError::SourceUnavailable { .. }) => {
                tracing::error!("{}", e);
                Err(LoadError::NoData)
            }
            Err(e) => Err(e),
        }
    }
}
