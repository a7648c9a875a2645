use async_trait::async_trait;

use super::error::LoadError;
use super::model::SalesTable;

/// A place order records can be loaded from
#[async_trait]
pub trait SalesSource: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &str;

    /// Read the whole table.
    ///
    /// A missing backing file is reported as `LoadError::SourceUnavailable`.
    async fn load(&self) -> Result<SalesTable, LoadError>;
}
