use std::sync::Arc;
use tokio::sync::RwLock;

use super::error::LoadError;
use super::loader::SalesLoader;
use super::model::SalesTable;

/// Loaded-once dataset, owned by whoever serves the dashboard.
///
/// The first `get` runs the loader and keeps the table until `invalidate`
/// is called. Failed loads are not cached.
pub struct DatasetCache {
    loader: SalesLoader,
    slot: RwLock<Option<Arc<SalesTable>>>,
}

impl DatasetCache {
    pub fn new(loader: SalesLoader) -> Self {
        Self {
            loader,
            slot: RwLock::new(None),
        }
    }

    pub async fn get(&self) -> Result<Arc<SalesTable>, LoadError> {
        if let Some(table) = self.slot.read().await.as_ref() {
            return Ok(table.clone());
        }

        let mut slot = self.slot.write().await;
        // Another request may have loaded it while we waited for the lock
        if let Some(table) = slot.as_ref() {
            return Ok(table.clone());
        }

        let table = Arc::new(self.loader.load().await?);
        tracing::info!(
            "Sales dataset cached: {} rows (synthetic dates: {})",
            table.len(),
            table.synthetic_dates
        );
        *slot = Some(table.clone());
        Ok(table)
    }

    pub async fn invalidate(&self) {
        self.slot.write().await.take();
        tracing::info!("Sales dataset cache invalidated");
    }

    /// Drop the cached table and load it again
    pub async fn reload(&self) -> Result<Arc<SalesTable>, LoadError> {
        self.invalidate().await;
        self.get().await
    }
}
