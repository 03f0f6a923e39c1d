//! UseCase: アドオンカタログの同期

use std::sync::Arc;

use tokio::sync::RwLock;

use super::error::SyncCatalogError;
use crate::{
    domain::{AddonRepository, TrackCatalog},
    infrastructure::{parser::parse_catalog, source::CatalogSource},
};

pub type SharedCatalog = Arc<RwLock<TrackCatalog>>;

pub struct SyncCatalogUseCase {
    source: Arc<dyn CatalogSource>,
    repository: Arc<dyn AddonRepository>,
    catalog: SharedCatalog,
}

impl SyncCatalogUseCase {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        repository: Arc<dyn AddonRepository>,
        catalog: SharedCatalog,
    ) -> Self {
        Self {
            source,
            repository,
            catalog,
        }
    }

    /// Fill the in-memory catalog from the store, before the first remote sync
    pub async fn load_cached(&self) -> Result<usize, SyncCatalogError> {
        let records = self.repository.load_all().await?;
        self.catalog.write().await.refresh(&records);
        Ok(records.len())
    }

    /// Fetch the remote catalog, store it and refresh the in-memory names.
    ///
    /// The in-memory catalog is refreshed even when the store write fails.
    pub async fn execute(&self) -> Result<usize, SyncCatalogError> {
        let body = self.source.fetch_catalog().await?;
        let records = parse_catalog(&body)?;

        self.catalog.write().await.refresh(&records);
        self.repository.upsert_all(&records).await?;

        tracing::info!("Synced {} addon tracks", records.len());
        Ok(records.len())
    }
}
