//! InMemory Addon Repository 実装

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{AddonRecord, AddonRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryAddonRepository {
    records: Arc<Mutex<BTreeMap<String, AddonRecord>>>,
}

impl InMemoryAddonRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AddonRepository for InMemoryAddonRepository {
    async fn upsert_all(&self, records: &[AddonRecord]) -> Result<(), RepositoryError> {
        let mut stored = self.records.lock().await;
        for record in records {
            stored.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<AddonRecord>, RepositoryError> {
        let stored = self.records.lock().await;
        Ok(stored.values().cloned().collect())
    }
}
