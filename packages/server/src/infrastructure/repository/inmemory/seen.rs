//! InMemory Seen Repository 実装
//!
//! username をキーにした BTreeMap を DB 代わりに使います。
//! 前方一致検索の結果がユーザー名順で安定するように BTreeMap を選んでいます。

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{RepositoryError, SeenRecord, SeenRepository, SeenUpdate, Username};

#[derive(Default)]
pub struct InMemorySeenRepository {
    records: Arc<Mutex<BTreeMap<Username, SeenRecord>>>,
}

impl InMemorySeenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn upsert(&self, updates: &[SeenUpdate], seen_at: DateTime<Utc>, keep_country: bool) {
        let mut records = self.records.lock().await;
        for update in updates {
            let country = match records.get(&update.username) {
                Some(existing) if keep_country => existing.country.clone(),
                _ => update.country.clone(),
            };
            records.insert(
                update.username.clone(),
                SeenRecord {
                    username: update.username.clone(),
                    country,
                    server_name: update.server_name.clone(),
                    server_country: update.server_country.clone(),
                    seen_at,
                },
            );
        }
    }
}

#[async_trait]
impl SeenRepository for InMemorySeenRepository {
    async fn upsert_with_country(
        &self,
        updates: &[SeenUpdate],
        seen_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.upsert(updates, seen_at, false).await;
        Ok(())
    }

    async fn upsert_without_country(
        &self,
        updates: &[SeenUpdate],
        seen_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.upsert(updates, seen_at, true).await;
        Ok(())
    }

    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<SeenRecord>, RepositoryError> {
        let prefix = prefix.to_lowercase();
        let records = self.records.lock().await;
        Ok(records
            .values()
            .find(|r| r.username.as_str().to_lowercase().starts_with(&prefix))
            .cloned())
    }
}
