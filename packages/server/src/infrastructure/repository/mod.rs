//! Repository パターンの実装
//!
//! ドメイン層が定義する Repository trait の具体的な実装を提供します。
//! UseCase 層は trait（ドメイン層）に依存し、この実装に直接依存しません（依存性の逆転）。

pub mod inmemory;
pub mod postgres;

use std::sync::Arc;

pub use inmemory::{
    InMemoryAddonRepository, InMemorySeenRepository, InMemoryTrackingRepository,
    InMemoryUserRepository,
};
pub use postgres::PostgresStore;

use crate::domain::{
    AddonRepository, RepositoryError, SeenRepository, TrackingRepository, UserRepository,
};

/// The four repositories the tracker needs, behind trait objects
#[derive(Clone)]
pub struct Repositories {
    pub seen: Arc<dyn SeenRepository>,
    pub tracking: Arc<dyn TrackingRepository>,
    pub addons: Arc<dyn AddonRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// Fresh in-memory stores
    pub fn in_memory() -> Self {
        Self {
            seen: Arc::new(InMemorySeenRepository::new()),
            tracking: Arc::new(InMemoryTrackingRepository::new()),
            addons: Arc::new(InMemoryAddonRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
        }
    }

    /// PostgreSQL stores sharing one pool; tables are created when missing
    pub async fn postgres(url: &str) -> Result<Self, RepositoryError> {
        let store = Arc::new(PostgresStore::connect(url).await?);
        Ok(Self {
            seen: store.clone(),
            tracking: store.clone(),
            addons: store.clone(),
            users: store,
        })
    }

    /// PostgreSQL when `database_url` is set, otherwise in-memory
    pub async fn from_url(database_url: Option<&str>) -> Result<Self, RepositoryError> {
        match database_url {
            Some(url) => {
                tracing::info!("Using PostgreSQL repositories");
                Self::postgres(url).await
            }
            None => {
                tracing::info!("No database configured; using in-memory repositories");
                Ok(Self::in_memory())
            }
        }
    }
}
