//! Repository trait 定義
//!
//! 永続化の抽象。実装はインフラ層（InMemory / PostgreSQL）に置き、
//! UseCase 層はこの trait だけに依存します。

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    entity::{AddonRecord, KnownUser, SeenRecord, SeenUpdate},
    error::RepositoryError,
    value_object::{SubscriberId, Username},
};

/// Last-seen records, one row per username
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeenRepository: Send + Sync {
    /// Insert or update every record, overwriting the stored country
    async fn upsert_with_country(
        &self,
        updates: &[SeenUpdate],
        seen_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Insert or update every record, keeping the stored country on conflict
    async fn upsert_without_country(
        &self,
        updates: &[SeenUpdate],
        seen_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// First record whose username starts with `prefix`, ignoring case.
    ///
    /// `prefix` is matched literally; wildcard characters carry no meaning.
    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<SeenRecord>, RepositoryError>;
}

/// Usernames tracked per subscriber
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackingRepository: Send + Sync {
    /// Tracked usernames in insertion order, empty when the subscriber is unknown
    async fn tracked_by(&self, subscriber: SubscriberId) -> Result<Vec<Username>, RepositoryError>;

    /// Append `username` to the subscriber's list
    async fn add(&self, subscriber: SubscriberId, username: Username)
    -> Result<(), RepositoryError>;

    /// Remove `username`; `false` when it was not tracked
    async fn remove(
        &self,
        subscriber: SubscriberId,
        username: &Username,
    ) -> Result<bool, RepositoryError>;

    /// Empty the subscriber's list, returning how many entries were removed
    async fn clear(&self, subscriber: SubscriberId) -> Result<usize, RepositoryError>;

    /// Subscribers tracking each of `usernames`; usernames nobody tracks are absent
    async fn subscribers_for(
        &self,
        usernames: &[Username],
    ) -> Result<HashMap<Username, Vec<SubscriberId>>, RepositoryError>;
}

/// Mirror of the remote addon catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AddonRepository: Send + Sync {
    async fn upsert_all(&self, records: &[AddonRecord]) -> Result<(), RepositoryError>;

    async fn load_all(&self) -> Result<Vec<AddonRecord>, RepositoryError>;
}

/// Account id to username directory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert each pair unless the id is already known
    async fn remember(&self, users: &[KnownUser]) -> Result<(), RepositoryError>;

    async fn username_of(&self, user_id: u32) -> Result<Option<Username>, RepositoryError>;
}
