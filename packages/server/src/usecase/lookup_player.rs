//! UseCase: プレイヤーのオンライン状態と最終確認記録の照会

use std::sync::Arc;

use super::reconcile_roster::SharedRoster;
use crate::domain::{RepositoryError, SeenRecord, SeenRepository, Server, Snapshot, Username};

/// Where a player is right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerStatus {
    Online(Arc<Server>),
    Offline,
}

/// Last-seen record together with the current status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sighting {
    pub record: SeenRecord,
    pub status: PlayerStatus,
}

pub struct LookupPlayerUseCase {
    live: SharedRoster,
    seen: Arc<dyn SeenRepository>,
}

impl LookupPlayerUseCase {
    pub fn new(live: SharedRoster, seen: Arc<dyn SeenRepository>) -> Self {
        Self { live, seen }
    }

    /// Exact-name online check against the online index
    pub async fn is_online(&self, username: &Username) -> PlayerStatus {
        let live = self.live.read().await;
        match live.index.lookup(username) {
            Some(server) => PlayerStatus::Online(Arc::clone(server)),
            None => PlayerStatus::Offline,
        }
    }

    /// Case-insensitive prefix search over seen records
    pub async fn last_seen(&self, prefix: &str) -> Result<Option<Sighting>, RepositoryError> {
        let Some(record) = self.seen.find_by_prefix(prefix).await? else {
            return Ok(None);
        };
        let status = self.is_online(&record.username).await;
        Ok(Some(Sighting { record, status }))
    }

    /// Latest accepted snapshot
    pub async fn servers(&self) -> Option<Arc<Snapshot>> {
        self.live.read().await.snapshot.clone()
    }
}
