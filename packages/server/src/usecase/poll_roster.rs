//! UseCase: 1 回分のポーリング（取得 → 解析 → 突き合わせ）

use std::sync::Arc;

use super::{
    error::PollError,
    reconcile_roster::{ReconcileReport, ReconcileRosterUseCase, TrackerState},
};
use crate::infrastructure::{parser::parse_snapshot, source::SnapshotSource};

pub struct PollRosterUseCase {
    source: Arc<dyn SnapshotSource>,
    reconcile: ReconcileRosterUseCase,
}

impl PollRosterUseCase {
    pub fn new(source: Arc<dyn SnapshotSource>, reconcile: ReconcileRosterUseCase) -> Self {
        Self { source, reconcile }
    }

    /// Fetch and reconcile one snapshot.
    ///
    /// # Errors
    ///
    /// Fetch and parse failures leave `state` untouched.
    pub async fn execute(&self, state: &mut TrackerState) -> Result<ReconcileReport, PollError> {
        let body = self.source.fetch_server_list().await?;
        let snapshot = parse_snapshot(&body, kartwatch_shared::time::now_utc())?;
        Ok(self.reconcile.execute(state, snapshot).await)
    }
}
