//! Shared application state.

use tokio::sync::broadcast;

use crate::{
    domain::RosterEvent,
    infrastructure::repository::Repositories,
    usecase::{LookupPlayerUseCase, SharedCatalog, SharedRoster, TrackPlayerUseCase},
};

/// State shared by every HTTP and WebSocket handler
pub struct AppState {
    /// Track display names for API responses
    pub catalog: SharedCatalog,
    pub lookup: LookupPlayerUseCase,
    pub tracking: TrackPlayerUseCase,
    /// Roster events produced by the poll loop; each event stream client subscribes
    pub events: broadcast::Sender<RosterEvent>,
}

impl AppState {
    pub fn new(
        live: SharedRoster,
        catalog: SharedCatalog,
        repositories: &Repositories,
        events: broadcast::Sender<RosterEvent>,
        max_tracked: usize,
    ) -> Self {
        Self {
            catalog,
            lookup: LookupPlayerUseCase::new(live, repositories.seen.clone()),
            tracking: TrackPlayerUseCase::new(repositories.tracking.clone(), max_tracked),
            events,
        }
    }
}
