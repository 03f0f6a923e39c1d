//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! ワーカーと UI 層から呼び出され、Domain 層を操作します。

pub mod error;
pub mod lookup_player;
pub mod poll_roster;
pub mod reconcile_roster;
pub mod sync_catalog;
pub mod track_player;

pub use error::{PollError, SyncCatalogError, TrackError};
pub use lookup_player::{LookupPlayerUseCase, PlayerStatus, Sighting};
pub use poll_roster::PollRosterUseCase;
pub use reconcile_roster::{
    LiveRoster, PersistFailure, PersistStep, ReconcileReport, ReconcileRosterUseCase,
    SharedRoster, TrackerState,
};
pub use sync_catalog::{SharedCatalog, SyncCatalogUseCase};
pub use track_player::TrackPlayerUseCase;
