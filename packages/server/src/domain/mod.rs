//! Domain layer for the roster tracker.
//!
//! This module contains the snapshot model, the roster differ and the online index.
//! Nothing here performs I/O; persistence is reached through the repository traits.

pub mod catalog;
pub mod diff;
pub mod entity;
pub mod error;
pub mod event;
pub mod online_index;
pub mod repository;
pub mod value_object;

pub use catalog::TrackCatalog;
pub use diff::{Alignment, AlignmentFailure, RosterDiff, ServerPair, align, diff_snapshots};
pub use entity::{
    AddonRecord, KnownUser, Player, SeenRecord, SeenUpdate, Server, Snapshot, TrackList,
};
pub use error::{RepositoryError, SnapshotError, ValueObjectError};
pub use event::{
    ConfigAttribute, ConfigChange, Notification, Presence, RosterEvent, TrackChange,
};
pub use online_index::OnlineIndex;
pub use repository::{AddonRepository, SeenRepository, TrackingRepository, UserRepository};
pub use value_object::{CountryCode, ServerId, SubscriberId, Username};
