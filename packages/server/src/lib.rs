//! Roster tracker for SuperTuxKart online servers.
//!
//! Polls the public server list, diffs consecutive snapshots into join, leave and
//! server events, keeps an online index and last-seen records, notifies subscribers
//! about tracked players and serves everything over an HTTP API.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
pub mod worker;

// Re-export entry points
pub use config::Config;
pub use ui::run;
