//! Remote documents the tracker polls.
//!
//! The sources only fetch raw bodies; parsing lives in [`crate::infrastructure::parser`].

pub mod http;

use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpApiClient;

/// Path of the server list on the remote API
pub const SERVER_LIST_PATH: &str = "/api/v2/server/get-all";
/// Path of the addon catalog on the remote API
pub const CATALOG_PATH: &str = "/downloads/xml/online_assets.xml";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Connection, timeout or body read failure
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The remote answered with a non-success status
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
}

/// Supplies the raw server list document
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_server_list(&self) -> Result<String, SourceError>;
}

/// Supplies the raw addon catalog document
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_catalog(&self) -> Result<String, SourceError>;
}
