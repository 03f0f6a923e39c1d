//! Startup errors of the server binary.
//!
//! Once running, failures are logged by the loops instead of being returned.

use thiserror::Error;

use crate::{
    domain::RepositoryError,
    infrastructure::{notifier::NotifyError, source::SourceError},
};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("store unavailable: {0}")]
    Repository(#[from] RepositoryError),

    #[error("upstream client: {0}")]
    Source(#[from] SourceError),

    #[error("notifier: {0}")]
    Notify(#[from] NotifyError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
