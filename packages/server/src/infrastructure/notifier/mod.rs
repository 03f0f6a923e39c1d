//! Delivery of tracked-player notifications.
//!
//! Delivery is best effort: the notification worker logs failures and moves on.

pub mod log;
pub mod webhook;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Notification;

pub use log::LogNotifier;
pub use webhook::WebhookNotifier;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("notification transport failed: {0}")]
    Transport(String),

    #[error("notification endpoint answered with status {0}")]
    Rejected(u16),
}

/// Sends one notification to its subscriber
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}
