//! Notifier that only writes to the log.

use async_trait::async_trait;

use super::{Notifier, NotifyError};
use crate::domain::Notification;

/// Used when no webhook is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            subscriber = %notification.subscriber,
            "Notify: {}",
            notification.message().replace('\n', " | ")
        );
        Ok(())
    }
}
