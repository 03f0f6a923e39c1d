//! Notifier that POSTs JSON to a webhook.

use std::time::Duration;

use async_trait::async_trait;

use super::{Notifier, NotifyError};
use crate::{domain::Notification, infrastructure::dto::notification::NotificationMessage};

#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(Self {
            url: url.to_string(),
            client,
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let body = NotificationMessage::from(notification);
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}
