//! Webhook payload DTO.

use serde::{Deserialize, Serialize};

use super::http::{PlayerDto, ServerBriefDto};
use crate::domain::{Notification, Presence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationType {
    TrackedPlayerJoined,
    TrackedPlayerLeft,
}

/// Body POSTed to the webhook for each notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub r#type: NotificationType,
    pub subscriber_id: i64,
    pub player: PlayerDto,
    pub server: ServerBriefDto,
    /// Ready-to-display text
    pub content: String,
}

impl From<&Notification> for NotificationMessage {
    fn from(n: &Notification) -> Self {
        Self {
            r#type: match n.presence {
                Presence::Joined => NotificationType::TrackedPlayerJoined,
                Presence::Left => NotificationType::TrackedPlayerLeft,
            },
            subscriber_id: n.subscriber.value(),
            player: PlayerDto::from(&n.player),
            server: ServerBriefDto::from(n.server.as_ref()),
            content: n.message(),
        }
    }
}
