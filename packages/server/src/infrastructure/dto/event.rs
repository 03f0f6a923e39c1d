//! Event stream message DTOs, sent as JSON text frames.

use serde::{Deserialize, Serialize};

use super::http::{PlayerDto, ServerBriefDto};
use crate::domain::{RosterEvent, TrackCatalog, TrackChange};

/// Message type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    ServerCreated,
    ServerDeleted,
    PlayerJoined,
    PlayerLeft,
    SessionStarted,
    SessionEnded,
    TrackChanged,
    ConfigChanged,
    RosterCapacityChanged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigChangeDto {
    pub attribute: String,
    pub previous: u32,
    pub current: u32,
}

/// One roster event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub r#type: EventType,
    pub server: ServerBriefDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerDto>,
    /// Display names, previous then current; one side is absent for session changes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_to: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<ConfigChangeDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roster_size: Option<(usize, usize)>,
}

impl EventMessage {
    pub fn new(event: &RosterEvent, catalog: &TrackCatalog) -> Self {
        let mut message = Self {
            r#type: EventType::ServerCreated,
            server: ServerBriefDto::from(event.server().as_ref()),
            player: None,
            track_from: None,
            track_to: None,
            changes: Vec::new(),
            roster_size: None,
        };

        match event {
            RosterEvent::ServerCreated { .. } => {}
            RosterEvent::ServerDeleted { .. } => message.r#type = EventType::ServerDeleted,
            RosterEvent::PlayerJoined { player, .. } => {
                message.r#type = EventType::PlayerJoined;
                message.player = Some(PlayerDto::from(player));
            }
            RosterEvent::PlayerLeft { player, .. } => {
                message.r#type = EventType::PlayerLeft;
                message.player = Some(PlayerDto::from(player));
            }
            RosterEvent::TrackChanged { change, .. } => match change {
                TrackChange::SessionStarted { track } => {
                    message.r#type = EventType::SessionStarted;
                    message.track_to = Some(catalog.display_name(track));
                }
                TrackChange::SessionEnded { previous } => {
                    message.r#type = EventType::SessionEnded;
                    message.track_from = Some(catalog.display_name(previous));
                }
                TrackChange::Changed { from, to } => {
                    message.r#type = EventType::TrackChanged;
                    message.track_from = Some(catalog.display_name(from));
                    message.track_to = Some(catalog.display_name(to));
                }
            },
            RosterEvent::ConfigChanged { changes, .. } => {
                message.r#type = EventType::ConfigChanged;
                message.changes = changes
                    .iter()
                    .map(|c| ConfigChangeDto {
                        attribute: c.attribute.to_string(),
                        previous: c.previous,
                        current: c.current,
                    })
                    .collect();
            }
            RosterEvent::RosterCapacityChanged {
                previous, current, ..
            } => {
                message.r#type = EventType::RosterCapacityChanged;
                message.roster_size = Some((*previous, *current));
            }
        }

        message
    }
}
