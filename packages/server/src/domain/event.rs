//! Events produced by diffing two snapshots, and the notifications derived from them.

use std::{fmt, sync::Arc};

use super::{
    entity::{Player, Server},
    value_object::SubscriberId,
};

/// Change of the track a server is running
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackChange {
    /// Lobby to race
    SessionStarted { track: String },
    /// Race to lobby
    SessionEnded { previous: String },
    /// Straight from one track to another
    Changed { from: String, to: String },
}

/// Server setting compared between polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAttribute {
    MaxPlayers,
    GameMode,
    Difficulty,
}

impl ConfigAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxPlayers => "max_players",
            Self::GameMode => "game_mode",
            Self::Difficulty => "difficulty",
        }
    }
}

impl fmt::Display for ConfigAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigChange {
    pub attribute: ConfigAttribute,
    pub previous: u32,
    pub current: u32,
}

/// One observation from a reconcile cycle.
///
/// Join events carry the server from the new snapshot; leave and delete events carry
/// the last-known server from the previous snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterEvent {
    ServerCreated {
        server: Arc<Server>,
    },
    ServerDeleted {
        server: Arc<Server>,
    },
    PlayerJoined {
        server: Arc<Server>,
        player: Player,
    },
    PlayerLeft {
        server: Arc<Server>,
        player: Player,
    },
    TrackChanged {
        server: Arc<Server>,
        change: TrackChange,
    },
    ConfigChanged {
        server: Arc<Server>,
        changes: Vec<ConfigChange>,
    },
    /// Roster size differs; the server became fuller or freer
    RosterCapacityChanged {
        server: Arc<Server>,
        previous: usize,
        current: usize,
    },
}

impl RosterEvent {
    /// The server this event is about
    pub fn server(&self) -> &Arc<Server> {
        match self {
            Self::ServerCreated { server }
            | Self::ServerDeleted { server }
            | Self::PlayerJoined { server, .. }
            | Self::PlayerLeft { server, .. }
            | Self::TrackChanged { server, .. }
            | Self::ConfigChanged { server, .. }
            | Self::RosterCapacityChanged { server, .. } => server,
        }
    }

    /// Short machine-readable name, used as the event type on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServerCreated { .. } => "server-created",
            Self::ServerDeleted { .. } => "server-deleted",
            Self::PlayerJoined { .. } => "player-joined",
            Self::PlayerLeft { .. } => "player-left",
            Self::TrackChanged { .. } => "track-changed",
            Self::ConfigChanged { .. } => "config-changed",
            Self::RosterCapacityChanged { .. } => "roster-capacity-changed",
        }
    }
}

/// Whether a tracked player arrived or went away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Joined,
    Left,
}

/// A message for one subscriber about one tracked player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subscriber: SubscriberId,
    pub presence: Presence,
    pub player: Player,
    pub server: Arc<Server>,
}

impl Notification {
    /// Plain-text body, e.g. "🇫🇮 alice joined a server.\nServer: 🇩🇪 Frankfurt"
    pub fn message(&self) -> String {
        let flag = self
            .player
            .country_code
            .as_ref()
            .map(|c| c.flag())
            .unwrap_or_default();
        let action = match self.presence {
            Presence::Joined => "joined a server.",
            Presence::Left => "left.",
        };
        format!(
            "{} {} {}\nServer: {} {}",
            flag,
            self.player.username,
            action,
            self.server
                .country_code
                .as_ref()
                .map(|c| c.flag())
                .unwrap_or_default(),
            self.server.display_name()
        )
    }
}
