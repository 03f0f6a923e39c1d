//! Core domain models for the roster tracker.

use std::{
    collections::HashSet,
    net::{Ipv4Addr, SocketAddrV4},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    error::SnapshotError,
    value_object::{CountryCode, ServerId, SubscriberId, Username},
};

/// A player connected to a server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Unique within the server's roster
    pub username: Username,
    /// Numeric account id
    pub user_id: u32,
    /// Some records carry no country
    pub country_code: Option<CountryCode>,
}

impl Player {
    /// Create a new player
    pub fn new(username: Username, user_id: u32, country_code: Option<CountryCode>) -> Self {
        Self {
            username,
            user_id,
            country_code,
        }
    }
}

/// One running game server as reported by a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub id: ServerId,
    /// Raw name; may contain line breaks, see [`Server::display_name`]
    pub name: String,
    /// `None` when upstream sends an empty or malformed code
    pub country_code: Option<CountryCode>,
    /// Empty while the server sits in the lobby
    pub current_track: String,
    pub current_players: u32,
    pub max_players: u32,
    pub game_mode: u32,
    pub difficulty: u32,
    pub password_protected: bool,
    pub ip: Ipv4Addr,
    pub port: u16,
    /// Connected players in upstream order
    pub players: Vec<Player>,
}

impl Server {
    /// Name with embedded line breaks removed
    pub fn display_name(&self) -> String {
        kartwatch_shared::format::strip_line_breaks(&self.name)
    }

    /// Public address of the server
    pub fn address(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.ip, self.port)
    }

    /// Whether a race is in progress
    pub fn in_race(&self) -> bool {
        !self.current_track.is_empty()
    }

    /// Look up a player by username
    pub fn player(&self, username: &Username) -> Option<&Player> {
        self.players.iter().find(|p| &p.username == username)
    }

    /// Usernames of the current roster
    pub fn usernames(&self) -> HashSet<&Username> {
        self.players.iter().map(|p| &p.username).collect()
    }
}

/// Every server reported by one poll, in upstream order.
///
/// Immutable once constructed. Servers are shared behind `Arc` so that events and the
/// online index can reference them without copying rosters.
#[derive(Debug, Clone)]
pub struct Snapshot {
    servers: Vec<Arc<Server>>,
    fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Build a snapshot, enforcing unique server ids and unique usernames per roster
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::DuplicateServerId` or `SnapshotError::DuplicateUsername`
    pub fn new(servers: Vec<Server>, fetched_at: DateTime<Utc>) -> Result<Self, SnapshotError> {
        let mut ids = HashSet::with_capacity(servers.len());
        for server in &servers {
            if !ids.insert(server.id) {
                return Err(SnapshotError::DuplicateServerId(server.id));
            }
            let mut names = HashSet::with_capacity(server.players.len());
            for player in &server.players {
                if !names.insert(&player.username) {
                    return Err(SnapshotError::DuplicateUsername {
                        server: server.id,
                        username: player.username.clone(),
                    });
                }
            }
        }

        Ok(Self {
            servers: servers.into_iter().map(Arc::new).collect(),
            fetched_at,
        })
    }

    /// Create a snapshot with no servers
    pub fn empty(fetched_at: DateTime<Utc>) -> Self {
        Self {
            servers: Vec::new(),
            fetched_at,
        }
    }

    pub fn servers(&self) -> &[Arc<Server>] {
        &self.servers
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Set of server ids in this snapshot
    pub fn ids(&self) -> HashSet<ServerId> {
        self.servers.iter().map(|s| s.id).collect()
    }

    /// Find a server by id
    pub fn find(&self, id: ServerId) -> Option<&Arc<Server>> {
        self.servers.iter().find(|s| s.id == id)
    }

    /// Total number of connected players across all servers
    pub fn player_count(&self) -> usize {
        self.servers.iter().map(|s| s.players.len()).sum()
    }
}

/// Pending write for a last-seen record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenUpdate {
    pub username: Username,
    /// `None` selects the upsert variant that keeps the stored country
    pub country: Option<CountryCode>,
    pub server_name: String,
    pub server_country: Option<CountryCode>,
}

impl SeenUpdate {
    /// Build an update placing `player` on `server`
    pub fn new(player: &Player, server: &Server) -> Self {
        Self {
            username: player.username.clone(),
            country: player.country_code.clone(),
            server_name: server.name.clone(),
            server_country: server.country_code.clone(),
        }
    }
}

/// Durable last-known location of a username
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenRecord {
    pub username: Username,
    pub country: Option<CountryCode>,
    pub server_name: String,
    pub server_country: Option<CountryCode>,
    pub seen_at: DateTime<Utc>,
}

/// Mirror of one entry in the remote addon catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonRecord {
    pub id: String,
    pub name: String,
    pub file: String,
    pub date: i64,
    pub uploader: String,
    pub designer: String,
    pub description: String,
    pub image: String,
    pub format: i32,
    pub revision: i32,
    pub status: i32,
    pub size: i64,
    pub rating: f64,
}

/// Account id to username mapping learned from rosters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownUser {
    pub user_id: u32,
    pub username: Username,
}

/// Usernames a subscriber asked to be notified about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackList {
    pub subscriber: SubscriberId,
    pub usernames: Vec<Username>,
}
