//! HTTP API request and response DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::{Player, SeenRecord, Server, TrackCatalog};

/// Player on a server roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDto {
    pub username: String,
    pub user_id: u32,
    pub country_code: Option<String>,
}

impl From<&Player> for PlayerDto {
    fn from(player: &Player) -> Self {
        Self {
            username: player.username.to_string(),
            user_id: player.user_id,
            country_code: player.country_code.as_ref().map(|c| c.to_string()),
        }
    }
}

/// Server with its roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerDto {
    pub id: u32,
    pub name: String,
    pub country_code: Option<String>,
    pub address: String,
    pub track_id: String,
    pub track_name: String,
    pub current_players: u32,
    pub max_players: u32,
    pub game_mode: u32,
    pub difficulty: u32,
    pub password_protected: bool,
    pub players: Vec<PlayerDto>,
}

impl ServerDto {
    pub fn new(server: &Server, catalog: &TrackCatalog) -> Self {
        Self {
            id: server.id.value(),
            name: server.display_name(),
            country_code: server.country_code.as_ref().map(|c| c.to_string()),
            address: server.address().to_string(),
            track_id: server.current_track.clone(),
            track_name: catalog.display_name(&server.current_track),
            current_players: server.current_players,
            max_players: server.max_players,
            game_mode: server.game_mode,
            difficulty: server.difficulty,
            password_protected: server.password_protected,
            players: server.players.iter().map(PlayerDto::from).collect(),
        }
    }
}

/// Latest snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerListDto {
    /// `None` until the first poll succeeds
    pub fetched_at: Option<String>, // ISO 8601
    pub player_count: usize,
    pub servers: Vec<ServerDto>,
}

/// Server summary inside player lookups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerBriefDto {
    pub id: u32,
    pub name: String,
    pub country_code: Option<String>,
}

impl From<&Server> for ServerBriefDto {
    fn from(server: &Server) -> Self {
        Self {
            id: server.id.value(),
            name: server.display_name(),
            country_code: server.country_code.as_ref().map(|c| c.to_string()),
        }
    }
}

/// Answer to "is this username online"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlineDto {
    pub username: String,
    pub online: bool,
    pub server: Option<ServerBriefDto>,
}

/// Answer to "when was this username last seen"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeenDto {
    pub username: String,
    pub country_code: Option<String>,
    pub online: bool,
    /// Present when online
    pub server: Option<ServerBriefDto>,
    pub last_server_name: String,
    pub last_server_country: Option<String>,
    pub seen_at: String, // ISO 8601
    /// e.g. "3 hours, 2 minutes"
    pub seen_ago: String,
}

impl SeenDto {
    pub fn new(record: &SeenRecord, server: Option<&Server>, ago: String) -> Self {
        Self {
            username: record.username.to_string(),
            country_code: record.country.as_ref().map(|c| c.to_string()),
            online: server.is_some(),
            server: server.map(ServerBriefDto::from),
            last_server_name: kartwatch_shared::format::strip_line_breaks(&record.server_name),
            last_server_country: record.server_country.as_ref().map(|c| c.to_string()),
            seen_at: kartwatch_shared::time::to_rfc3339(record.seen_at),
            seen_ago: ago,
        }
    }
}

/// Tracked usernames of a subscriber
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackListDto {
    pub subscriber_id: i64,
    pub usernames: Vec<String>,
    pub limit: usize,
}

/// Body of `POST /api/subscribers/{id}/tracks`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackRequestDto {
    pub username: String,
}

/// Result of clearing a track list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearedDto {
    pub removed: usize,
}

/// Error body for non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDto {
    pub error: String,
}
