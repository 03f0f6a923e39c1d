//! Handler modules for HTTP and WebSocket endpoints.

pub mod http;
pub mod websocket;

// Re-export HTTP handlers
pub use http::{
    clear_tracks, get_online, get_seen, get_servers, get_tracks, health_check, track_player,
    untrack_player,
};

// Re-export WebSocket handlers
pub use websocket::events_handler;
