//! Route table.

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get},
};
use tower_http::trace::TraceLayer;

use super::{handler, state::AppState};

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handler::health_check))
        .route("/api/servers", get(handler::get_servers))
        .route("/api/players/{username}/online", get(handler::get_online))
        .route("/api/players/{username}/seen", get(handler::get_seen))
        .route(
            "/api/subscribers/{id}/tracks",
            get(handler::get_tracks)
                .post(handler::track_player)
                .delete(handler::clear_tracks),
        )
        .route(
            "/api/subscribers/{id}/tracks/{username}",
            delete(handler::untrack_player),
        )
        .route("/api/events", get(handler::events_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
