//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kartwatch_shared::time::{humanize_delta, now_utc, to_rfc3339};

use crate::{
    domain::{RepositoryError, SubscriberId, TrackList, Username},
    infrastructure::dto::http::{
        ClearedDto, ErrorDto, OnlineDto, SeenDto, ServerBriefDto, ServerDto, ServerListDto,
        TrackListDto, TrackRequestDto,
    },
    ui::state::AppState,
    usecase::{PlayerStatus, TrackError},
};

/// Error response with a JSON body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorDto { error: self.message })).into_response()
    }
}

impl From<TrackError> for ApiError {
    fn from(e: TrackError) -> Self {
        let status = match &e {
            TrackError::AlreadyTracked(_) => StatusCode::CONFLICT,
            TrackError::LimitReached { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            TrackError::NotTracked(_) => StatusCode::NOT_FOUND,
            TrackError::Repository(inner) => {
                tracing::error!("Tracking store failed: {}", inner);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, e.to_string())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        tracing::error!("Store failed: {}", e);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

fn parse_username(raw: String) -> Result<Username, ApiError> {
    Username::new(raw).map_err(|e| {
        tracing::warn!("Rejected username: {}", e);
        ApiError::new(StatusCode::BAD_REQUEST, e.to_string())
    })
}

fn track_list_dto(list: TrackList, limit: usize) -> TrackListDto {
    TrackListDto {
        subscriber_id: list.subscriber.value(),
        usernames: list.usernames.into_iter().map(Username::into_string).collect(),
        limit,
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Latest snapshot with track display names
pub async fn get_servers(State(state): State<Arc<AppState>>) -> Json<ServerListDto> {
    let Some(snapshot) = state.lookup.servers().await else {
        return Json(ServerListDto {
            fetched_at: None,
            player_count: 0,
            servers: Vec::new(),
        });
    };

    let catalog = state.catalog.read().await;
    Json(ServerListDto {
        fetched_at: Some(to_rfc3339(snapshot.fetched_at())),
        player_count: snapshot.player_count(),
        servers: snapshot
            .servers()
            .iter()
            .map(|s| ServerDto::new(s, &catalog))
            .collect(),
    })
}

/// Is this exact username online, and where
pub async fn get_online(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<OnlineDto>, ApiError> {
    let username = parse_username(username)?;

    let server = match state.lookup.is_online(&username).await {
        PlayerStatus::Online(server) => Some(ServerBriefDto::from(server.as_ref())),
        PlayerStatus::Offline => None,
    };

    Ok(Json(OnlineDto {
        username: username.into_string(),
        online: server.is_some(),
        server,
    }))
}

/// Last-seen record for a username prefix
pub async fn get_seen(
    State(state): State<Arc<AppState>>,
    Path(prefix): Path<String>,
) -> Result<Json<SeenDto>, ApiError> {
    let Some(sighting) = state.lookup.last_seen(&prefix).await? else {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("no player matching '{prefix}' was ever seen"),
        ));
    };

    let ago = humanize_delta(now_utc() - sighting.record.seen_at);
    let ago = if ago.is_empty() {
        "just now".to_string()
    } else {
        ago
    };
    let server = match &sighting.status {
        PlayerStatus::Online(server) => Some(server.as_ref()),
        PlayerStatus::Offline => None,
    };

    Ok(Json(SeenDto::new(&sighting.record, server, ago)))
}

pub async fn get_tracks(
    State(state): State<Arc<AppState>>,
    Path(subscriber): Path<i64>,
) -> Result<Json<TrackListDto>, ApiError> {
    let list = state.tracking.list(SubscriberId::new(subscriber)).await?;
    Ok(Json(track_list_dto(list, state.tracking.limit())))
}

pub async fn track_player(
    State(state): State<Arc<AppState>>,
    Path(subscriber): Path<i64>,
    Json(request): Json<TrackRequestDto>,
) -> Result<(StatusCode, Json<TrackListDto>), ApiError> {
    let username = parse_username(request.username)?;
    let list = state
        .tracking
        .track(SubscriberId::new(subscriber), username)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(track_list_dto(list, state.tracking.limit())),
    ))
}

pub async fn untrack_player(
    State(state): State<Arc<AppState>>,
    Path((subscriber, username)): Path<(i64, String)>,
) -> Result<StatusCode, ApiError> {
    let username = parse_username(username)?;
    state
        .tracking
        .untrack(SubscriberId::new(subscriber), &username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_tracks(
    State(state): State<Arc<AppState>>,
    Path(subscriber): Path<i64>,
) -> Result<Json<ClearedDto>, ApiError> {
    let removed = state.tracking.clear(SubscriberId::new(subscriber)).await?;
    Ok(Json(ClearedDto { removed }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_error_status_codes() {
        // テスト項目: トラッキングのエラーが適切な HTTP ステータスに変換される
        let alice = Username::new("alice".to_string()).unwrap();
        let cases = [
            (TrackError::AlreadyTracked(alice.clone()), StatusCode::CONFLICT),
            (
                TrackError::LimitReached { limit: 20 },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (TrackError::NotTracked(alice), StatusCode::NOT_FOUND),
            (
                TrackError::Repository(RepositoryError::Database("down".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status, expected);
        }
    }
}
