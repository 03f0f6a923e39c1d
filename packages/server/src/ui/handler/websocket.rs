//! Roster event stream over WebSocket.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::{
    domain::RosterEvent, infrastructure::dto::event::EventMessage, ui::state::AppState,
};

pub async fn events_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // Subscribe before the upgrade so no event published after the handshake is missed
    let rx = state.events.subscribe();
    tracing::info!(
        "Event stream client connected ({} subscribers)",
        state.events.receiver_count()
    );
    ws.on_upgrade(move |socket| handle_socket(socket, state, rx))
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    mut rx: broadcast::Receiver<RosterEvent>,
) {
    let (mut sender, mut receiver) = socket.split();

    // Forward roster events to this client
    let mut send_task = tokio::spawn(async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event stream client lagged; skipped {} events", skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            let message = {
                let catalog = state.catalog.read().await;
                EventMessage::new(&event, &catalog)
            };
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize event: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // The stream is one-way; only watch for the client going away
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("Event stream socket error: {}", e);
                    break;
                }
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    tracing::info!("Event stream client disconnected");
}
