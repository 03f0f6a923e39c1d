//! Test fixtures for integration tests.

use std::{net::Ipv4Addr, sync::Arc};

use kartwatch_server::{
    domain::{CountryCode, Player, RosterEvent, Server, ServerId, Snapshot, Username},
    infrastructure::repository::Repositories,
    ui::{build_router, state::AppState},
    usecase::{SharedCatalog, SharedRoster},
};
use tokio::sync::broadcast;

/// In-process API server on an ephemeral port, without the poll loop
pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub live: SharedRoster,
    pub repositories: Repositories,
    pub events: broadcast::Sender<RosterEvent>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::with_limit(20).await
    }

    pub async fn with_limit(max_tracked: usize) -> Self {
        let live = SharedRoster::default();
        let repositories = Repositories::in_memory();
        let (events, _) = broadcast::channel(16);
        let state = Arc::new(AppState::new(
            live.clone(),
            SharedCatalog::default(),
            &repositories,
            events.clone(),
            max_tracked,
        ));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, build_router(state))
                .await
                .expect("Test server failed");
        });

        Self {
            addr,
            live,
            repositories,
            events,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{}", self.addr, path)
    }

    /// Make `servers` the latest snapshot and seed the online index from it
    pub async fn publish(&self, servers: Vec<Server>) -> Arc<Snapshot> {
        let snapshot = Arc::new(Snapshot::new(servers, chrono::Utc::now()).expect("Invalid snapshot"));
        let mut live = self.live.write().await;
        live.index.seed(&snapshot);
        live.snapshot = Some(snapshot.clone());
        snapshot
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn username(name: &str) -> Username {
    Username::new(name.to_string()).expect("Invalid username")
}

pub fn game_server(id: u32, name: &str, players: &[&str]) -> Server {
    Server {
        id: ServerId::new(id),
        name: name.to_string(),
        country_code: CountryCode::new("de").ok(),
        current_track: "lighthouse".to_string(),
        current_players: players.len() as u32,
        max_players: 8,
        game_mode: 3,
        difficulty: 2,
        password_protected: false,
        ip: Ipv4Addr::new(192, 168, 0, 1),
        port: 2759,
        players: players
            .iter()
            .enumerate()
            .map(|(i, p)| Player::new(username(p), i as u32 + 1, CountryCode::new("fi").ok()))
            .collect(),
    }
}
