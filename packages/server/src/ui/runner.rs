//! Server runner: wires the stores, the background tasks and the HTTP API.

use std::sync::Arc;

use tokio::sync::{RwLock, broadcast, mpsc, watch};

use super::{router::build_router, state::AppState};
use crate::{
    config::Config,
    error::ServerError,
    infrastructure::{
        notifier::{LogNotifier, Notifier, WebhookNotifier},
        repository::Repositories,
        source::HttpApiClient,
    },
    usecase::{
        LiveRoster, PollRosterUseCase, ReconcileRosterUseCase, SharedCatalog, SharedRoster,
        SyncCatalogUseCase,
    },
    worker::{run_catalog_loop, run_notification_worker, run_poll_loop},
};

/// Buffered roster events per event stream client
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Run the tracker until Ctrl-C.
pub async fn run(config: Config) -> Result<(), ServerError> {
    let repositories = Repositories::from_url(config.database_url.as_deref()).await?;
    let client = Arc::new(HttpApiClient::new(
        &config.api_base_url,
        &config.user_agent,
        config.http_timeout(),
    )?);
    let notifier: Arc<dyn Notifier> = match &config.webhook_url {
        Some(url) => {
            tracing::info!("Delivering notifications to {}", url);
            Arc::new(WebhookNotifier::new(url, config.http_timeout())?)
        }
        None => Arc::new(LogNotifier),
    };

    let live: SharedRoster = Arc::new(RwLock::new(LiveRoster::default()));
    let catalog = SharedCatalog::default();
    let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    let (notifications, queue) = mpsc::channel(config.queue_capacity.max(1));
    let (stop, shutdown) = watch::channel(false);

    let poll = PollRosterUseCase::new(
        client.clone(),
        ReconcileRosterUseCase::new(
            live.clone(),
            repositories.seen.clone(),
            repositories.users.clone(),
            repositories.tracking.clone(),
            events.clone(),
            notifications,
        ),
    );
    let sync = SyncCatalogUseCase::new(client, repositories.addons.clone(), catalog.clone());

    let poll_task = tokio::spawn(run_poll_loop(poll, config.poll_interval(), shutdown.clone()));
    let catalog_task = tokio::spawn(run_catalog_loop(
        sync,
        config.catalog_interval(),
        shutdown,
    ));
    let notify_task = tokio::spawn(run_notification_worker(queue, notifier));

    let state = Arc::new(AppState::new(
        live,
        catalog,
        &repositories,
        events,
        config.max_tracked,
    ));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("HTTP API listening on {}", listener.local_addr()?);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(super::signal::ctrl_c())
        .await;

    // Stop the loops; the notification worker drains once the poll loop drops its sender
    let _ = stop.send(true);
    for (name, result) in [
        ("catalog", catalog_task.await.map(|_| ())),
        ("poll", poll_task.await.map(|_| ())),
        ("notification", notify_task.await.map(|_| ())),
    ] {
        if let Err(e) = result {
            tracing::error!("The {} task panicked: {}", name, e);
        }
    }

    served?;
    tracing::info!("Server stopped");
    Ok(())
}
