//! Periodic addon catalog sync.

use std::time::Duration;

use tokio::{
    sync::watch,
    time::{MissedTickBehavior, interval},
};

use super::shutdown_requested;
use crate::usecase::SyncCatalogUseCase;

/// Load the stored catalog, then sync from upstream every `period` until shutdown.
pub async fn run_catalog_loop(
    usecase: SyncCatalogUseCase,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    match usecase.load_cached().await {
        Ok(count) => tracing::info!("Loaded {} stored addon tracks", count),
        Err(e) => tracing::warn!("Unable to load stored addon tracks: {}", e),
    }

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown_requested(&mut shutdown) => break,
        }

        if let Err(e) = usecase.execute().await {
            tracing::warn!("Addon catalog sync failed: {}", e);
        }
    }
    tracing::info!("Catalog loop stopped");
}
