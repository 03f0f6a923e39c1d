//! Shutdown signal.

/// Resolves on Ctrl-C.
///
/// If the handler cannot be installed the server keeps running until killed.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
