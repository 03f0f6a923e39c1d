//! Background tasks
//!
//! ポーリング、カタログ同期、通知配信を行う常駐タスク。
//! いずれも `watch` チャネルで停止要求を受け取ります。

pub mod catalog;
pub mod notify;
pub mod poll;

use tokio::sync::watch;

pub use catalog::run_catalog_loop;
pub use notify::run_notification_worker;
pub use poll::run_poll_loop;

/// Resolves once shutdown is requested or the sender is gone
pub(crate) async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
