//! Notification delivery worker.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{domain::Notification, infrastructure::notifier::Notifier};

/// Deliver queued notifications until every sender is dropped.
///
/// Returns the number delivered. Failures are logged and the notification is discarded.
pub async fn run_notification_worker(
    mut queue: mpsc::Receiver<Notification>,
    notifier: Arc<dyn Notifier>,
) -> usize {
    let mut delivered = 0;
    while let Some(notification) = queue.recv().await {
        match notifier.notify(&notification).await {
            Ok(()) => delivered += 1,
            Err(e) => tracing::warn!(
                "Dropping notification for subscriber {} about {}: {}",
                notification.subscriber,
                notification.player.username,
                e
            ),
        }
    }
    tracing::info!("Notification worker stopped after {} deliveries", delivered);
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            Presence, SubscriberId,
            entity::fixtures::{player, server},
        },
        infrastructure::notifier::{MockNotifier, NotifyError},
    };

    fn notification(name: &str) -> Notification {
        Notification {
            subscriber: SubscriberId::new(7),
            presence: Presence::Joined,
            player: player(name),
            server: Arc::new(server(1, &[name])),
        }
    }

    #[tokio::test]
    async fn test_failures_are_skipped() {
        // テスト項目: 配信に失敗した通知は破棄され、後続の通知は配信される
        // given (前提条件):
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|n| n.player.username.as_str() == "alice")
            .times(1)
            .returning(|_| Err(NotifyError::Rejected(500)));
        notifier
            .expect_notify()
            .withf(|n| n.player.username.as_str() == "bob")
            .times(1)
            .returning(|_| Ok(()));
        let (tx, rx) = mpsc::channel(4);
        tx.send(notification("alice")).await.unwrap();
        tx.send(notification("bob")).await.unwrap();
        drop(tx);

        // when (操作):
        let delivered = run_notification_worker(rx, Arc::new(notifier)).await;

        // then (期待する結果):
        assert_eq!(delivered, 1);
    }
}
