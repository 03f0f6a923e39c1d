//! Fixed-interval poll loop.

use std::time::Duration;

use tokio::{
    sync::watch,
    time::{MissedTickBehavior, interval},
};

use super::shutdown_requested;
use crate::usecase::{PollRosterUseCase, TrackerState};

/// Poll until shutdown and return the final baseline.
///
/// A failed tick is logged and skipped; the baseline only moves on success.
/// Shutdown is checked between ticks, so a running cycle always completes.
pub async fn run_poll_loop(
    usecase: PollRosterUseCase,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> TrackerState {
    let mut state = TrackerState::new();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!("Polling server list every {:?}", period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown_requested(&mut shutdown) => break,
        }

        match usecase.execute(&mut state).await {
            Ok(report) if !report.persist_failures.is_empty() => {
                tracing::warn!(
                    "Poll #{} finished with {} persistence failures",
                    report.version,
                    report.persist_failures.len()
                );
            }
            Ok(report) => {
                tracing::trace!("Poll #{} finished: {} events", report.version, report.events);
            }
            Err(e) => {
                tracing::warn!("Skipping poll tick: {}", e);
            }
        }
    }

    tracing::info!("Poll loop stopped after {} snapshots", state.version);
    state
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use tokio::sync::{broadcast, mpsc};

    use super::*;
    use crate::{
        infrastructure::{
            repository::Repositories,
            source::{MockSnapshotSource, SourceError},
        },
        usecase::{ReconcileRosterUseCase, SharedRoster},
    };

    const EMPTY_LIST: &str = "<server-list><servers/></server-list>";

    fn usecase(source: MockSnapshotSource) -> PollRosterUseCase {
        let repositories = Repositories::in_memory();
        let (events, _) = broadcast::channel(8);
        let (notifications, _) = mpsc::channel(8);
        let reconcile = ReconcileRosterUseCase::new(
            SharedRoster::default(),
            repositories.seen,
            repositories.users,
            repositories.tracking,
            events,
            notifications,
        );
        PollRosterUseCase::new(Arc::new(source), reconcile)
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_every_period_until_shutdown() {
        // テスト項目: 一定間隔でポーリングし、停止要求で終了する
        // given (前提条件):
        let mut source = MockSnapshotSource::new();
        source
            .expect_fetch_server_list()
            .returning(|| Ok(EMPTY_LIST.to_string()));
        let (stop, shutdown) = watch::channel(false);
        let handle = tokio::spawn(run_poll_loop(
            usecase(source),
            Duration::from_secs(5),
            shutdown,
        ));

        // when (操作): 0 秒, 5 秒, 10 秒の 3 回
        tokio::time::sleep(Duration::from_secs(11)).await;
        stop.send(true).unwrap();
        let state = handle.await.unwrap();

        // then (期待する結果):
        assert_eq!(state.version, 3);
        assert!(state.previous.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_errors_do_not_stop_the_loop() {
        // テスト項目: 取得エラーが続いてもループは止まらず、ベースラインは空のまま
        // given (前提条件):
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut source = MockSnapshotSource::new();
        source.expect_fetch_server_list().returning(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(SourceError::Transport {
                url: "http://upstream".to_string(),
                reason: "connection refused".to_string(),
            })
        });
        let (stop, shutdown) = watch::channel(false);
        let handle = tokio::spawn(run_poll_loop(
            usecase(source),
            Duration::from_secs(5),
            shutdown,
        ));

        // when (操作):
        tokio::time::sleep(Duration::from_secs(11)).await;
        drop(stop);
        let state = handle.await.unwrap();

        // then (期待する結果): 送信側が破棄されても停止する
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(state.version, 0);
        assert!(state.previous.is_none());
    }
}
