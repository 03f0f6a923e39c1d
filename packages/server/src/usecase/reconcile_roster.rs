//! UseCase: スナップショットの突き合わせ（Event Sink）
//!
//! 前回のスナップショットと今回のスナップショットの差分を取り、
//! オンライン一覧の更新・最終確認記録の保存・購読者への通知を行います。
//!
//! ### どのような状況を想定しているか
//! - 初回：イベントを出さずにオンライン一覧を作るだけ
//! - 通常：参加・退出・サーバー作成/削除を反映
//! - 異常系：保存失敗・通知キュー満杯でもサイクルは最後まで進む

use std::{collections::HashSet, sync::Arc};

use tokio::sync::{
    RwLock, broadcast,
    mpsc::{self, error::TrySendError},
};

use crate::domain::{
    KnownUser, Notification, OnlineIndex, Presence, RepositoryError, RosterEvent, SeenRepository,
    SeenUpdate, Server, Snapshot, TrackChange, TrackingRepository, UserRepository, Username,
    diff_snapshots,
};

/// Read side shared with the HTTP API
#[derive(Debug, Default)]
pub struct LiveRoster {
    pub index: OnlineIndex,
    /// Latest accepted snapshot, `None` before the first successful poll
    pub snapshot: Option<Arc<Snapshot>>,
}

pub type SharedRoster = Arc<RwLock<LiveRoster>>;

/// Baseline owned by the poll loop
#[derive(Debug, Default)]
pub struct TrackerState {
    /// Number of snapshots accepted since start
    pub version: u64,
    pub previous: Option<Arc<Snapshot>>,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Which persistence step failed during a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStep {
    SeenWithCountry,
    SeenWithoutCountry,
    KnownUsers,
    SubscriberLookup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistFailure {
    pub step: PersistStep,
    pub error: RepositoryError,
}

/// Summary of one reconcile cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub version: u64,
    /// First snapshot since start: index seeded, nothing emitted
    pub seeded: bool,
    pub events: usize,
    pub joined: usize,
    pub left: usize,
    pub created: usize,
    pub deleted: usize,
    pub alignment_failures: usize,
    pub notifications_queued: usize,
    pub notifications_dropped: usize,
    pub persist_failures: Vec<PersistFailure>,
}

/// Applies each accepted snapshot to the live state, the stores and the notifiers
pub struct ReconcileRosterUseCase {
    live: SharedRoster,
    seen: Arc<dyn SeenRepository>,
    users: Arc<dyn UserRepository>,
    tracking: Arc<dyn TrackingRepository>,
    events: broadcast::Sender<RosterEvent>,
    notifications: mpsc::Sender<Notification>,
}

impl ReconcileRosterUseCase {
    pub fn new(
        live: SharedRoster,
        seen: Arc<dyn SeenRepository>,
        users: Arc<dyn UserRepository>,
        tracking: Arc<dyn TrackingRepository>,
        events: broadcast::Sender<RosterEvent>,
        notifications: mpsc::Sender<Notification>,
    ) -> Self {
        Self {
            live,
            seen,
            users,
            tracking,
            events,
            notifications,
        }
    }

    /// Reconcile `next` against the baseline in `state`, then make it the new baseline.
    ///
    /// Never fails: store and notification problems are logged and reported.
    pub async fn execute(&self, state: &mut TrackerState, next: Snapshot) -> ReconcileReport {
        let next = Arc::new(next);
        state.version += 1;

        let Some(previous) = state.previous.replace(Arc::clone(&next)) else {
            let mut live = self.live.write().await;
            live.index.seed(&next);
            live.snapshot = Some(next);
            tracing::info!(
                "Seeded online index with {} players on {} servers",
                live.index.len(),
                live.snapshot.as_ref().map_or(0, |s| s.len())
            );
            return ReconcileReport {
                version: state.version,
                seeded: true,
                ..ReconcileReport::default()
            };
        };

        let diff = diff_snapshots(&previous, &next);
        for failure in &diff.failures {
            tracing::warn!("Alignment failure: {}", failure);
        }

        {
            let mut live = self.live.write().await;
            live.index.apply(&diff.events);
            live.snapshot = Some(Arc::clone(&next));
        }

        let mut report = ReconcileReport {
            version: state.version,
            events: diff.events.len(),
            joined: diff.joins().count(),
            left: diff.leaves().count(),
            created: diff.created,
            deleted: diff.deleted,
            alignment_failures: diff.failures.len(),
            ..ReconcileReport::default()
        };

        for event in &diff.events {
            log_event(event);
            // No subscribers is fine
            let _ = self.events.send(event.clone());
        }

        self.persist_seen(&diff.events, &next, &mut report).await;
        self.remember_users(&diff.events, &mut report).await;
        self.dispatch_notifications(&diff.events, &mut report).await;

        if !diff.is_quiet() {
            tracing::debug!(
                "Cycle {}: {} joined, {} left, {} created, {} deleted",
                report.version,
                report.joined,
                report.left,
                report.created,
                report.deleted
            );
        }
        report
    }

    async fn persist_seen(
        &self,
        events: &[RosterEvent],
        next: &Snapshot,
        report: &mut ReconcileReport,
    ) {
        let (with_country, without_country) = seen_batches(events);
        let seen_at = next.fetched_at();

        if !without_country.is_empty()
            && let Err(error) = self
                .seen
                .upsert_without_country(&without_country, seen_at)
                .await
        {
            tracing::error!(
                "Unable to save {} seen records without country: {}",
                without_country.len(),
                error
            );
            report.persist_failures.push(PersistFailure {
                step: PersistStep::SeenWithoutCountry,
                error,
            });
        }

        if !with_country.is_empty()
            && let Err(error) = self.seen.upsert_with_country(&with_country, seen_at).await
        {
            tracing::error!(
                "Unable to save {} seen records: {}",
                with_country.len(),
                error
            );
            report.persist_failures.push(PersistFailure {
                step: PersistStep::SeenWithCountry,
                error,
            });
        }
    }

    async fn remember_users(&self, events: &[RosterEvent], report: &mut ReconcileReport) {
        let users: Vec<KnownUser> = events
            .iter()
            .filter_map(|e| match e {
                RosterEvent::PlayerJoined { player, .. } => Some(KnownUser {
                    user_id: player.user_id,
                    username: player.username.clone(),
                }),
                _ => None,
            })
            .collect();
        if users.is_empty() {
            return;
        }

        if let Err(error) = self.users.remember(&users).await {
            tracing::error!("Unable to remember {} users: {}", users.len(), error);
            report.persist_failures.push(PersistFailure {
                step: PersistStep::KnownUsers,
                error,
            });
        }
    }

    async fn dispatch_notifications(&self, events: &[RosterEvent], report: &mut ReconcileReport) {
        let mut unique = HashSet::new();
        let usernames: Vec<Username> = events
            .iter()
            .filter_map(|e| match e {
                RosterEvent::PlayerJoined { player, .. } | RosterEvent::PlayerLeft { player, .. } => {
                    Some(&player.username)
                }
                _ => None,
            })
            .filter(|u| unique.insert(*u))
            .cloned()
            .collect();
        if usernames.is_empty() {
            return;
        }

        let subscribers = match self.tracking.subscribers_for(&usernames).await {
            Ok(subscribers) => subscribers,
            Err(error) => {
                tracing::error!("Unable to look up subscribers: {}", error);
                report.persist_failures.push(PersistFailure {
                    step: PersistStep::SubscriberLookup,
                    error,
                });
                return;
            }
        };

        for event in events {
            let (presence, server, player) = match event {
                RosterEvent::PlayerJoined { server, player } => (Presence::Joined, server, player),
                RosterEvent::PlayerLeft { server, player } => (Presence::Left, server, player),
                _ => continue,
            };
            let Some(ids) = subscribers.get(&player.username) else {
                continue;
            };
            for subscriber in ids {
                let notification = Notification {
                    subscriber: *subscriber,
                    presence,
                    player: player.clone(),
                    server: Arc::clone(server),
                };
                match self.notifications.try_send(notification) {
                    Ok(()) => report.notifications_queued += 1,
                    Err(TrySendError::Full(n)) => {
                        tracing::warn!(
                            "Notification queue full; dropping notification for {} about {}",
                            n.subscriber,
                            n.player.username
                        );
                        report.notifications_dropped += 1;
                    }
                    Err(TrySendError::Closed(n)) => {
                        tracing::warn!(
                            "Notification worker stopped; dropping notification for {}",
                            n.subscriber
                        );
                        report.notifications_dropped += 1;
                    }
                }
            }
        }
    }
}

/// Split seen writes into the batch that overwrites the country and the one that keeps it.
///
/// Leaves come before joins in each batch, so a player who moved servers within one cycle
/// ends up recorded on the server they joined.
fn seen_batches(events: &[RosterEvent]) -> (Vec<SeenUpdate>, Vec<SeenUpdate>) {
    let mut with_country = Vec::new();
    let mut without_country = Vec::new();

    for event in events {
        if let RosterEvent::PlayerLeft { server, player } = event {
            let update = SeenUpdate::new(player, server);
            if update.country.is_some() {
                with_country.push(update);
            } else {
                without_country.push(update);
            }
        }
    }
    for event in events {
        if let RosterEvent::PlayerJoined { server, player } = event
            && player.country_code.is_some()
        {
            with_country.push(SeenUpdate::new(player, server));
        }
    }

    (with_country, without_country)
}

fn country_label(server: &Server) -> &str {
    server.country_code.as_ref().map_or("??", |c| c.as_str())
}

fn log_event(event: &RosterEvent) {
    let server = event.server();
    match event {
        RosterEvent::ServerCreated { .. } => tracing::info!(
            "New server created: {} ({}) with id {} and address {}",
            server.display_name(),
            country_label(server),
            server.id,
            server.address()
        ),
        RosterEvent::ServerDeleted { .. } => tracing::info!(
            "Server deleted: {} ({}) with id {} and address {}",
            server.display_name(),
            country_label(server),
            server.id,
            server.address()
        ),
        RosterEvent::PlayerJoined { player, .. } => {
            tracing::info!("{} joined {}", player.username, server.display_name())
        }
        RosterEvent::PlayerLeft { player, .. } => {
            tracing::info!("{} left {}", player.username, server.display_name())
        }
        RosterEvent::TrackChanged { change, .. } => match change {
            TrackChange::SessionStarted { track } => tracing::info!(
                "Game started at {} {} - {}",
                server.display_name(),
                server.id,
                track
            ),
            TrackChange::SessionEnded { .. } => {
                tracing::info!("Game ended at {} {}", server.display_name(), server.id)
            }
            TrackChange::Changed { from, to } => tracing::info!(
                "Track changed at {} {}: {} -> {}",
                server.display_name(),
                server.id,
                from,
                to
            ),
        },
        RosterEvent::ConfigChanged { changes, .. } => {
            let attributes: Vec<&str> = changes.iter().map(|c| c.attribute.as_str()).collect();
            tracing::info!(
                "Config difference detected at {}: {}",
                server.display_name(),
                attributes.join(", ")
            );
        }
        RosterEvent::RosterCapacityChanged {
            previous, current, ..
        } => tracing::debug!(
            "Server {} went from {} to {} players",
            server.display_name(),
            previous,
            current
        ),
    }
}
