//! Roster differ.
//!
//! Compares the previous snapshot with the current one and produces [`RosterEvent`]s.
//! Everything here is pure: no I/O, no locks, no awaits.
//!
//! The upstream list keeps servers in a mostly stable order, but servers appearing or
//! disappearing shift the positions of everything after them. [`align`] pairs servers of
//! the two snapshots with a single forward walk and a drifting offset that absorbs those
//! shifts. It is not a general sequence alignment: a real reordering of surviving servers
//! produces [`AlignmentFailure`]s for the affected positions, which are skipped.

use std::{collections::HashSet, sync::Arc};

use thiserror::Error;

use super::{
    entity::{Server, Snapshot},
    event::{ConfigAttribute, ConfigChange, RosterEvent, TrackChange},
    value_object::ServerId,
};

/// Server ids present in only one of the two snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerSetDiff {
    /// In the new snapshot only
    pub created: HashSet<ServerId>,
    /// In the previous snapshot only
    pub deleted: HashSet<ServerId>,
}

impl ServerSetDiff {
    pub fn between(previous: &Snapshot, next: &Snapshot) -> Self {
        let old_ids = previous.ids();
        let new_ids = next.ids();
        Self {
            created: new_ids.difference(&old_ids).copied().collect(),
            deleted: old_ids.difference(&new_ids).copied().collect(),
        }
    }
}

/// Positions of the same server in the previous and the new snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerPair {
    pub previous: usize,
    pub next: usize,
}

/// A position of the new snapshot that could not be paired
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignmentFailure {
    #[error(
        "previous index {position} out of range for server {id}: index={index}, offset={offset}, \
         new len={new_len}, previous len={previous_len}"
    )]
    OutOfRange {
        id: ServerId,
        index: usize,
        offset: isize,
        position: isize,
        new_len: usize,
        previous_len: usize,
    },

    #[error(
        "no offset found for server {id}: candidate {candidate} at previous index {position}, \
         index={index}, offset={offset}, new len={new_len}, previous len={previous_len}"
    )]
    Mismatch {
        id: ServerId,
        candidate: ServerId,
        index: usize,
        offset: isize,
        position: usize,
        new_len: usize,
        previous_len: usize,
    },
}

/// Result of [`align`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alignment {
    pub pairs: Vec<ServerPair>,
    pub failures: Vec<AlignmentFailure>,
}

/// Pair surviving servers of `previous` and `next` by position.
///
/// Walks `next` once, keeping an offset into `previous`:
/// - same id at `index + offset`: paired;
/// - a created server: it has no counterpart and pushes later servers one slot
///   forward, so the offset drops by one;
/// - otherwise deleted servers in `previous` are skipped (offset grows by one each)
///   until the id matches. Hitting a server that is neither deleted nor matching, or
///   running off the end of `previous`, records a failure for this index only.
pub fn align(
    previous: &[Arc<Server>],
    next: &[Arc<Server>],
    created: &HashSet<ServerId>,
    deleted: &HashSet<ServerId>,
) -> Alignment {
    let mut alignment = Alignment::default();
    let mut offset: isize = 0;

    for (index, server) in next.iter().enumerate() {
        if created.contains(&server.id) {
            offset -= 1;
            continue;
        }

        loop {
            let position = index as isize + offset;
            let candidate = usize::try_from(position)
                .ok()
                .and_then(|p| previous.get(p).map(|s| (p, s)));

            let Some((position, candidate)) = candidate else {
                alignment.failures.push(AlignmentFailure::OutOfRange {
                    id: server.id,
                    index,
                    offset,
                    position,
                    new_len: next.len(),
                    previous_len: previous.len(),
                });
                break;
            };

            if candidate.id == server.id {
                alignment.pairs.push(ServerPair {
                    previous: position,
                    next: index,
                });
                break;
            }

            if deleted.contains(&candidate.id) {
                offset += 1;
                continue;
            }

            alignment.failures.push(AlignmentFailure::Mismatch {
                id: server.id,
                candidate: candidate.id,
                index,
                offset,
                position,
                new_len: next.len(),
                previous_len: previous.len(),
            });
            break;
        }
    }

    alignment
}

/// Everything one reconcile cycle observed
#[derive(Debug, Clone, Default)]
pub struct RosterDiff {
    pub events: Vec<RosterEvent>,
    pub failures: Vec<AlignmentFailure>,
    pub created: usize,
    pub deleted: usize,
    pub paired: usize,
}

impl RosterDiff {
    pub fn joins(&self) -> impl Iterator<Item = &RosterEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, RosterEvent::PlayerJoined { .. }))
    }

    pub fn leaves(&self) -> impl Iterator<Item = &RosterEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, RosterEvent::PlayerLeft { .. }))
    }

    /// No created, deleted, joined or left events
    pub fn is_quiet(&self) -> bool {
        !self.events.iter().any(|e| {
            matches!(
                e,
                RosterEvent::ServerCreated { .. }
                    | RosterEvent::ServerDeleted { .. }
                    | RosterEvent::PlayerJoined { .. }
                    | RosterEvent::PlayerLeft { .. }
            )
        })
    }
}

/// Diff two snapshots.
///
/// Event order: created servers with their bulk joins (new snapshot order), deleted
/// servers with their bulk leaves (previous snapshot order), then per-pair events in new
/// snapshot order.
pub fn diff_snapshots(previous: &Snapshot, next: &Snapshot) -> RosterDiff {
    let sets = ServerSetDiff::between(previous, next);
    let mut diff = RosterDiff {
        created: sets.created.len(),
        deleted: sets.deleted.len(),
        ..RosterDiff::default()
    };

    for server in next.servers().iter().filter(|s| sets.created.contains(&s.id)) {
        diff.events.push(RosterEvent::ServerCreated {
            server: Arc::clone(server),
        });
        for player in &server.players {
            diff.events.push(RosterEvent::PlayerJoined {
                server: Arc::clone(server),
                player: player.clone(),
            });
        }
    }

    for server in previous
        .servers()
        .iter()
        .filter(|s| sets.deleted.contains(&s.id))
    {
        diff.events.push(RosterEvent::ServerDeleted {
            server: Arc::clone(server),
        });
        for player in &server.players {
            diff.events.push(RosterEvent::PlayerLeft {
                server: Arc::clone(server),
                player: player.clone(),
            });
        }
    }

    let alignment = align(
        previous.servers(),
        next.servers(),
        &sets.created,
        &sets.deleted,
    );
    diff.paired = alignment.pairs.len();
    diff.failures = alignment.failures;

    for pair in alignment.pairs {
        diff_pair(
            &previous.servers()[pair.previous],
            &next.servers()[pair.next],
            &mut diff.events,
        );
    }

    diff
}

fn diff_pair(old: &Arc<Server>, new: &Arc<Server>, events: &mut Vec<RosterEvent>) {
    if let Some(change) = track_change(&old.current_track, &new.current_track) {
        events.push(RosterEvent::TrackChanged {
            server: Arc::clone(new),
            change,
        });
    }

    let changes = config_changes(old, new);
    if !changes.is_empty() {
        events.push(RosterEvent::ConfigChanged {
            server: Arc::clone(new),
            changes,
        });
    }

    let old_names = old.usernames();
    let new_names = new.usernames();

    for player in new.players.iter().filter(|p| !old_names.contains(&p.username)) {
        events.push(RosterEvent::PlayerJoined {
            server: Arc::clone(new),
            player: player.clone(),
        });
    }
    for player in old.players.iter().filter(|p| !new_names.contains(&p.username)) {
        events.push(RosterEvent::PlayerLeft {
            server: Arc::clone(old),
            player: player.clone(),
        });
    }

    if old.players.len() != new.players.len() {
        events.push(RosterEvent::RosterCapacityChanged {
            server: Arc::clone(new),
            previous: old.players.len(),
            current: new.players.len(),
        });
    }
}

fn track_change(old: &str, new: &str) -> Option<TrackChange> {
    if old == new {
        return None;
    }
    Some(if old.is_empty() {
        TrackChange::SessionStarted {
            track: new.to_string(),
        }
    } else if new.is_empty() {
        TrackChange::SessionEnded {
            previous: old.to_string(),
        }
    } else {
        TrackChange::Changed {
            from: old.to_string(),
            to: new.to_string(),
        }
    })
}

fn config_changes(old: &Server, new: &Server) -> Vec<ConfigChange> {
    [
        (ConfigAttribute::MaxPlayers, old.max_players, new.max_players),
        (ConfigAttribute::GameMode, old.game_mode, new.game_mode),
        (ConfigAttribute::Difficulty, old.difficulty, new.difficulty),
    ]
    .into_iter()
    .filter(|(_, previous, current)| previous != current)
    .map(|(attribute, previous, current)| ConfigChange {
        attribute,
        previous,
        current,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::fixtures::{server, snapshot};

    fn joined(diff: &RosterDiff) -> Vec<(u32, String)> {
        diff.events
            .iter()
            .filter_map(|e| match e {
                RosterEvent::PlayerJoined { server, player } => {
                    Some((server.id.value(), player.username.to_string()))
                }
                _ => None,
            })
            .collect()
    }

    fn left(diff: &RosterDiff) -> Vec<(u32, String)> {
        diff.events
            .iter()
            .filter_map(|e| match e {
                RosterEvent::PlayerLeft { server, player } => {
                    Some((server.id.value(), player.username.to_string()))
                }
                _ => None,
            })
            .collect()
    }

    fn ids(values: &[u32]) -> HashSet<ServerId> {
        values.iter().copied().map(ServerId::new).collect()
    }

    #[test]
    fn test_diff_identical_snapshots_is_quiet() {
        // テスト項目: 同じスナップショット同士の差分ではイベントが発生しない
        // given (前提条件):
        let snap = snapshot(vec![
            server(1, &["alice", "bob"]),
            server(2, &[]),
            server(3, &["carol"]),
        ]);

        // when (操作):
        let diff = diff_snapshots(&snap, &snap);

        // then (期待する結果):
        assert!(diff.events.is_empty());
        assert!(diff.failures.is_empty());
        assert_eq!(diff.paired, 3);
        assert!(diff.is_quiet());
    }

    #[test]
    fn test_diff_single_join() {
        // テスト項目: 既存サーバーに 1 人参加すると、その 1 人分の参加イベントだけが出る
        // given (前提条件):
        let previous = snapshot(vec![server(1, &["alice"])]);
        let next = snapshot(vec![server(1, &["alice", "bob"])]);

        // when (操作):
        let diff = diff_snapshots(&previous, &next);

        // then (期待する結果):
        assert_eq!(joined(&diff), vec![(1, "bob".to_string())]);
        assert!(left(&diff).is_empty());
        assert_eq!(diff.created, 0);
        assert_eq!(diff.deleted, 0);
        assert!(diff.events.iter().any(|e| matches!(
            e,
            RosterEvent::RosterCapacityChanged {
                previous: 1,
                current: 2,
                ..
            }
        )));
    }

    #[test]
    fn test_diff_server_deleted() {
        // テスト項目: サーバーが消えると削除イベントと全員分の退出イベントが出る
        // given (前提条件):
        let previous = snapshot(vec![server(1, &["alice", "bob"])]);
        let next = snapshot(vec![]);

        // when (操作):
        let diff = diff_snapshots(&previous, &next);

        // then (期待する結果):
        assert!(matches!(
            &diff.events[0],
            RosterEvent::ServerDeleted { server } if server.id == ServerId::new(1)
        ));
        assert_eq!(
            left(&diff),
            vec![(1, "alice".to_string()), (1, "bob".to_string())]
        );
        assert!(joined(&diff).is_empty());
        assert_eq!(diff.deleted, 1);
    }

    #[test]
    fn test_diff_server_created_bulk_joins() {
        // テスト項目: 新しいサーバーのプレイヤーは全員参加扱いになる
        // given (前提条件):
        let previous = snapshot(vec![server(1, &["alice"])]);
        let next = snapshot(vec![server(1, &["alice"]), server(2, &["dave", "erin"])]);

        // when (操作):
        let diff = diff_snapshots(&previous, &next);

        // then (期待する結果):
        assert!(matches!(
            &diff.events[0],
            RosterEvent::ServerCreated { server } if server.id == ServerId::new(2)
        ));
        assert_eq!(
            joined(&diff),
            vec![(2, "dave".to_string()), (2, "erin".to_string())]
        );
        assert!(diff.failures.is_empty());
    }

    #[test]
    fn test_diff_inserted_server_shifts_alignment() {
        // テスト項目: 先頭にサーバーが挿入されても既存サーバー同士が正しく対応付けられる
        // given (前提条件):
        let previous = snapshot(vec![server(1, &["alice"]), server(2, &["bob"])]);
        let next = snapshot(vec![
            server(3, &["xavier"]),
            server(1, &["alice"]),
            server(2, &["bob"]),
        ]);

        // when (操作):
        let diff = diff_snapshots(&previous, &next);

        // then (期待する結果): X のプレイヤーだけが参加扱い
        assert_eq!(diff.paired, 2);
        assert!(diff.failures.is_empty());
        assert_eq!(joined(&diff), vec![(3, "xavier".to_string())]);
        assert!(left(&diff).is_empty());
    }

    #[test]
    fn test_diff_player_moves_between_servers() {
        // テスト項目: サーバー間の移動は移動元の退出と移動先の参加になる
        // given (前提条件):
        let previous = snapshot(vec![server(1, &["alice"]), server(2, &[])]);
        let next = snapshot(vec![server(1, &[]), server(2, &["alice"])]);

        // when (操作):
        let diff = diff_snapshots(&previous, &next);

        // then (期待する結果):
        assert_eq!(joined(&diff), vec![(2, "alice".to_string())]);
        assert_eq!(left(&diff), vec![(1, "alice".to_string())]);
    }

    #[test]
    fn test_diff_track_changes() {
        // テスト項目: トラックの開始・終了・変更がそれぞれ区別される
        // given (前提条件):
        let mut lobby = server(1, &[]);
        lobby.current_track = String::new();
        let mut racing = server(1, &[]);
        racing.current_track = "abyss".to_string();
        let mut other = server(1, &[]);
        other.current_track = "hacienda".to_string();

        let track_event = |a: &Server, b: &Server| {
            diff_snapshots(&snapshot(vec![a.clone()]), &snapshot(vec![b.clone()]))
                .events
                .into_iter()
                .find_map(|e| match e {
                    RosterEvent::TrackChanged { change, .. } => Some(change),
                    _ => None,
                })
        };

        // then (期待する結果):
        assert_eq!(
            track_event(&lobby, &racing),
            Some(TrackChange::SessionStarted {
                track: "abyss".to_string()
            })
        );
        assert_eq!(
            track_event(&racing, &lobby),
            Some(TrackChange::SessionEnded {
                previous: "abyss".to_string()
            })
        );
        assert_eq!(
            track_event(&racing, &other),
            Some(TrackChange::Changed {
                from: "abyss".to_string(),
                to: "hacienda".to_string()
            })
        );
        assert_eq!(track_event(&racing, &racing), None);
    }

    #[test]
    fn test_diff_config_changes() {
        // テスト項目: 設定が変わった属性だけが通知される
        // given (前提条件):
        let old = server(1, &[]);
        let mut new = server(1, &[]);
        new.max_players = 12;
        new.difficulty = 3;

        // when (操作):
        let diff = diff_snapshots(&snapshot(vec![old]), &snapshot(vec![new]));

        // then (期待する結果):
        let changes = diff
            .events
            .iter()
            .find_map(|e| match e {
                RosterEvent::ConfigChanged { changes, .. } => Some(changes.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(
            changes,
            vec![
                ConfigChange {
                    attribute: ConfigAttribute::MaxPlayers,
                    previous: 8,
                    current: 12
                },
                ConfigChange {
                    attribute: ConfigAttribute::Difficulty,
                    previous: 2,
                    current: 3
                },
            ]
        );
    }

    #[test]
    fn test_diff_created_and_deleted_are_disjoint() {
        // テスト項目: 作成と削除のサーバー集合は重ならない
        let cases = [
            (vec![1, 2, 3], vec![3, 4, 5]),
            (vec![], vec![1]),
            (vec![1], vec![]),
            (vec![7, 8], vec![8, 7]),
        ];

        for (old, new) in cases {
            let previous = snapshot(old.iter().map(|id| server(*id, &[])).collect());
            let next = snapshot(new.iter().map(|id| server(*id, &[])).collect());
            let sets = ServerSetDiff::between(&previous, &next);

            assert!(sets.created.is_disjoint(&sets.deleted));
        }
    }

    #[test]
    fn test_diff_joined_and_left_are_disjoint_per_server() {
        // テスト項目: 同じサーバーで同じユーザーが参加と退出の両方になることはない
        // given (前提条件):
        let previous = snapshot(vec![server(1, &["alice", "bob", "carol"])]);
        let next = snapshot(vec![server(1, &["carol", "dave", "alice"])]);

        // when (操作):
        let diff = diff_snapshots(&previous, &next);

        // then (期待する結果):
        let joined: HashSet<_> = joined(&diff).into_iter().collect();
        let left: HashSet<_> = left(&diff).into_iter().collect();
        assert!(joined.is_disjoint(&left));
        assert_eq!(joined, HashSet::from([(1, "dave".to_string())]));
        assert_eq!(left, HashSet::from([(1, "bob".to_string())]));
    }

    #[test]
    fn test_align_skips_deleted_servers() {
        // テスト項目: 削除されたサーバーを飛ばしてオフセットが進む
        // given (前提条件):
        let previous = snapshot(vec![
            server(1, &[]),
            server(2, &[]),
            server(3, &[]),
            server(4, &[]),
        ]);
        let next = snapshot(vec![server(1, &[]), server(4, &[])]);

        // when (操作):
        let alignment = align(
            previous.servers(),
            next.servers(),
            &ids(&[]),
            &ids(&[2, 3]),
        );

        // then (期待する結果):
        assert!(alignment.failures.is_empty());
        assert_eq!(
            alignment.pairs,
            vec![
                ServerPair {
                    previous: 0,
                    next: 0
                },
                ServerPair {
                    previous: 3,
                    next: 1
                },
            ]
        );
    }

    #[test]
    fn test_align_mixed_insert_and_delete() {
        // テスト項目: 挿入と削除が同時に起きても対応付けできる
        // given (前提条件):
        let previous = snapshot(vec![server(1, &[]), server(2, &[]), server(3, &[])]);
        let next = snapshot(vec![server(1, &[]), server(9, &[]), server(3, &[])]);

        // when (操作):
        let alignment = align(previous.servers(), next.servers(), &ids(&[9]), &ids(&[2]));

        // then (期待する結果):
        assert!(alignment.failures.is_empty());
        assert_eq!(
            alignment.pairs,
            vec![
                ServerPair {
                    previous: 0,
                    next: 0
                },
                ServerPair {
                    previous: 2,
                    next: 2
                },
            ]
        );
    }

    #[test]
    fn test_align_created_server_at_tail_is_not_a_failure() {
        // テスト項目: 末尾に追加されたサーバーは範囲外エラーにならない
        let previous = snapshot(vec![server(1, &[])]);
        let next = snapshot(vec![server(1, &[]), server(2, &[])]);

        let alignment = align(previous.servers(), next.servers(), &ids(&[2]), &ids(&[]));

        assert!(alignment.failures.is_empty());
        assert_eq!(alignment.pairs.len(), 1);
    }

    #[test]
    fn test_align_reordering_reports_mismatch() {
        // テスト項目: 並び替えは対応付けに失敗し、その位置だけがスキップされる
        // given (前提条件):
        let previous = snapshot(vec![server(1, &[]), server(2, &[]), server(3, &[])]);
        let next = snapshot(vec![server(2, &[]), server(1, &[]), server(3, &[])]);

        // when (操作):
        let alignment = align(previous.servers(), next.servers(), &ids(&[]), &ids(&[]));

        // then (期待する結果):
        assert_eq!(
            alignment.pairs,
            vec![ServerPair {
                previous: 2,
                next: 2
            }]
        );
        assert_eq!(alignment.failures.len(), 2);
        assert_eq!(
            alignment.failures[0],
            AlignmentFailure::Mismatch {
                id: ServerId::new(2),
                candidate: ServerId::new(1),
                index: 0,
                offset: 0,
                position: 0,
                new_len: 3,
                previous_len: 3,
            }
        );
    }

    #[test]
    fn test_align_running_past_previous_reports_out_of_range() {
        // テスト項目: 削除を飛ばして末尾を越えた場合は範囲外として記録される
        // given (前提条件): previous にしか無い 2 が削除扱い、次の候補が存在しない
        let previous = snapshot(vec![server(1, &[]), server(2, &[])]);
        let next = snapshot(vec![server(1, &[]), server(5, &[])]);

        // when (操作): 5 を created に含めない不整合な入力でも panic しない
        let alignment = align(previous.servers(), next.servers(), &ids(&[]), &ids(&[2]));

        // then (期待する結果):
        assert_eq!(alignment.pairs.len(), 1);
        assert!(matches!(
            alignment.failures.as_slice(),
            [AlignmentFailure::OutOfRange {
                index: 1,
                offset: 1,
                position: 2,
                new_len: 2,
                previous_len: 2,
                ..
            }]
        ));
    }
}
