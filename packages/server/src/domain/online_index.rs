//! Live mapping from username to the server the player currently occupies.

use std::{collections::HashMap, sync::Arc};

use super::{
    entity::{Server, Snapshot},
    event::RosterEvent,
    value_object::{ServerId, Username},
};

/// Username to current server.
///
/// Only joins and leaves change it; entries never expire by time.
#[derive(Debug, Clone, Default)]
pub struct OnlineIndex {
    entries: HashMap<Username, Arc<Server>>,
}

impl OnlineIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from every player present in `snapshot`
    pub fn seed(&mut self, snapshot: &Snapshot) {
        self.entries.clear();
        for server in snapshot.servers() {
            for player in &server.players {
                self.entries
                    .insert(player.username.clone(), Arc::clone(server));
            }
        }
    }

    /// Record `username` as playing on `server`, replacing any previous entry
    pub fn join(&mut self, username: Username, server: Arc<Server>) {
        self.entries.insert(username, server);
    }

    /// Remove `username` if it is still indexed on `server`.
    ///
    /// A player who moved between two servers in the same poll may already have been
    /// re-indexed on the new server; that entry is kept.
    pub fn leave(&mut self, username: &Username, server: ServerId) -> bool {
        match self.entries.get(username) {
            Some(current) if current.id == server => {
                self.entries.remove(username);
                true
            }
            _ => false,
        }
    }

    /// Apply the joins and leaves of one diff
    pub fn apply(&mut self, events: &[RosterEvent]) {
        // Leaves first so a move between servers ends up on the new one regardless of
        // the order the events were produced in.
        for event in events {
            if let RosterEvent::PlayerLeft { server, player } = event {
                self.leave(&player.username, server.id);
            }
        }
        for event in events {
            if let RosterEvent::PlayerJoined { server, player } = event {
                self.join(player.username.clone(), Arc::clone(server));
            }
        }
    }

    pub fn lookup(&self, username: &Username) -> Option<&Arc<Server>> {
        self.entries.get(username)
    }

    pub fn is_online(&self, username: &Username) -> bool {
        self.entries.contains_key(username)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
