//! InMemory User Repository 実装

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{KnownUser, RepositoryError, UserRepository, Username};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<HashMap<u32, Username>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn remember(&self, users: &[KnownUser]) -> Result<(), RepositoryError> {
        let mut stored = self.users.lock().await;
        for user in users {
            stored
                .entry(user.user_id)
                .or_insert_with(|| user.username.clone());
        }
        Ok(())
    }

    async fn username_of(&self, user_id: u32) -> Result<Option<Username>, RepositoryError> {
        let stored = self.users.lock().await;
        Ok(stored.get(&user_id).cloned())
    }
}
