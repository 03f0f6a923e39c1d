//! InMemory Tracking Repository 実装

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RepositoryError, SubscriberId, TrackingRepository, Username};

#[derive(Default)]
pub struct InMemoryTrackingRepository {
    lists: Arc<Mutex<HashMap<SubscriberId, Vec<Username>>>>,
}

impl InMemoryTrackingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrackingRepository for InMemoryTrackingRepository {
    async fn tracked_by(&self, subscriber: SubscriberId) -> Result<Vec<Username>, RepositoryError> {
        let lists = self.lists.lock().await;
        Ok(lists.get(&subscriber).cloned().unwrap_or_default())
    }

    async fn add(
        &self,
        subscriber: SubscriberId,
        username: Username,
    ) -> Result<(), RepositoryError> {
        let mut lists = self.lists.lock().await;
        lists.entry(subscriber).or_default().push(username);
        Ok(())
    }

    async fn remove(
        &self,
        subscriber: SubscriberId,
        username: &Username,
    ) -> Result<bool, RepositoryError> {
        let mut lists = self.lists.lock().await;
        let Some(list) = lists.get_mut(&subscriber) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|u| u != username);
        Ok(list.len() != before)
    }

    async fn clear(&self, subscriber: SubscriberId) -> Result<usize, RepositoryError> {
        let mut lists = self.lists.lock().await;
        Ok(lists
            .get_mut(&subscriber)
            .map(|list| std::mem::take(list).len())
            .unwrap_or(0))
    }

    async fn subscribers_for(
        &self,
        usernames: &[Username],
    ) -> Result<HashMap<Username, Vec<SubscriberId>>, RepositoryError> {
        let lists = self.lists.lock().await;
        let mut result: HashMap<Username, Vec<SubscriberId>> = HashMap::new();
        for (subscriber, list) in lists.iter() {
            for username in usernames.iter().filter(|u| list.contains(u)) {
                result.entry(username.clone()).or_default().push(*subscriber);
            }
        }
        for subscribers in result.values_mut() {
            subscribers.sort();
        }
        Ok(result)
    }
}
