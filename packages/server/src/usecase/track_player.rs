//! UseCase: 購読者ごとのプレイヤー追跡

use std::sync::Arc;

use super::error::TrackError;
use crate::domain::{SubscriberId, TrackList, TrackingRepository, Username};

pub struct TrackPlayerUseCase {
    repository: Arc<dyn TrackingRepository>,
    /// Maximum tracked usernames per subscriber
    limit: usize,
}

impl TrackPlayerUseCase {
    pub fn new(repository: Arc<dyn TrackingRepository>, limit: usize) -> Self {
        Self { repository, limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Start tracking `username`
    ///
    /// # Errors
    ///
    /// `AlreadyTracked` when present, `LimitReached` when the list is full.
    pub async fn track(
        &self,
        subscriber: SubscriberId,
        username: Username,
    ) -> Result<TrackList, TrackError> {
        let mut usernames = self.repository.tracked_by(subscriber).await?;
        if usernames.contains(&username) {
            return Err(TrackError::AlreadyTracked(username));
        }
        if usernames.len() >= self.limit {
            return Err(TrackError::LimitReached { limit: self.limit });
        }

        self.repository.add(subscriber, username.clone()).await?;
        tracing::info!("Subscriber {} now tracks {}", subscriber, username);
        usernames.push(username);
        Ok(TrackList {
            subscriber,
            usernames,
        })
    }

    /// Stop tracking `username`
    pub async fn untrack(
        &self,
        subscriber: SubscriberId,
        username: &Username,
    ) -> Result<(), TrackError> {
        if !self.repository.remove(subscriber, username).await? {
            return Err(TrackError::NotTracked(username.clone()));
        }
        tracing::info!("Subscriber {} stopped tracking {}", subscriber, username);
        Ok(())
    }

    pub async fn list(&self, subscriber: SubscriberId) -> Result<TrackList, TrackError> {
        Ok(TrackList {
            subscriber,
            usernames: self.repository.tracked_by(subscriber).await?,
        })
    }

    /// Untrack everything; returns how many usernames were removed
    pub async fn clear(&self, subscriber: SubscriberId) -> Result<usize, TrackError> {
        let removed = self.repository.clear(subscriber).await?;
        tracing::info!("Subscriber {} cleared {} tracked players", subscriber, removed);
        Ok(removed)
    }
}
