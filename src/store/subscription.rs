//! Subscription cache
//!
//! Holds the last-fetched snapshot of (user, event) subscription
//! records. Unlike the balance there is no optimistic update here:
//! a phantom subscription or phantom unsubscription is a worse
//! user-visible defect than a brief lag, so the cache only changes
//! once the server confirms.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::api::BackendApi;
use crate::domain::{EventId, Subscription, SubscriptionId, UserId};
use crate::error::Result;

pub struct SubscriptionStore {
    api: Arc<dyn BackendApi>,
    subscriptions: RwLock<Vec<Subscription>>,
    last_error: RwLock<Option<String>>,
}

impl SubscriptionStore {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self {
            api,
            subscriptions: RwLock::new(Vec::new()),
            last_error: RwLock::new(None),
        }
    }

    /// Replace the snapshot with the backend's current listing.
    ///
    /// Callers gating a decision on `is_subscribed` (the payment
    /// coordinator) must call this first; the snapshot is otherwise
    /// only as fresh as the last poll.
    pub async fn refresh(&self) -> Result<()> {
        match self.api.fetch_subscriptions().await {
            Ok(subscriptions) => {
                debug!(count = subscriptions.len(), "subscriptions refreshed");
                *self.subscriptions.write().await = subscriptions;
                *self.last_error.write().await = None;
                Ok(())
            }
            Err(err) => {
                *self.last_error.write().await = Some(err.user_message());
                Err(err.into())
            }
        }
    }

    /// Snapshot of all cached subscription records.
    pub async fn snapshot(&self) -> Vec<Subscription> {
        self.subscriptions.read().await.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    /// Create a subscription; the cache gains it once the server
    /// confirms.
    pub async fn add(&self, event_id: EventId, user_id: UserId) -> Result<Subscription> {
        match self.api.create_subscription(event_id, user_id).await {
            Ok(subscription) => {
                self.subscriptions.write().await.push(subscription.clone());
                *self.last_error.write().await = None;
                Ok(subscription)
            }
            Err(err) => {
                *self.last_error.write().await = Some(err.user_message());
                Err(err.into())
            }
        }
    }

    /// Delete a subscription record; the cache drops it once the
    /// server confirms.
    pub async fn delete(&self, id: SubscriptionId) -> Result<()> {
        match self.api.delete_subscription(id).await {
            Ok(()) => {
                self.subscriptions.write().await.retain(|sub| sub.id != id);
                *self.last_error.write().await = None;
                Ok(())
            }
            Err(err) => {
                *self.last_error.write().await = Some(err.user_message());
                Err(err.into())
            }
        }
    }

    /// All subscriptions belonging to one user.
    pub async fn list_for_user(&self, user_id: UserId) -> Vec<Subscription> {
        self.subscriptions
            .read()
            .await
            .iter()
            .filter(|sub| sub.user_id == user_id)
            .cloned()
            .collect()
    }

    /// The subscription for a (user, event) pair, if the snapshot has
    /// one.
    pub async fn find(&self, event_id: EventId, user_id: UserId) -> Option<Subscription> {
        self.subscriptions
            .read()
            .await
            .iter()
            .find(|sub| sub.event_id == event_id && sub.user_id == user_id)
            .cloned()
    }

    /// Whether the last-fetched snapshot holds a subscription for the
    /// pair.
    pub async fn is_subscribed(&self, event_id: EventId, user_id: UserId) -> bool {
        self.find(event_id, user_id).await.is_some()
    }
}
