//! Generic per-entity catalog cache
//!
//! Each catalog store is an independent cache of the backend's listing
//! for one entity. Mutations go to the backend first; the local cache
//! is only updated once the server confirms, so the cache never shows
//! state the backend rejected.

use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::api::{routes, BackendApi};
use crate::domain::{Category, Event, EventCategory, EventSpeaker, RoleRecord, Speaker, User, Venue};
use crate::error::{ClientError, Result};

/// An entity served by the uniform catalog endpoints.
pub trait CatalogEntity: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection route for this entity.
    const ROUTE: &'static str;

    /// Backend id of this record.
    fn entity_id(&self) -> i64;
}

impl CatalogEntity for Event {
    const ROUTE: &'static str = routes::EVENTS;
    fn entity_id(&self) -> i64 {
        self.id.as_i64()
    }
}

impl CatalogEntity for Venue {
    const ROUTE: &'static str = routes::VENUES;
    fn entity_id(&self) -> i64 {
        self.id.as_i64()
    }
}

impl CatalogEntity for Category {
    const ROUTE: &'static str = routes::CATEGORIES;
    fn entity_id(&self) -> i64 {
        self.id.as_i64()
    }
}

impl CatalogEntity for Speaker {
    const ROUTE: &'static str = routes::SPEAKERS;
    fn entity_id(&self) -> i64 {
        self.id.as_i64()
    }
}

impl CatalogEntity for RoleRecord {
    const ROUTE: &'static str = routes::ROLES;
    fn entity_id(&self) -> i64 {
        self.id
    }
}

impl CatalogEntity for User {
    const ROUTE: &'static str = routes::USERS;
    fn entity_id(&self) -> i64 {
        self.id.as_i64()
    }
}

impl CatalogEntity for EventCategory {
    const ROUTE: &'static str = routes::EVENT_CATEGORIES;
    fn entity_id(&self) -> i64 {
        self.id
    }
}

impl CatalogEntity for EventSpeaker {
    const ROUTE: &'static str = routes::EVENT_SPEAKERS;
    fn entity_id(&self) -> i64 {
        self.id
    }
}

/// Cache-then-mutate wrapper over the catalog endpoints for one entity.
pub struct CatalogStore<T: CatalogEntity> {
    api: Arc<dyn BackendApi>,
    items: RwLock<Vec<T>>,
    loading: AtomicBool,
    last_error: RwLock<Option<String>>,
}

impl<T: CatalogEntity> CatalogStore<T> {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self {
            api,
            items: RwLock::new(Vec::new()),
            loading: AtomicBool::new(false),
            last_error: RwLock::new(None),
        }
    }

    /// Snapshot of the cached listing.
    pub async fn items(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Relaxed)
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    /// Replace the cache with the backend's current listing.
    pub async fn fetch_all(&self) -> Result<Vec<T>> {
        self.loading.store(true, Ordering::Relaxed);
        let result = self.fetch_all_inner().await;
        self.loading.store(false, Ordering::Relaxed);
        result
    }

    async fn fetch_all_inner(&self) -> Result<Vec<T>> {
        let raw = match self.api.list_catalog(T::ROUTE).await {
            Ok(raw) => raw,
            Err(err) => {
                self.record_error(&err).await;
                return Err(err.into());
            }
        };

        let items = decode_items::<T>(raw)?;
        debug!(route = T::ROUTE, count = items.len(), "catalog refreshed");
        *self.items.write().await = items.clone();
        *self.last_error.write().await = None;
        Ok(items)
    }

    /// Create a record; the cache gains it once the server confirms.
    pub async fn add(&self, body: serde_json::Value) -> Result<T> {
        match self.api.create_catalog(T::ROUTE, body).await {
            Ok(raw) => {
                let item: T = serde_json::from_value(raw)
                    .map_err(|e| ClientError::Api(crate::api::ApiError::Decode(e)))?;
                self.items.write().await.push(item.clone());
                *self.last_error.write().await = None;
                Ok(item)
            }
            Err(err) => {
                self.record_error(&err).await;
                Err(err.into())
            }
        }
    }

    /// Update a record in place.
    pub async fn update(&self, id: i64, body: serde_json::Value) -> Result<T> {
        match self.api.update_catalog(T::ROUTE, id, body).await {
            Ok(raw) => {
                let updated: T = serde_json::from_value(raw)
                    .map_err(|e| ClientError::Api(crate::api::ApiError::Decode(e)))?;
                let mut items = self.items.write().await;
                for item in items.iter_mut() {
                    if item.entity_id() == id {
                        *item = updated.clone();
                    }
                }
                *self.last_error.write().await = None;
                Ok(updated)
            }
            Err(err) => {
                self.record_error(&err).await;
                Err(err.into())
            }
        }
    }

    /// Delete a record; the cache drops it once the server confirms.
    pub async fn delete(&self, id: i64) -> Result<()> {
        match self.api.delete_catalog(T::ROUTE, id).await {
            Ok(()) => {
                self.evict(id).await;
                *self.last_error.write().await = None;
                Ok(())
            }
            Err(err) => {
                self.record_error(&err).await;
                Err(err.into())
            }
        }
    }

    pub(crate) async fn evict(&self, id: i64) {
        self.items.write().await.retain(|item| item.entity_id() != id);
    }

    pub(crate) fn api(&self) -> &Arc<dyn BackendApi> {
        &self.api
    }

    async fn record_error(&self, err: &crate::api::ApiError) {
        *self.last_error.write().await = Some(err.user_message());
    }
}

impl CatalogStore<Event> {
    /// Replace the cache with the events linked to one category.
    pub async fn fetch_by_category(
        &self,
        category_id: crate::domain::CategoryId,
    ) -> Result<Vec<Event>> {
        let events = self.api.fetch_events_by_category(category_id).await?;
        *self.items.write().await = events.clone();
        Ok(events)
    }
}

fn decode_items<T: CatalogEntity>(raw: Vec<serde_json::Value>) -> Result<Vec<T>> {
    raw.into_iter()
        .map(|value| {
            serde_json::from_value(value)
                .map_err(|e| ClientError::Api(crate::api::ApiError::Decode(e)))
        })
        .collect()
}

/// Event catalog.
pub type EventStore = CatalogStore<Event>;
/// Venue catalog.
pub type VenueStore = CatalogStore<Venue>;
/// Speaker catalog.
pub type SpeakerStore = CatalogStore<Speaker>;
/// Role catalog.
pub type RoleStore = CatalogStore<RoleRecord>;
/// User admin listing.
pub type UserStore = CatalogStore<User>;
/// Event-category link management.
pub type EventCategoryStore = CatalogStore<EventCategory>;
/// Event-speaker link management.
pub type EventSpeakerStore = CatalogStore<EventSpeaker>;
