//! The backend gateway trait
//!
//! Every other component talks to the backend through this seam, so
//! tests can substitute a mock or an in-memory fake for the real HTTP
//! client.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;

use crate::domain::{
    CategoryId, Event, EventId, NewTransaction, RequestStatus, RoleChangeRequest,
    RoleChangeRequestId, Subscription, SubscriptionId, Transaction, User, UserId, UserPatch,
};

use super::ApiResult;

/// Response of the auth endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Gateway to the Eventum REST backend.
///
/// Thin by design: one method per endpoint, no caching, no policy. The
/// stores own caching and the payment coordinator owns ordering.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BackendApi: Send + Sync {
    // --- auth ---

    async fn login(&self, name: &str, password: &str) -> ApiResult<AuthResponse>;

    async fn register(&self, name: &str, email: &str, password: &str) -> ApiResult<AuthResponse>;

    /// Attach (or clear) the bearer token used on subsequent calls.
    async fn set_bearer_token(&self, token: Option<String>);

    // --- users ---

    async fn fetch_user(&self, id: UserId) -> ApiResult<User>;

    async fn update_user(&self, id: UserId, patch: &UserPatch) -> ApiResult<User>;

    // --- role-change requests ---

    async fn create_role_change_request(
        &self,
        user_id: UserId,
        requested_role_id: i64,
    ) -> ApiResult<RoleChangeRequest>;

    async fn fetch_role_change_requests(&self) -> ApiResult<Vec<RoleChangeRequest>>;

    /// Administrator status transition (`pending` -> `approved` or
    /// `rejected`).
    async fn update_role_change_request(
        &self,
        id: RoleChangeRequestId,
        status: RequestStatus,
    ) -> ApiResult<RoleChangeRequest>;

    // --- subscriptions ---

    async fn fetch_subscriptions(&self) -> ApiResult<Vec<Subscription>>;

    async fn create_subscription(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> ApiResult<Subscription>;

    async fn delete_subscription(&self, id: SubscriptionId) -> ApiResult<()>;

    // --- transactions ---

    async fn fetch_transactions(&self) -> ApiResult<Vec<Transaction>>;

    async fn create_transaction(&self, new: &NewTransaction) -> ApiResult<Transaction>;

    // --- events ---

    async fn fetch_events_by_category(&self, category_id: CategoryId) -> ApiResult<Vec<Event>>;

    /// Remove every event-category link pointing at a category, used by
    /// the referential-constraint delete fallback.
    async fn delete_event_categories_for(&self, category_id: CategoryId) -> ApiResult<()>;

    // --- generic catalog endpoints ---

    async fn list_catalog(&self, route: &str) -> ApiResult<Vec<serde_json::Value>>;

    async fn create_catalog(
        &self,
        route: &str,
        body: serde_json::Value,
    ) -> ApiResult<serde_json::Value>;

    async fn update_catalog(
        &self,
        route: &str,
        id: i64,
        body: serde_json::Value,
    ) -> ApiResult<serde_json::Value>;

    async fn delete_catalog(&self, route: &str, id: i64) -> ApiResult<()>;
}
