//! `reqwest`-backed implementation of the backend gateway

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::ClientConfig;
use crate::domain::{
    CategoryId, Event, EventId, NewTransaction, RequestStatus, RoleChangeRequest,
    RoleChangeRequestId, Subscription, SubscriptionId, Transaction, User, UserId, UserPatch,
};

use super::{routes, ApiError, ApiResult, AuthResponse, BackendApi};

/// HTTP gateway to the Eventum backend.
///
/// Owns the base URL, the request timeout, and the bearer token
/// attached to authenticated calls. Every request shares the same
/// connection pool.
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl RestClient {
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.read().await.as_deref() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Check the status line, then decode the body. Non-2xx responses
    /// become `ApiError::Status` carrying the backend's message when
    /// the body yields one.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(ApiError::Decode)
    }

    /// Like `decode`, for endpoints whose success body is irrelevant.
    async fn expect_success(response: reqwest::Response) -> ApiResult<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await?;
        Err(ApiError::Status {
            status: status.as_u16(),
            message: extract_error_message(&body),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        debug!(path, "GET");
        let req = self.authorize(self.http.get(self.url(path))).await;
        Self::decode(req.send().await?).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        debug!(path, "POST");
        let req = self.authorize(self.http.post(self.url(path))).await;
        Self::decode(req.json(body).send().await?).await
    }

    async fn put_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        debug!(path, "PUT");
        let req = self.authorize(self.http.put(self.url(path))).await;
        Self::decode(req.json(body).send().await?).await
    }

    async fn delete_path(&self, path: &str) -> ApiResult<()> {
        debug!(path, "DELETE");
        let req = self.authorize(self.http.delete(self.url(path))).await;
        Self::expect_success(req.send().await?).await
    }
}

/// Pull a human-readable message out of an error body. The backend
/// sends `{"error": ...}` or `{"message": ...}`; anything else is
/// passed through raw.
fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    body.trim().to_string()
}

#[async_trait]
impl BackendApi for RestClient {
    async fn login(&self, name: &str, password: &str) -> ApiResult<AuthResponse> {
        self.post_json(routes::LOGIN, &json!({ "name": name, "password": password }))
            .await
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> ApiResult<AuthResponse> {
        self.post_json(
            routes::REGISTER,
            &json!({ "name": name, "email": email, "password": password }),
        )
        .await
    }

    async fn set_bearer_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    async fn fetch_user(&self, id: UserId) -> ApiResult<User> {
        self.get_json(&format!("{}/{id}", routes::USERS)).await
    }

    async fn update_user(&self, id: UserId, patch: &UserPatch) -> ApiResult<User> {
        self.put_json(&format!("{}/{id}", routes::USERS), patch).await
    }

    async fn create_role_change_request(
        &self,
        user_id: UserId,
        requested_role_id: i64,
    ) -> ApiResult<RoleChangeRequest> {
        self.post_json(
            routes::ROLE_CHANGE_REQUESTS,
            &json!({ "userId": user_id, "requestedRoleId": requested_role_id }),
        )
        .await
    }

    async fn fetch_role_change_requests(&self) -> ApiResult<Vec<RoleChangeRequest>> {
        self.get_json(routes::ROLE_CHANGE_REQUESTS).await
    }

    async fn update_role_change_request(
        &self,
        id: RoleChangeRequestId,
        status: RequestStatus,
    ) -> ApiResult<RoleChangeRequest> {
        self.put_json(
            &format!("{}/{id}", routes::ROLE_CHANGE_REQUESTS),
            &json!({ "status": status }),
        )
        .await
    }

    async fn fetch_subscriptions(&self) -> ApiResult<Vec<Subscription>> {
        self.get_json(routes::SUBSCRIPTIONS).await
    }

    async fn create_subscription(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> ApiResult<Subscription> {
        self.post_json(
            routes::SUBSCRIPTIONS,
            &json!({ "eventId": event_id, "userId": user_id }),
        )
        .await
    }

    async fn delete_subscription(&self, id: SubscriptionId) -> ApiResult<()> {
        self.delete_path(&format!("{}/{id}", routes::SUBSCRIPTIONS))
            .await
    }

    async fn fetch_transactions(&self) -> ApiResult<Vec<Transaction>> {
        self.get_json(routes::TRANSACTIONS).await
    }

    async fn create_transaction(&self, new: &NewTransaction) -> ApiResult<Transaction> {
        self.post_json(routes::TRANSACTIONS, new).await
    }

    async fn fetch_events_by_category(&self, category_id: CategoryId) -> ApiResult<Vec<Event>> {
        self.get_json(&format!("{}?categoryId={category_id}", routes::EVENTS))
            .await
    }

    async fn delete_event_categories_for(&self, category_id: CategoryId) -> ApiResult<()> {
        self.delete_path(&format!("{}/{category_id}/event-categories", routes::CATEGORIES))
            .await
    }

    async fn list_catalog(&self, route: &str) -> ApiResult<Vec<serde_json::Value>> {
        self.get_json(route).await
    }

    async fn create_catalog(
        &self,
        route: &str,
        body: serde_json::Value,
    ) -> ApiResult<serde_json::Value> {
        self.post_json(route, &body).await
    }

    async fn update_catalog(
        &self,
        route: &str,
        id: i64,
        body: serde_json::Value,
    ) -> ApiResult<serde_json::Value> {
        self.put_json(&format!("{route}/{id}"), &body).await
    }

    async fn delete_catalog(&self, route: &str, id: i64) -> ApiResult<()> {
        self.delete_path(&format!("{route}/{id}")).await
    }
}
