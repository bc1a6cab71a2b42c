//! Common test utilities: an in-memory backend and fixture builders

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

use eventum_client::api::{ApiError, ApiResult, AuthResponse, BackendApi};
use eventum_client::domain::{
    Category, CategoryId, Event, EventId, NewTransaction, RequestStatus, RoleChangeRequest,
    RoleChangeRequestId, Subscription, SubscriptionId, Transaction, TransactionId, User, UserId,
    UserPatch,
};
use eventum_client::session::{CredentialCache, SessionStore, StoredCredentials};
use eventum_client::store::SubscriptionStore;
use eventum_client::{Metrics, PaymentCoordinator};

// ============================================================================
// Fixture builders
// ============================================================================

pub fn test_user(id: i64, name: &str, balance: i64) -> User {
    User {
        id: UserId::new(id),
        name: name.to_string(),
        email: format!("{name}@example.com"),
        password: None,
        balance,
        role_id: 1,
        role_change_requests: vec![],
        avatar: None,
        speaker_profiles: vec![],
    }
}

pub fn free_event(id: i64, organizer: i64) -> Event {
    Event {
        id: EventId::new(id),
        name: format!("event-{id}"),
        description: String::new(),
        date: Utc::now(),
        is_paid: false,
        price: None,
        organizer_id: UserId::new(organizer),
        organizer: None,
        venue_id: None,
        venue: None,
        image: None,
        categories: vec![],
        speakers: vec![],
        subscriptions: vec![],
    }
}

pub fn paid_event(id: i64, organizer: i64, price: i64) -> Event {
    Event {
        is_paid: true,
        price: Some(price),
        ..free_event(id, organizer)
    }
}

// ============================================================================
// In-memory credential cache
// ============================================================================

#[derive(Default)]
pub struct MemoryCredentialCache {
    slot: Mutex<Option<StoredCredentials>>,
}

impl CredentialCache for MemoryCredentialCache {
    fn load(&self) -> Option<StoredCredentials> {
        self.slot.lock().unwrap().clone()
    }

    fn store(&self, credentials: &StoredCredentials) {
        *self.slot.lock().unwrap() = Some(credentials.clone());
    }

    fn clear(&self) {
        *self.slot.lock().unwrap() = None;
    }
}

// ============================================================================
// In-memory backend
// ============================================================================

#[derive(Default)]
struct BackendState {
    users: Vec<User>,
    subscriptions: Vec<Subscription>,
    transactions: Vec<Transaction>,
    role_requests: Vec<RoleChangeRequest>,
    categories: Vec<Category>,
    /// (link id, category id) pairs standing in for EventCategory rows
    category_links: Vec<(i64, CategoryId)>,
    next_id: i64,
}

impl BackendState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Fake backend holding everything in memory.
///
/// Failure injection flags model the partial-failure windows the
/// payment flow has to survive:
///
/// - `fail_transactions`: transaction POST returns 500
/// - `detach_subscription_from_payment`: a successful transaction no
///   longer creates the subscription record (the asymmetric-failure
///   window)
/// - `fail_user_updates`: user PUT returns 500 (balance flush failure)
/// - `fail_subscription_fetch`: subscription GET returns 500
pub struct InMemoryBackend {
    state: RwLock<BackendState>,
    pub fail_transactions: AtomicBool,
    pub detach_subscription_from_payment: AtomicBool,
    pub fail_user_updates: AtomicBool,
    pub fail_subscription_fetch: AtomicBool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(BackendState {
                next_id: 1000,
                ..BackendState::default()
            }),
            fail_transactions: AtomicBool::new(false),
            detach_subscription_from_payment: AtomicBool::new(false),
            fail_user_updates: AtomicBool::new(false),
            fail_subscription_fetch: AtomicBool::new(false),
        }
    }

    pub async fn seed_user(&self, user: User) {
        self.state.write().await.users.push(user);
    }

    pub async fn seed_category(&self, category: Category, link_count: usize) {
        let mut state = self.state.write().await;
        for _ in 0..link_count {
            let link_id = state.next_id();
            state.category_links.push((link_id, category.id));
        }
        state.categories.push(category);
    }

    /// Create a subscription directly, bypassing the client — models a
    /// concurrent writer racing the client's snapshot.
    pub async fn seed_subscription(&self, event_id: EventId, user_id: UserId) {
        let mut state = self.state.write().await;
        let id = state.next_id();
        state.subscriptions.push(Subscription {
            id: SubscriptionId::new(id),
            event_id,
            user_id,
        });
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        self.state.read().await.transactions.clone()
    }

    pub async fn subscriptions(&self) -> Vec<Subscription> {
        self.state.read().await.subscriptions.clone()
    }

    pub async fn stored_balance(&self, user_id: UserId) -> Option<i64> {
        self.state
            .read()
            .await
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.balance)
    }

    pub async fn set_stored_balance(&self, user_id: UserId, balance: i64) {
        let mut state = self.state.write().await;
        if let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) {
            user.balance = balance;
        }
    }

    fn server_error(message: &str) -> ApiError {
        ApiError::Status {
            status: 500,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl BackendApi for InMemoryBackend {
    async fn login(&self, name: &str, _password: &str) -> ApiResult<AuthResponse> {
        let state = self.state.read().await;
        match state.users.iter().find(|u| u.name == name) {
            Some(user) => Ok(AuthResponse {
                user: user.clone(),
                token: format!("token-{}", user.id),
            }),
            None => Err(ApiError::Status {
                status: 401,
                message: "invalid credentials".into(),
            }),
        }
    }

    async fn register(&self, name: &str, email: &str, _password: &str) -> ApiResult<AuthResponse> {
        let mut state = self.state.write().await;
        let id = state.next_id();
        let user = User {
            id: UserId::new(id),
            name: name.to_string(),
            email: email.to_string(),
            password: None,
            balance: 0,
            role_id: 1,
            role_change_requests: vec![],
            avatar: None,
            speaker_profiles: vec![],
        };
        state.users.push(user.clone());
        Ok(AuthResponse {
            user,
            token: format!("token-{id}"),
        })
    }

    async fn set_bearer_token(&self, _token: Option<String>) {}

    async fn fetch_user(&self, id: UserId) -> ApiResult<User> {
        let state = self.state.read().await;
        state
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                message: "user not found".into(),
            })
    }

    async fn update_user(&self, id: UserId, patch: &UserPatch) -> ApiResult<User> {
        if self.fail_user_updates.load(Ordering::Relaxed) {
            return Err(Self::server_error("user update unavailable"));
        }

        let mut state = self.state.write().await;
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(ApiError::Status {
                status: 404,
                message: "user not found".into(),
            })?;

        if let Some(name) = &patch.name {
            user.name = name.clone();
        }
        if let Some(email) = &patch.email {
            user.email = email.clone();
        }
        if let Some(role_id) = patch.role_id {
            user.role_id = role_id;
        }
        if let Some(avatar) = &patch.avatar {
            user.avatar = Some(avatar.clone());
        }
        if let Some(balance) = patch.balance {
            user.balance = balance;
        }
        Ok(user.clone())
    }

    async fn create_role_change_request(
        &self,
        user_id: UserId,
        requested_role_id: i64,
    ) -> ApiResult<RoleChangeRequest> {
        let mut state = self.state.write().await;
        let id = state.next_id();
        let request = RoleChangeRequest {
            id: RoleChangeRequestId::new(id),
            user_id,
            requested_role_id,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        state.role_requests.push(request.clone());

        if let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) {
            user.role_change_requests.push(request.clone());
        }
        Ok(request)
    }

    async fn fetch_role_change_requests(&self) -> ApiResult<Vec<RoleChangeRequest>> {
        Ok(self.state.read().await.role_requests.clone())
    }

    async fn update_role_change_request(
        &self,
        id: RoleChangeRequestId,
        status: RequestStatus,
    ) -> ApiResult<RoleChangeRequest> {
        let mut state = self.state.write().await;
        let request = state
            .role_requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ApiError::Status {
                status: 404,
                message: "request not found".into(),
            })?;
        request.status = status;
        request.updated_at = Utc::now();
        let updated = request.clone();

        let user_id = updated.user_id;
        if let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) {
            if let Some(owned) = user
                .role_change_requests
                .iter_mut()
                .find(|r| r.id == id)
            {
                *owned = updated.clone();
            }
        }
        Ok(updated)
    }

    async fn fetch_subscriptions(&self) -> ApiResult<Vec<Subscription>> {
        if self.fail_subscription_fetch.load(Ordering::Relaxed) {
            return Err(Self::server_error("subscriptions unavailable"));
        }
        Ok(self.state.read().await.subscriptions.clone())
    }

    async fn create_subscription(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> ApiResult<Subscription> {
        let mut state = self.state.write().await;
        // The unique constraint on (user, event) lives here, not in
        // the client.
        if state
            .subscriptions
            .iter()
            .any(|s| s.event_id == event_id && s.user_id == user_id)
        {
            return Err(ApiError::Status {
                status: 409,
                message: "subscription already exists".into(),
            });
        }
        let id = state.next_id();
        let subscription = Subscription {
            id: SubscriptionId::new(id),
            event_id,
            user_id,
        };
        state.subscriptions.push(subscription.clone());
        Ok(subscription)
    }

    async fn delete_subscription(&self, id: SubscriptionId) -> ApiResult<()> {
        let mut state = self.state.write().await;
        let before = state.subscriptions.len();
        state.subscriptions.retain(|s| s.id != id);
        if state.subscriptions.len() == before {
            return Err(ApiError::Status {
                status: 404,
                message: "subscription not found".into(),
            });
        }
        Ok(())
    }

    async fn fetch_transactions(&self) -> ApiResult<Vec<Transaction>> {
        Ok(self.state.read().await.transactions.clone())
    }

    async fn create_transaction(&self, new: &NewTransaction) -> ApiResult<Transaction> {
        if self.fail_transactions.load(Ordering::Relaxed) {
            return Err(Self::server_error("payment processor unavailable"));
        }

        let mut state = self.state.write().await;
        let id = state.next_id();
        let transaction = Transaction {
            id: TransactionId::new(id),
            amount: new.amount,
            user_id: new.user_id,
            event_id: new.event_id,
            status: "completed".into(),
        };
        state.transactions.push(transaction.clone());

        // A paid subscribe normally materializes the subscription
        // record as part of the payment; the flag opens the
        // asymmetric-failure window.
        if !self.detach_subscription_from_payment.load(Ordering::Relaxed) {
            let exists = state
                .subscriptions
                .iter()
                .any(|s| s.event_id == new.event_id && s.user_id == new.user_id);
            if !exists {
                let sub_id = state.next_id();
                state.subscriptions.push(Subscription {
                    id: SubscriptionId::new(sub_id),
                    event_id: new.event_id,
                    user_id: new.user_id,
                });
            }
        }
        Ok(transaction)
    }

    async fn fetch_events_by_category(&self, _category_id: CategoryId) -> ApiResult<Vec<Event>> {
        Ok(vec![])
    }

    async fn delete_event_categories_for(&self, category_id: CategoryId) -> ApiResult<()> {
        let mut state = self.state.write().await;
        state.category_links.retain(|(_, cat)| *cat != category_id);
        Ok(())
    }

    async fn list_catalog(&self, route: &str) -> ApiResult<Vec<serde_json::Value>> {
        let state = self.state.read().await;
        match route {
            "/categories" => Ok(state
                .categories
                .iter()
                .map(|c| serde_json::to_value(c).unwrap())
                .collect()),
            "/users" => Ok(state
                .users
                .iter()
                .map(|u| serde_json::to_value(u).unwrap())
                .collect()),
            _ => Ok(vec![]),
        }
    }

    async fn create_catalog(
        &self,
        route: &str,
        body: serde_json::Value,
    ) -> ApiResult<serde_json::Value> {
        let mut state = self.state.write().await;
        match route {
            "/categories" => {
                let id = state.next_id();
                let category = Category {
                    id: CategoryId::new(id),
                    name: body["name"].as_str().unwrap_or_default().to_string(),
                };
                state.categories.push(category.clone());
                Ok(serde_json::to_value(category).unwrap())
            }
            _ => Err(ApiError::Status {
                status: 404,
                message: format!("no such route: {route}"),
            }),
        }
    }

    async fn update_catalog(
        &self,
        route: &str,
        id: i64,
        body: serde_json::Value,
    ) -> ApiResult<serde_json::Value> {
        let mut state = self.state.write().await;
        match route {
            "/categories" => {
                let category = state
                    .categories
                    .iter_mut()
                    .find(|c| c.id == CategoryId::new(id))
                    .ok_or(ApiError::Status {
                        status: 404,
                        message: "category not found".into(),
                    })?;
                if let Some(name) = body["name"].as_str() {
                    category.name = name.to_string();
                }
                Ok(serde_json::to_value(category.clone()).unwrap())
            }
            _ => Err(ApiError::Status {
                status: 404,
                message: format!("no such route: {route}"),
            }),
        }
    }

    async fn delete_catalog(&self, route: &str, id: i64) -> ApiResult<()> {
        let mut state = self.state.write().await;
        match route {
            "/categories" => {
                let category_id = CategoryId::new(id);
                if state.category_links.iter().any(|(_, cat)| *cat == category_id) {
                    return Err(ApiError::Status {
                        status: 400,
                        message: "update or delete on table \"Category\" violates foreign key constraint".into(),
                    });
                }
                let before = state.categories.len();
                state.categories.retain(|c| c.id != category_id);
                if state.categories.len() == before {
                    return Err(ApiError::Status {
                        status: 404,
                        message: "category not found".into(),
                    });
                }
                Ok(())
            }
            _ => Err(ApiError::Status {
                status: 404,
                message: format!("no such route: {route}"),
            }),
        }
    }
}

// ============================================================================
// Harness
// ============================================================================

/// Everything a flow test needs, wired together over the fake backend.
pub struct Harness {
    pub backend: Arc<InMemoryBackend>,
    pub session: Arc<SessionStore>,
    pub subscriptions: Arc<SubscriptionStore>,
    pub coordinator: PaymentCoordinator,
    pub metrics: Arc<Metrics>,
}

pub fn harness(backend: Arc<InMemoryBackend>) -> Harness {
    let api: Arc<dyn BackendApi> = backend.clone();
    let metrics = Arc::new(Metrics::new());
    let session = Arc::new(SessionStore::new(
        api.clone(),
        Arc::new(MemoryCredentialCache::default()),
        metrics.clone(),
    ));
    let subscriptions = Arc::new(SubscriptionStore::new(api.clone()));
    let coordinator = PaymentCoordinator::new(
        session.clone(),
        subscriptions.clone(),
        api,
        metrics.clone(),
    );
    Harness {
        backend,
        session,
        subscriptions,
        coordinator,
        metrics,
    }
}
