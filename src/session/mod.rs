//! Authenticated session state
//!
//! An explicit session context object with an init (restore from
//! durable storage) and teardown (logout) lifecycle. Components that
//! need the session receive a handle; there is no ambient singleton.

mod credentials;

#[cfg(test)]
pub use credentials::MockCredentialCache;
pub use credentials::{CredentialCache, FsCredentialCache, StoredCredentials};

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::api::BackendApi;
use crate::domain::{
    resolve_effective_role, Role, RoleChangeRequest, User, UserId, UserPatch,
};
use crate::error::{ClientError, Result};
use crate::metrics::{inc, Metrics};

/// Session lifecycle states.
///
/// `Error` is recoverable: the store stays usable and the user may
/// retry login or registration.
#[derive(Debug, Clone)]
pub enum SessionState {
    Anonymous,
    Authenticating,
    Authenticated {
        user: User,
        role: Role,
        token: String,
    },
    Error {
        message: String,
    },
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }
}

/// Outcome of a balance reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceReconciliation {
    /// Local and backend balance agree
    InSync,
    /// They disagreed; the backend value was adopted
    Corrected { local: i64, backend: i64 },
}

/// Holds the authenticated user, their effective role, and the bearer
/// token; owns every mutation of the user's balance.
pub struct SessionStore {
    api: Arc<dyn BackendApi>,
    credentials: Arc<dyn CredentialCache>,
    metrics: Arc<Metrics>,
    state: RwLock<SessionState>,
    last_error: RwLock<Option<String>>,
}

impl SessionStore {
    pub fn new(
        api: Arc<dyn BackendApi>,
        credentials: Arc<dyn CredentialCache>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            api,
            credentials,
            metrics,
            state: RwLock::new(SessionState::Anonymous),
            last_error: RwLock::new(None),
        }
    }

    /// Restore a previous session from durable storage, if one exists.
    ///
    /// Returns whether a session was restored. No network call is
    /// made; the persisted user record is trusted until the next
    /// refetch. Unresolvable credentials are discarded.
    pub async fn restore(&self) -> bool {
        let Some(stored) = self.credentials.load() else {
            return false;
        };

        let role = match resolve_effective_role(&stored.user) {
            Ok(role) => role,
            Err(err) => {
                warn!(%err, "discarding persisted session with unresolvable role");
                self.credentials.clear();
                return false;
            }
        };

        self.api.set_bearer_token(Some(stored.token.clone())).await;
        *self.state.write().await = SessionState::Authenticated {
            user: stored.user,
            role,
            token: stored.token,
        };
        info!("session restored from durable storage");
        true
    }

    /// Current state snapshot.
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// The authenticated user, if any.
    pub async fn current_user(&self) -> Option<User> {
        match &*self.state.read().await {
            SessionState::Authenticated { user, .. } => Some(user.clone()),
            _ => None,
        }
    }

    /// The effective role governing the current session, if any.
    pub async fn current_role(&self) -> Option<Role> {
        match &*self.state.read().await {
            SessionState::Authenticated { role, .. } => Some(*role),
            _ => None,
        }
    }

    /// Most recent recoverable error surfaced for display.
    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    /// Authenticate against the backend.
    ///
    /// On success the effective role is resolved, the token attached
    /// to the gateway, and the session persisted durably. On failure
    /// the store transitions to `Error` and remains usable for retry.
    pub async fn login(&self, name: &str, password: &str) -> Result<User> {
        *self.state.write().await = SessionState::Authenticating;
        *self.last_error.write().await = None;

        let auth = match self.api.login(name, password).await {
            Ok(auth) => auth,
            Err(err) => {
                let message = err.user_message();
                *self.state.write().await = SessionState::Error { message };
                return Err(err.into());
            }
        };

        let role = match resolve_effective_role(&auth.user) {
            Ok(role) => role,
            Err(err) => {
                *self.state.write().await = SessionState::Error {
                    message: err.to_string(),
                };
                return Err(err);
            }
        };

        self.establish(auth.user.clone(), role, auth.token).await;
        info!(user = %auth.user.id, role = %role, "login succeeded");
        Ok(auth.user)
    }

    /// Create an account and authenticate.
    ///
    /// A fresh user has no approved role-change requests, so the base
    /// role applies directly.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User> {
        *self.state.write().await = SessionState::Authenticating;
        *self.last_error.write().await = None;

        let auth = match self.api.register(name, email, password).await {
            Ok(auth) => auth,
            Err(err) => {
                let message = err.user_message();
                *self.state.write().await = SessionState::Error { message };
                return Err(err.into());
            }
        };

        let role = match Role::from_id(auth.user.role_id) {
            Ok(role) => role,
            Err(err) => {
                *self.state.write().await = SessionState::Error {
                    message: err.to_string(),
                };
                return Err(err);
            }
        };

        self.establish(auth.user.clone(), role, auth.token).await;
        info!(user = %auth.user.id, "registration succeeded");
        Ok(auth.user)
    }

    /// Tear down the session. Never fails: durable credentials are
    /// cleared best-effort and memory state is reset unconditionally.
    pub async fn logout(&self) {
        self.credentials.clear();
        self.api.set_bearer_token(None).await;
        *self.state.write().await = SessionState::Anonymous;
        *self.last_error.write().await = None;
        info!("logged out");
    }

    /// Update the user's profile.
    ///
    /// On failure the prior user state is left untouched; the update
    /// was never applied, so nothing needs rolling back.
    pub async fn update_user(&self, patch: &UserPatch, id: UserId) -> Result<User> {
        self.require_authenticated().await?;

        let updated = match self.api.update_user(id, patch).await {
            Ok(user) => user,
            Err(err) => {
                *self.last_error.write().await = Some(err.user_message());
                return Err(err.into());
            }
        };

        let role = resolve_effective_role(&updated)?;
        self.replace_user(updated.clone(), role).await;
        Ok(updated)
    }

    /// Optimistic-local-first balance update.
    ///
    /// The in-memory balance changes immediately; persistence to the
    /// backend is best-effort and a flush failure does not roll the
    /// local value back. The payment coordinator is the only caller
    /// and has already validated funds, and the reconciliation pass
    /// bounds any divergence.
    pub async fn update_balance(&self, new_balance: i64) -> Result<()> {
        let user_id = {
            let mut state = self.state.write().await;
            match &mut *state {
                SessionState::Authenticated { user, .. } => {
                    user.balance = new_balance;
                    user.id
                }
                _ => return Err(ClientError::NotAuthenticated),
            }
        };

        if let Err(err) = self
            .api
            .update_user(user_id, &UserPatch::balance(new_balance))
            .await
        {
            inc(&self.metrics.balance_persist_failures);
            warn!(user = %user_id, %err, "balance flush failed; local value kept");
        }

        Ok(())
    }

    /// Post a role-change request. Local role state is not mutated:
    /// the request starts `pending` and the effective role only
    /// changes once an administrator approves it and the user record
    /// is refetched.
    pub async fn request_role_change(
        &self,
        user_id: UserId,
        requested_role_id: i64,
    ) -> Result<RoleChangeRequest> {
        self.require_authenticated().await?;

        match self
            .api
            .create_role_change_request(user_id, requested_role_id)
            .await
        {
            Ok(request) => Ok(request),
            Err(err) => {
                *self.last_error.write().await = Some(err.user_message());
                Err(err.into())
            }
        }
    }

    /// Refetch the user record and re-resolve the effective role.
    /// Also the bound on the optimistic-balance divergence window.
    pub async fn fetch_updated_user(&self) -> Result<User> {
        let current = self.current_user().await.ok_or(ClientError::NotAuthenticated)?;

        let user = self.api.fetch_user(current.id).await?;
        let role = resolve_effective_role(&user)?;
        self.replace_user(user.clone(), role).await;
        Ok(user)
    }

    /// Single reconciliation pass over the balance.
    ///
    /// The backend's durable value is the source of truth; on
    /// disagreement the local value is corrected and the drift
    /// recorded.
    pub async fn reconcile_balance(&self) -> Result<BalanceReconciliation> {
        let current = self.current_user().await.ok_or(ClientError::NotAuthenticated)?;

        let backend_user = self.api.fetch_user(current.id).await?;
        if backend_user.balance == current.balance {
            return Ok(BalanceReconciliation::InSync);
        }

        inc(&self.metrics.balance_drift_detected);
        warn!(
            user = %current.id,
            local = current.balance,
            backend = backend_user.balance,
            "balance drift detected; adopting backend value"
        );

        let mut state = self.state.write().await;
        if let SessionState::Authenticated { user, .. } = &mut *state {
            user.balance = backend_user.balance;
        }

        Ok(BalanceReconciliation::Corrected {
            local: current.balance,
            backend: backend_user.balance,
        })
    }

    async fn establish(&self, user: User, role: Role, token: String) {
        self.api.set_bearer_token(Some(token.clone())).await;
        self.credentials.store(&StoredCredentials {
            user: user.clone(),
            token: token.clone(),
        });
        *self.state.write().await = SessionState::Authenticated { user, role, token };
    }

    async fn replace_user(&self, user: User, role: Role) {
        let token = {
            let mut state = self.state.write().await;
            match &mut *state {
                SessionState::Authenticated {
                    user: current,
                    role: current_role,
                    token,
                } => {
                    *current = user.clone();
                    *current_role = role;
                    token.clone()
                }
                _ => return,
            }
        };
        self.credentials.store(&StoredCredentials { user, token });
    }

    async fn require_authenticated(&self) -> Result<()> {
        if self.state.read().await.is_authenticated() {
            Ok(())
        } else {
            Err(ClientError::NotAuthenticated)
        }
    }
}
