//! Subscription and payment orchestration
//!
//! The one place multi-step consistency matters on the client: a paid
//! subscribe touches the transaction ledger, the user's balance, and
//! the subscription listing, in that order. Every precondition is a
//! hard gate checked before any side-effecting call goes out.

use std::sync::Arc;
use tracing::{info, warn};

use crate::api::BackendApi;
use crate::domain::{Event, NewTransaction, Subscription, User};
use crate::error::{ClientError, Result};
use crate::metrics::{inc, Metrics};
use crate::session::SessionStore;
use crate::store::SubscriptionStore;

/// Orchestrates subscribe/unsubscribe across the session, the
/// subscription store, and the transaction ledger.
pub struct PaymentCoordinator {
    session: Arc<SessionStore>,
    subscriptions: Arc<SubscriptionStore>,
    api: Arc<dyn BackendApi>,
    metrics: Arc<Metrics>,
}

impl PaymentCoordinator {
    pub fn new(
        session: Arc<SessionStore>,
        subscriptions: Arc<SubscriptionStore>,
        api: Arc<dyn BackendApi>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            session,
            subscriptions,
            api,
            metrics,
        }
    }

    /// Subscribe the current user to an event.
    ///
    /// Gates, in order, each failing fast with no side effect:
    ///
    /// 1. a user must be authenticated;
    /// 2. no subscription may already exist for (user, event) — the
    ///    snapshot is re-fetched first, but the backend's unique
    ///    constraint remains the system of record and its rejection is
    ///    surfaced the same way;
    /// 3. for paid events the balance must cover the price.
    ///
    /// Free events take the fast path: one create call, no
    /// transaction, no balance mutation. Paid events record the
    /// transaction first, then debit the balance locally (the UI must
    /// never show a balance contradicting a recorded transaction),
    /// then confirm against the backend that the subscription record
    /// materialized. A charge without a subscription is surfaced as
    /// `SubscriptionFailed` carrying the transaction id — money has
    /// moved, and the condition needs an operator, not a silent retry.
    pub async fn subscribe(&self, event: &Event) -> Result<Subscription> {
        let user = self
            .session
            .current_user()
            .await
            .ok_or(ClientError::NotAuthenticated)?;

        // Gate on a fresh snapshot, not whatever the last poll saw.
        self.subscriptions.refresh().await?;
        if self.subscriptions.is_subscribed(event.id, user.id).await {
            inc(&self.metrics.subscribe_rejected);
            return Err(ClientError::AlreadySubscribed {
                event_id: event.id,
                user_id: user.id,
            });
        }

        if !event.is_paid {
            return self.subscribe_free(event, &user).await;
        }

        self.subscribe_paid(event, &user).await
    }

    /// Free-event fast path: a single network call.
    async fn subscribe_free(&self, event: &Event, user: &User) -> Result<Subscription> {
        match self.subscriptions.add(event.id, user.id).await {
            Ok(subscription) => {
                inc(&self.metrics.subscribe_success);
                info!(event = %event.id, user = %user.id, "subscribed (free)");
                Ok(subscription)
            }
            // Lost the race: someone (a double click, another tab)
            // created the record between our snapshot and the create.
            Err(ClientError::Api(err)) if err.is_conflict() => {
                inc(&self.metrics.subscribe_rejected);
                Err(ClientError::AlreadySubscribed {
                    event_id: event.id,
                    user_id: user.id,
                })
            }
            Err(err) => {
                inc(&self.metrics.subscribe_rejected);
                Err(err)
            }
        }
    }

    async fn subscribe_paid(&self, event: &Event, user: &User) -> Result<Subscription> {
        let price = event.charge();

        if user.balance < price {
            inc(&self.metrics.subscribe_rejected);
            return Err(ClientError::InsufficientFunds {
                required: price,
                available: user.balance,
            });
        }

        // Record the charge. A failure here aborts with no balance
        // mutation and no subscription: state is still consistent.
        let transaction = self
            .api
            .create_transaction(&NewTransaction {
                amount: price,
                user_id: user.id,
                event_id: event.id,
            })
            .await
            .map_err(|err| {
                inc(&self.metrics.subscribe_rejected);
                ClientError::TransactionFailed(err)
            })?;
        inc(&self.metrics.transactions_created);

        // The charge is durable; the local balance must reflect it
        // before we return, whatever happens next.
        self.session.update_balance(user.balance - price).await?;

        // The subscription record is a separate durable fact from the
        // payment; confirm it exists rather than assuming.
        if let Err(err) = self.subscriptions.refresh().await {
            warn!(
                transaction = %transaction.id,
                %err,
                "could not confirm subscription after charge"
            );
            return Err(ClientError::SubscriptionFailed {
                transaction_id: transaction.id,
            });
        }

        match self.subscriptions.find(event.id, user.id).await {
            Some(subscription) => {
                inc(&self.metrics.subscribe_success);
                info!(
                    event = %event.id,
                    user = %user.id,
                    amount = price,
                    transaction = %transaction.id,
                    "subscribed (paid)"
                );
                Ok(subscription)
            }
            None => {
                warn!(
                    transaction = %transaction.id,
                    event = %event.id,
                    user = %user.id,
                    "transaction recorded but subscription missing; needs manual reconciliation"
                );
                Err(ClientError::SubscriptionFailed {
                    transaction_id: transaction.id,
                })
            }
        }
    }

    /// Remove the current user's subscription to an event.
    ///
    /// A missing subscription is a no-op, not an error. No refund is
    /// issued for paid events; paid unsubscription semantics are
    /// undefined upstream.
    pub async fn unsubscribe(&self, event: &Event) -> Result<()> {
        let Some(user) = self.session.current_user().await else {
            return Ok(());
        };

        match self.subscriptions.find(event.id, user.id).await {
            Some(subscription) => {
                self.subscriptions.delete(subscription.id).await?;
                info!(event = %event.id, user = %user.id, "unsubscribed");
                Ok(())
            }
            None => Ok(()),
        }
    }
}
