//! Subscription and transaction records
//!
//! Both are join records referencing user and event by id only; the
//! transaction log additionally carries append-only ledger semantics
//! (never mutated by the client after creation).

use serde::{Deserialize, Serialize};

use super::{EventId, SubscriptionId, TransactionId, UserId};

/// A (user, event) subscription. At most one exists per pair; the
/// client checks before creating and the backend's unique constraint
/// is the system of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub event_id: EventId,
}

/// A recorded payment. The amount equals the event price at creation
/// time for paid subscriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub amount: i64,
    pub user_id: UserId,
    pub event_id: EventId,
    /// Backend-assigned status string; opaque to the client core
    #[serde(default)]
    pub status: String,
}

/// Payload for creating a transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub amount: i64,
    pub user_id: UserId,
    pub event_id: EventId,
}
