//! Error types for the Eventum client core

use thiserror::Error;

use crate::api::ApiError;
use crate::domain::{CategoryId, EventId, TransactionId, UserId};

/// Errors that can occur in the client core.
///
/// None of these are fatal: every variant is recoverable by user retry
/// or navigation. Variants that gate a human decision (insufficient
/// funds, already subscribed, transaction failure) carry enough context
/// to render a distinguishable message.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Operation requires an authenticated session
    #[error("not authenticated: sign in to continue")]
    NotAuthenticated,

    /// Paid subscribe rejected before any side effect
    #[error("insufficient funds: event costs {required}, balance is {available}")]
    InsufficientFunds { required: i64, available: i64 },

    /// A subscription already exists for this (user, event) pair
    #[error("user {user_id} is already subscribed to event {event_id}")]
    AlreadySubscribed { event_id: EventId, user_id: UserId },

    /// Transaction creation failed; no balance mutation or subscription occurred
    #[error("payment transaction failed: {0}")]
    TransactionFailed(#[source] ApiError),

    /// The subscription record did not materialize after a successful charge.
    ///
    /// The transaction id is carried so an operator flow can reconcile
    /// manually; no automatic refund is attempted.
    #[error("subscription missing after successful transaction {transaction_id}; manual reconciliation required")]
    SubscriptionFailed { transaction_id: TransactionId },

    /// Role id outside the known role table
    #[error("invalid role id: {0}")]
    InvalidRoleId(i64),

    /// Category delete blocked by dependent event-category links even
    /// after removing them and retrying once
    #[error("category {category_id} could not be deleted: {message}")]
    ReferentialConstraint {
        category_id: CategoryId,
        message: String,
    },

    /// Backend/transport failure
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result type for client core operations
pub type Result<T> = std::result::Result<T, ClientError>;
