//! Core identifier types for the Eventum client
//!
//! The backend keys every entity by an integer id; these newtypes keep
//! the id spaces from mixing on the client side.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

entity_id!(
    /// User identifier
    UserId
);
entity_id!(
    /// Event identifier
    EventId
);
entity_id!(
    /// Venue identifier
    VenueId
);
entity_id!(
    /// Category identifier
    CategoryId
);
entity_id!(
    /// Speaker identifier
    SpeakerId
);
entity_id!(
    /// Subscription identifier
    SubscriptionId
);
entity_id!(
    /// Transaction identifier
    TransactionId
);
entity_id!(
    /// Role-change-request identifier
    RoleChangeRequestId
);

/// Status of a role-change request.
///
/// Transitions are one-way: `pending` -> `approved` or `pending` ->
/// `rejected`, applied by an administrator on the backend. The client
/// never mutates a request after creating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}
