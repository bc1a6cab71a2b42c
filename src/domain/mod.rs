//! Domain model for the Eventum client
//!
//! Wire-faithful records (camelCase JSON as the backend speaks it),
//! newtype ids, and the pure role-resolution logic.

mod event;
mod role;
mod subscription;
mod types;
mod user;

pub use event::{
    Category, CategoryLink, Event, EventCategory, EventSpeaker, OrganizerSummary, RoleRecord,
    Speaker, Venue,
};
pub use role::{resolve_effective_role, Role};
pub use subscription::{NewTransaction, Subscription, Transaction};
pub use types::{
    CategoryId, EventId, RequestStatus, RoleChangeRequestId, SpeakerId, SubscriptionId,
    TransactionId, UserId, VenueId,
};
pub use user::{RoleChangeRequest, User, UserPatch};
