//! Eventum Client Library
//!
//! Client-side core for the Eventum event platform: typed stores over
//! the REST backend, session management with durable credentials, and
//! the orchestration that keeps a user's balance, transaction ledger
//! and subscriptions consistent when subscribing to paid events.
//!
//! ## Modules
//!
//! - [`domain`] - Wire-faithful records, newtype ids, role resolution
//! - [`api`] - HTTP gateway trait and the `reqwest` implementation
//! - [`session`] - Session state machine with durable credentials
//! - [`store`] - Per-entity catalog caches and the subscription store
//! - [`payment`] - Subscribe/unsubscribe orchestration
//! - [`worker`] - Background subscription polling and balance
//!   reconciliation
//! - [`metrics`] - In-process counters
//! - [`telemetry`] - Tracing setup for host applications
//! - [`config`] - Environment-driven configuration

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod payment;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod worker;

// Re-export commonly used types
pub use api::{ApiError, BackendApi, RestClient};
pub use config::ClientConfig;
pub use domain::{
    resolve_effective_role, Event, Role, RoleChangeRequest, Subscription, Transaction, User,
};
pub use error::{ClientError, Result};
pub use metrics::Metrics;
pub use payment::PaymentCoordinator;
pub use session::{FsCredentialCache, SessionState, SessionStore};
pub use store::{CategoryStore, EventStore, SubscriptionStore};
