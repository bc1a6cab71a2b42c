//! HTTP gateway to the Eventum backend
//!
//! The `BackendApi` trait is the seam everything else depends on;
//! `RestClient` is the production implementation.

mod error;
mod rest;
pub mod routes;
mod traits;

pub use error::{ApiError, ApiResult};
pub use rest::RestClient;
#[cfg(test)]
pub use traits::MockBackendApi;
pub use traits::{AuthResponse, BackendApi};
