//! Backend/transport error type with client-vs-server bucketing
//!
//! Failures are bucketed into client-fixable (4xx) and server-transient
//! (5xx/transport) so callers can pick the right user-facing message.

use thiserror::Error;

/// Errors raised by the HTTP gateway.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection, TLS, or timeout failure before an HTTP status was
    /// received
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response; `message` is the backend's error body when it
    /// sent one
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not decode into the expected shape
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ApiError {
    /// HTTP status code, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status().map(|s| s.as_u16()),
            ApiError::Decode(_) => None,
        }
    }

    /// 4xx: the request itself was wrong; retrying unchanged will not
    /// help.
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    /// 5xx or no status at all: the backend or the network is
    /// unhealthy; retrying later may succeed.
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// Duplicate-resource rejection from the backend (e.g. the unique
    /// constraint on (user, event) subscriptions).
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// Delete rejected because dependent rows still reference the
    /// target.
    pub fn is_referential_constraint(&self) -> bool {
        match self {
            ApiError::Status { message, .. } => {
                message.to_ascii_lowercase().contains("foreign key constraint")
            }
            _ => false,
        }
    }

    /// Message suitable for direct display, selected by bucket.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } if self.is_client_error() && !message.is_empty() => {
                message.clone()
            }
            _ if self.is_client_error() => "the request could not be processed".to_string(),
            _ => "the service is temporarily unavailable, try again".to_string(),
        }
    }
}

/// Result type for gateway operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;
