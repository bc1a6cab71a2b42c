//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the client core.
///
/// Every network call carries `request_timeout`; the source behavior
/// had no bound on a hung request, which left stores loading forever.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Eventum REST backend.
    pub base_url: String,
    /// Timeout applied to every HTTP request.
    pub request_timeout: Duration,
    /// Where the durable session credentials live.
    pub credentials_path: PathBuf,
    /// Fixed interval for the background subscription refresh.
    pub poll_interval: Duration,
    /// Interval for the balance reconciliation pass.
    pub reconcile_interval: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url =
            std::env::var("EVENTUM_API_URL").unwrap_or(defaults.base_url);

        let request_timeout = env_secs("EVENTUM_REQUEST_TIMEOUT_SECS")
            .unwrap_or(defaults.request_timeout);

        let credentials_path = std::env::var("EVENTUM_CREDENTIALS_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.credentials_path);

        let poll_interval =
            env_secs("EVENTUM_POLL_INTERVAL_SECS").unwrap_or(defaults.poll_interval);

        let reconcile_interval =
            env_secs("EVENTUM_RECONCILE_INTERVAL_SECS").unwrap_or(defaults.reconcile_interval);

        Self {
            base_url,
            request_timeout,
            credentials_path,
            poll_interval,
            reconcile_interval,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            request_timeout: Duration::from_secs(30),
            credentials_path: PathBuf::from(".eventum/session.json"),
            // The profile view refreshed subscriptions every 100s in
            // the source; kept as the default cadence.
            poll_interval: Duration::from_secs(100),
            reconcile_interval: Duration::from_secs(300),
        }
    }
}

fn env_secs(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
}
