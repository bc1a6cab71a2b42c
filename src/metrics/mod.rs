//! In-process metrics for the client core
//!
//! Lock-free counters recording the outcomes an operator cares about:
//! subscribe results, the optimistic-balance flush, and reconciliation
//! drift.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Counter registry shared by the session store, the payment
/// coordinator, and the background workers.
pub struct Metrics {
    /// Successful subscribes (free and paid)
    pub subscribe_success: AtomicU64,
    /// Subscribes rejected by a local gate or the backend
    pub subscribe_rejected: AtomicU64,
    /// Transactions recorded
    pub transactions_created: AtomicU64,
    /// Optimistic balance flushes that failed to persist
    pub balance_persist_failures: AtomicU64,
    /// Reconciliation passes that found local and backend balance
    /// disagreeing
    pub balance_drift_detected: AtomicU64,
    /// Background subscription refreshes completed
    pub subscription_refreshes: AtomicU64,
    start: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            subscribe_success: AtomicU64::new(0),
            subscribe_rejected: AtomicU64::new(0),
            transactions_created: AtomicU64::new(0),
            balance_persist_failures: AtomicU64::new(0),
            balance_drift_detected: AtomicU64::new(0),
            subscription_refreshes: AtomicU64::new(0),
            start: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start.elapsed().as_secs()
    }

    /// Snapshot as JSON for logging or a debug endpoint.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "uptime_seconds": self.uptime_seconds(),
            "subscribe_success": self.subscribe_success.load(Ordering::Relaxed),
            "subscribe_rejected": self.subscribe_rejected.load(Ordering::Relaxed),
            "transactions_created": self.transactions_created.load(Ordering::Relaxed),
            "balance_persist_failures": self.balance_persist_failures.load(Ordering::Relaxed),
            "balance_drift_detected": self.balance_drift_detected.load(Ordering::Relaxed),
            "subscription_refreshes": self.subscription_refreshes.load(Ordering::Relaxed),
        })
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Increment a counter field.
pub fn inc(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}
