//! Background maintenance workers
//!
//! Two periodic tasks keep the client's view from drifting:
//!
//! - `SubscriptionPoller` re-fetches the subscription listing on a
//!   fixed timer (there is no push channel from the backend).
//! - `BalanceReconciler` periodically compares the optimistic local
//!   balance against the backend's durable value and corrects drift.
//!
//! Construction hands back a control handle next to the worker.
//! Sending `Shutdown` — or dropping every handle — stops the loop,
//! which is all the teardown a view needs.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::metrics::{inc, Metrics};
use crate::session::SessionStore;
use crate::store::SubscriptionStore;

/// Control messages for the background workers.
#[derive(Debug)]
pub enum WorkerMessage {
    /// Run the periodic task now, off-schedule
    RunNow,
    /// Stop the worker loop
    Shutdown,
}

/// Handle for stopping or nudging a worker.
pub type WorkerHandle = mpsc::Sender<WorkerMessage>;

/// Periodic subscription refresh.
pub struct SubscriptionPoller {
    poll_interval: Duration,
    subscriptions: Arc<SubscriptionStore>,
    metrics: Arc<Metrics>,
    control_rx: mpsc::Receiver<WorkerMessage>,
}

impl SubscriptionPoller {
    pub fn new(
        poll_interval: Duration,
        subscriptions: Arc<SubscriptionStore>,
        metrics: Arc<Metrics>,
    ) -> (Self, WorkerHandle) {
        let (control_tx, control_rx) = mpsc::channel(8);
        (
            Self {
                poll_interval,
                subscriptions,
                metrics,
                control_rx,
            },
            control_tx,
        )
    }

    /// Run until shut down. A failed refresh degrades to a warning;
    /// the next tick tries again.
    pub async fn run(mut self) {
        info!(interval = ?self.poll_interval, "subscription poller started");
        let mut ticker = interval(self.poll_interval);
        // The first tick fires immediately; skip it so startup isn't a
        // surprise refresh.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => self.refresh_once().await,
                msg = self.control_rx.recv() => match msg {
                    Some(WorkerMessage::RunNow) => self.refresh_once().await,
                    Some(WorkerMessage::Shutdown) | None => {
                        info!("subscription poller stopped");
                        return;
                    }
                },
            }
        }
    }

    async fn refresh_once(&self) {
        match self.subscriptions.refresh().await {
            Ok(()) => {
                inc(&self.metrics.subscription_refreshes);
                debug!("background subscription refresh completed");
            }
            Err(err) => warn!(%err, "background subscription refresh failed"),
        }
    }
}

/// Periodic balance reconciliation.
pub struct BalanceReconciler {
    reconcile_interval: Duration,
    session: Arc<SessionStore>,
    control_rx: mpsc::Receiver<WorkerMessage>,
}

impl BalanceReconciler {
    pub fn new(reconcile_interval: Duration, session: Arc<SessionStore>) -> (Self, WorkerHandle) {
        let (control_tx, control_rx) = mpsc::channel(8);
        (
            Self {
                reconcile_interval,
                session,
                control_rx,
            },
            control_tx,
        )
    }

    /// Run until shut down. An anonymous session is simply skipped;
    /// reconciliation only means something while authenticated.
    pub async fn run(mut self) {
        info!(interval = ?self.reconcile_interval, "balance reconciler started");
        let mut ticker = interval(self.reconcile_interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => self.reconcile_once().await,
                msg = self.control_rx.recv() => match msg {
                    Some(WorkerMessage::RunNow) => self.reconcile_once().await,
                    Some(WorkerMessage::Shutdown) | None => {
                        info!("balance reconciler stopped");
                        return;
                    }
                },
            }
        }
    }

    async fn reconcile_once(&self) {
        use crate::error::ClientError;

        match self.session.reconcile_balance().await {
            Ok(outcome) => debug!(?outcome, "balance reconciliation pass completed"),
            Err(ClientError::NotAuthenticated) => {}
            Err(err) => warn!(%err, "balance reconciliation pass failed"),
        }
    }
}
