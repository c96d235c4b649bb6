//! Periodic refresh of the payment history.
//!
//! [`RefreshScheduler`] runs the [`Reconciler`] once on start, then on
//! every interval tick and on demand through [`RefreshHandle::refresh`].
//! At most one run is in flight; triggers arriving while a run is loading
//! are dropped, not queued. The latest [`RefreshSnapshot`] is published on a
//! `watch` channel. A failed run keeps the previous payments visible next
//! to the error.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::Result;
use crate::api::StoreApi;
use crate::models::PaymentRecord;
use crate::reconcile::{PaymentProvenance, Reconciler, Reconciliation};

/// Lifecycle phase of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    /// Nothing has been requested yet.
    Idle,
    /// A reconciliation run is in flight.
    Loading,
    /// The last run succeeded.
    Ready,
    /// The last run failed.
    Failed,
}

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshSnapshot {
    pub phase: RefreshPhase,
    /// Payments of the last successful run, possibly stale.
    pub payments: Vec<PaymentRecord>,
    /// Provenance of `payments`; `None` until a run has succeeded.
    pub provenance: Option<PaymentProvenance>,
    pub loading: bool,
    /// User-facing message of the last run, cleared by the next success.
    pub error: Option<String>,
    /// Number of runs that have finished, successfully or not.
    pub completed_runs: u64,
}

impl Default for RefreshSnapshot {
    fn default() -> Self {
        Self {
            phase: RefreshPhase::Idle,
            payments: Vec::new(),
            provenance: None,
            loading: false,
            error: None,
            completed_runs: 0,
        }
    }
}

/// Commands sent from a [`RefreshHandle`] to the scheduler task.
#[derive(Debug)]
enum RefreshCommand {
    Refresh,
}

/// What started a run; only used for logging.
#[derive(Debug, Clone, Copy)]
enum Trigger {
    Interval,
    Manual,
}

/// Shortest accepted refresh interval.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Drives periodic reconciliation for one user.
pub struct RefreshScheduler<A> {
    reconciler: Arc<Reconciler<A>>,
    user_id: i64,
    interval: Duration,
}

impl<A: StoreApi> RefreshScheduler<A> {
    /// Creates a scheduler; nothing runs until [`start`](Self::start).
    ///
    /// Intervals shorter than [`MIN_REFRESH_INTERVAL`] are raised to it.
    #[must_use]
    pub fn new(reconciler: Reconciler<A>, user_id: i64, interval: Duration) -> Self {
        let interval = if interval < MIN_REFRESH_INTERVAL {
            warn!(?interval, min = ?MIN_REFRESH_INTERVAL, "Refresh interval too short, clamped");
            MIN_REFRESH_INTERVAL
        } else {
            interval
        };
        Self {
            reconciler: Arc::new(reconciler),
            user_id,
            interval,
        }
    }

    /// Spawns the scheduler task and starts the first run immediately.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> RefreshHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(RefreshSnapshot::default());
        let task = tokio::spawn(self.run(cmd_rx, state_tx));

        RefreshHandle {
            commands: cmd_tx,
            snapshots: state_rx,
            task,
        }
    }

    /// Runs until the command channel closes.
    async fn run(
        self,
        mut commands: mpsc::UnboundedReceiver<RefreshCommand>,
        state: watch::Sender<RefreshSnapshot>,
    ) {
        info!(
            user_id = self.user_id,
            interval_secs = self.interval.as_secs(),
            "Payment history refresh started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_flight: Option<JoinHandle<Result<Reconciliation>>> = None;

        loop {
            tokio::select! {
                biased;

                cmd = commands.recv() => match cmd {
                    Some(RefreshCommand::Refresh) => {
                        self.trigger(&mut in_flight, &state, Trigger::Manual);
                    }
                    None => {
                        // The in-flight run, if any, is detached and its result dropped.
                        info!(
                            user_id = self.user_id,
                            detached_run = in_flight.is_some(),
                            "Payment history refresh stopped"
                        );
                        return;
                    }
                },

                outcome = wait_for(&mut in_flight) => {
                    in_flight = None;
                    self.apply(&state, outcome);
                }

                _ = ticker.tick() => {
                    self.trigger(&mut in_flight, &state, Trigger::Interval);
                }
            }
        }
    }

    /// Starts a run unless one is already in flight.
    fn trigger(
        &self,
        in_flight: &mut Option<JoinHandle<Result<Reconciliation>>>,
        state: &watch::Sender<RefreshSnapshot>,
        trigger: Trigger,
    ) {
        if in_flight.is_some() {
            debug!(?trigger, "Refresh already in flight, trigger coalesced");
            return;
        }

        debug!(?trigger, user_id = self.user_id, "Starting payment history refresh");
        let reconciler = Arc::clone(&self.reconciler);
        let user_id = self.user_id;
        *in_flight = Some(tokio::spawn(async move {
            reconciler.reconcile(user_id).await
        }));

        state.send_modify(|s| {
            s.phase = RefreshPhase::Loading;
            s.loading = true;
        });
    }

    /// Publishes the outcome of the finished run.
    fn apply(
        &self,
        state: &watch::Sender<RefreshSnapshot>,
        outcome: std::result::Result<Result<Reconciliation>, JoinError>,
    ) {
        let error = match outcome {
            Ok(Ok(reconciliation)) => {
                info!(
                    user_id = self.user_id,
                    count = reconciliation.payments.len(),
                    source = %reconciliation.provenance,
                    "Payment history refreshed"
                );
                state.send_modify(|s| {
                    s.phase = RefreshPhase::Ready;
                    s.loading = false;
                    s.error = None;
                    s.payments = reconciliation.payments;
                    s.provenance = Some(reconciliation.provenance);
                    s.completed_runs += 1;
                });
                return;
            }
            Ok(Err(e)) => e.to_string(),
            Err(e) => format!("refresh task failed: {e}"),
        };

        warn!(user_id = self.user_id, %error, "Payment history refresh failed");
        state.send_modify(|s| {
            s.phase = RefreshPhase::Failed;
            s.loading = false;
            s.error = Some(error);
            s.completed_runs += 1;
        });
    }
}

/// Resolves with the in-flight run's outcome, or never when idle.
async fn wait_for<T>(run: &mut Option<JoinHandle<T>>) -> std::result::Result<T, JoinError> {
    match run {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

/// Control and observation handle for a started [`RefreshScheduler`].
///
/// Dropping the handle tears the scheduler down, same as [`shutdown`](Self::shutdown)
/// without waiting.
#[derive(Debug)]
pub struct RefreshHandle {
    commands: mpsc::UnboundedSender<RefreshCommand>,
    snapshots: watch::Receiver<RefreshSnapshot>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Requests an immediate refresh. Ignored while a run is loading.
    pub fn refresh(&self) {
        if self.commands.send(RefreshCommand::Refresh).is_err() {
            debug!("Refresh requested after scheduler stopped");
        }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> RefreshSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Waits for the next published snapshot.
    ///
    /// Returns `None` once the scheduler has stopped and every snapshot has
    /// been seen.
    pub async fn changed(&mut self) -> Option<RefreshSnapshot> {
        self.snapshots.changed().await.ok()?;
        let snapshot = self.snapshots.borrow_and_update().clone();
        Some(snapshot)
    }

    /// Returns a receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<RefreshSnapshot> {
        self.snapshots.clone()
    }

    /// Stops the interval and waits for the scheduler task to exit.
    ///
    /// A run still in flight is allowed to finish in the background, but
    /// its result is never published.
    pub async fn shutdown(self) {
        let Self { commands, task, .. } = self;
        drop(commands);
        if let Err(e) = task.await {
            warn!(error = %e, "Refresh task ended abnormally");
        }
    }
}
