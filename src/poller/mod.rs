//! Poll scheduler.
//!
//! A [`Poller`] is a tokio task that ticks on a fixed period, starts one
//! cycle (a health read plus a queue read) per tick, and feeds the outcomes
//! to a [`Reconciler`]. Each resolved outcome publishes a fresh
//! [`DisplayState`] on a watch channel.
//!
//! ```text
//!            tick ──▶ begin_cycle ──┬──▶ read_health ──┐
//!                                   └──▶ read_queue  ──┤ (JoinSet, any order)
//!                                                      ▼
//!   watch::Receiver ◀── publish ◀── Reconciler::apply_* (stale check per field)
//! ```
//!
//! Cycles are not serialized: a slow read keeps running while the next tick
//! starts another cycle. Stop has priority over completions, and in-flight
//! reads are owned by the task, so nothing is published once the poller
//! has been shut down.

mod reconciler;

pub use reconciler::{Applied, Field, Reconciler};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{Id, JoinError, JoinHandle, JoinSet};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::data::{CycleId, DisplayState, HealthRecord, QueueRecord};
use crate::source::{FetchError, StatusFetcher};

/// Default time between cycles.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(2);

/// Scheduler settings.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Time between cycle starts, measured from spawn.
    pub period: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
        }
    }
}

/// Outcome of one read task.
enum ReadOutcome {
    Health(Result<HealthRecord, FetchError>),
    Queue(Result<QueueRecord, FetchError>),
}

/// The polling task. Created and driven through [`Poller::spawn`].
pub struct Poller {
    fetcher: Arc<dyn StatusFetcher>,
    config: PollerConfig,
    reconciler: Reconciler,
    state_tx: watch::Sender<DisplayState>,
    in_flight: JoinSet<ReadOutcome>,
    /// Which cycle and field each running read belongs to.
    reads: HashMap<Id, (CycleId, Field)>,
}

impl Poller {
    /// Start polling `fetcher`. The first cycle starts immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(fetcher: Arc<dyn StatusFetcher>, config: PollerConfig) -> PollerHandle {
        let (state_tx, state_rx) = watch::channel(DisplayState::default());
        let (stop_tx, stop_rx) = watch::channel(false);
        let (refresh_tx, refresh_rx) = mpsc::channel(1);
        let description = fetcher.description().to_string();

        let poller = Poller {
            fetcher,
            config,
            reconciler: Reconciler::new(),
            state_tx,
            in_flight: JoinSet::new(),
            reads: HashMap::new(),
        };

        let task = tokio::spawn(poller.run(stop_rx, refresh_rx));

        PollerHandle {
            state_rx,
            stop_tx,
            refresh_tx,
            task: Some(task),
            description,
        }
    }

    async fn run(mut self, mut stop_rx: watch::Receiver<bool>, mut refresh_rx: mpsc::Receiver<()>) {
        info!(
            source = %self.fetcher.description(),
            period_ms = self.config.period.as_millis() as u64,
            "poller starting"
        );

        let mut ticker = time::interval(self.config.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = stop_rx.changed() => break,
                _ = ticker.tick() => self.start_cycle(),
                Some(()) = refresh_rx.recv() => {
                    debug!("manual refresh requested");
                    self.start_cycle();
                }
                Some(joined) = self.in_flight.join_next_with_id(), if !self.in_flight.is_empty() => {
                    self.finish_read(joined);
                }
            }
        }

        let abandoned = self.in_flight.len();
        let open_cycles = self.reconciler.in_flight();
        self.in_flight.abort_all();
        info!(abandoned, open_cycles, "poller stopped");
    }

    fn start_cycle(&mut self) {
        let cycle = self.reconciler.begin_cycle();

        let fetcher = self.fetcher.clone();
        let handle = self
            .in_flight
            .spawn(async move { ReadOutcome::Health(fetcher.read_health().await) });
        self.reads.insert(handle.id(), (cycle, Field::Health));

        let fetcher = self.fetcher.clone();
        let handle = self
            .in_flight
            .spawn(async move { ReadOutcome::Queue(fetcher.read_queue().await) });
        self.reads.insert(handle.id(), (cycle, Field::Queue));
    }

    fn finish_read(&mut self, joined: Result<(Id, ReadOutcome), JoinError>) {
        let now = Instant::now();

        let applied = match joined {
            Ok((id, outcome)) => {
                let Some((cycle, _)) = self.reads.remove(&id) else {
                    return;
                };
                match outcome {
                    ReadOutcome::Health(result) => self.reconciler.apply_health(cycle, result, now),
                    ReadOutcome::Queue(result) => self.reconciler.apply_queue(cycle, result, now),
                }
            }
            Err(err) => {
                let Some((cycle, field)) = self.reads.remove(&err.id()) else {
                    return;
                };
                warn!(%cycle, %field, error = %err, "read task ended without a result");
                self.reconciler.abandon(cycle, field, format!("read task failed: {}", err), now)
            }
        };

        // Stale outcomes can still complete a cycle, so publish regardless.
        debug!(?applied, "read resolved");
        self.state_tx.send_replace(self.reconciler.state().clone());
    }
}

/// Handle to a running [`Poller`].
///
/// Dropping the handle stops the poller; use [`PollerHandle::shutdown`] to
/// also wait until the task has fully exited.
#[derive(Debug)]
pub struct PollerHandle {
    state_rx: watch::Receiver<DisplayState>,
    stop_tx: watch::Sender<bool>,
    refresh_tx: mpsc::Sender<()>,
    task: Option<JoinHandle<()>>,
    description: String,
}

impl PollerHandle {
    /// A receiver that is notified every time the display state changes.
    ///
    /// The channel closes once the poller has stopped.
    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.state_rx.clone()
    }

    /// A copy of the latest published state.
    pub fn state(&self) -> DisplayState {
        self.state_rx.borrow().clone()
    }

    /// Description of the polled target.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Ask for an extra cycle right away, outside the regular schedule.
    ///
    /// Returns false if a refresh is already pending or the poller stopped.
    pub fn refresh(&self) -> bool {
        self.refresh_tx.try_send(()).is_ok()
    }

    /// Wait until the first cycle has completed, for at most `limit`.
    pub async fn wait_ready(&self, limit: Duration) -> Option<DisplayState> {
        let mut rx = self.state_rx.clone();
        let state = match time::timeout(limit, rx.wait_for(|state| state.ready())).await {
            Ok(Ok(state)) => Some(state.clone()),
            _ => None,
        };
        state
    }

    /// Stop the timer, cancel in-flight reads, and wait for the task to exit.
    ///
    /// After this returns no further state is published.
    pub async fn shutdown(mut self) {
        let _ = self.stop_tx.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "poller task failed");
                }
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = self.stop_tx.send(true);
            task.abort();
        }
    }
}
