//! Merges read outcomes into the display state.
//!
//! The reconciler is synchronous and owns no I/O: the poller task feeds it
//! outcomes in whatever order they complete, and it decides what to keep.

use std::collections::BTreeMap;
use std::fmt;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::data::{CycleId, DisplayState, FieldState, HealthRecord, Phase, QueueRecord};
use crate::source::FetchError;

/// One of the two independently updated slices of the display state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Health,
    Queue,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Health => write!(f, "health"),
            Field::Queue => write!(f, "queue"),
        }
    }
}

/// What happened to a single read outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The record replaced the field's value.
    Committed,
    /// The read failed; the previous value was kept and the error recorded.
    Retained,
    /// A newer cycle is already committed for this field; the outcome was dropped.
    Stale,
}

/// Owns the [`DisplayState`] and the per-cycle bookkeeping.
#[derive(Debug, Default)]
pub struct Reconciler {
    state: DisplayState,
    last_cycle: u64,
    /// Reads still outstanding, per cycle.
    pending: BTreeMap<CycleId, u8>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current display state.
    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    /// Number of cycles with at least one read still in flight.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Start a new cycle expecting one health and one queue read.
    pub fn begin_cycle(&mut self) -> CycleId {
        self.last_cycle += 1;
        let cycle = CycleId(self.last_cycle);
        self.pending.insert(cycle, 2);
        self.state.cycles_started += 1;
        debug!(%cycle, in_flight = self.pending.len(), "poll cycle started");
        cycle
    }

    /// Apply the outcome of a health read issued in `cycle`.
    pub fn apply_health(
        &mut self,
        cycle: CycleId,
        result: Result<HealthRecord, FetchError>,
        now: Instant,
    ) -> Applied {
        let applied = apply_field(
            &mut self.state.health,
            Field::Health,
            cycle,
            result.map_err(ReadFailure::from),
            now,
        );
        self.settle(cycle);
        applied
    }

    /// Apply the outcome of a queue read issued in `cycle`.
    pub fn apply_queue(
        &mut self,
        cycle: CycleId,
        result: Result<QueueRecord, FetchError>,
        now: Instant,
    ) -> Applied {
        let applied = apply_field(
            &mut self.state.queue,
            Field::Queue,
            cycle,
            result.map_err(ReadFailure::from),
            now,
        );
        self.settle(cycle);
        applied
    }

    /// Record a read that ended without producing an outcome (the read task
    /// panicked or was cancelled). Treated like a failed read.
    pub fn abandon(&mut self, cycle: CycleId, field: Field, reason: String, now: Instant) -> Applied {
        let failure = ReadFailure {
            message: reason,
            transient: false,
        };
        let applied = match field {
            Field::Health => {
                apply_field::<HealthRecord>(&mut self.state.health, field, cycle, Err(failure), now)
            }
            Field::Queue => {
                apply_field::<QueueRecord>(&mut self.state.queue, field, cycle, Err(failure), now)
            }
        };
        self.settle(cycle);
        applied
    }

    /// Count one read of `cycle` as resolved; completes the cycle when it
    /// was the last one.
    fn settle(&mut self, cycle: CycleId) {
        let Some(remaining) = self.pending.get_mut(&cycle) else {
            return;
        };
        *remaining = remaining.saturating_sub(1);
        if *remaining > 0 {
            return;
        }
        self.pending.remove(&cycle);
        self.state.cycles_completed += 1;
        debug!(%cycle, "poll cycle completed");

        if self.state.phase == Phase::Priming {
            self.state.phase = Phase::Live;
            info!(
                %cycle,
                health = !self.state.health.is_absent(),
                queue = !self.state.queue.is_absent(),
                "first poll cycle completed, display is live"
            );
        }
    }
}

/// A failed read, reduced to what the display keeps.
struct ReadFailure {
    message: String,
    /// The service could not be reached at all.
    transient: bool,
}

impl From<FetchError> for ReadFailure {
    fn from(err: FetchError) -> Self {
        Self {
            transient: err.is_transient(),
            message: err.to_string(),
        }
    }
}

fn apply_field<T>(
    field: &mut FieldState<T>,
    name: Field,
    cycle: CycleId,
    result: Result<T, ReadFailure>,
    now: Instant,
) -> Applied {
    if !field.accepts(cycle) {
        debug!(%cycle, field = %name, committed = ?field.committed_cycle(), "discarding stale read");
        return Applied::Stale;
    }

    match result {
        Ok(value) => {
            field.commit(cycle, value, now);
            Applied::Committed
        }
        Err(failure) => {
            warn!(
                %cycle,
                field = %name,
                transient = failure.transient,
                error = %failure.message,
                "status read failed, keeping previous value"
            );
            field.record_error(cycle, failure.message, now);
            Applied::Retained
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{HealthStatus, QueueActivity};

    fn healthy() -> HealthRecord {
        HealthRecord {
            status: HealthStatus::Healthy,
            redis_connected: true,
            database_connected: true,
        }
    }

    fn queue(len: u64) -> QueueRecord {
        QueueRecord {
            queue_length: len,
            activity: if len > 0 {
                QueueActivity::Processing
            } else {
                QueueActivity::Idle
            },
        }
    }

    fn down() -> FetchError {
        FetchError::Connection("connection refused".to_string())
    }

    #[test]
    fn test_cycle_ids_increase() {
        let mut r = Reconciler::new();
        let a = r.begin_cycle();
        let b = r.begin_cycle();
        assert!(b > a);
        assert_eq!(r.in_flight(), 2);
        assert_eq!(r.state().cycles_started, 2);
    }

    #[test]
    fn test_healthy_cycle_goes_live() {
        let mut r = Reconciler::new();
        let now = Instant::now();
        let c = r.begin_cycle();

        assert_eq!(r.apply_health(c, Ok(healthy()), now), Applied::Committed);
        assert!(!r.state().ready(), "cycle is not complete after one read");
        assert_eq!(r.apply_queue(c, Ok(queue(0)), now), Applied::Committed);

        let state = r.state();
        assert!(state.ready());
        assert_eq!(state.cycles_completed, 1);
        assert_eq!(state.health.value(), Some(&healthy()));
        assert_eq!(state.queue.value(), Some(&queue(0)));
        assert_eq!(r.in_flight(), 0);
    }

    #[test]
    fn test_failed_read_does_not_block_other_field() {
        let mut r = Reconciler::new();
        let now = Instant::now();
        let c = r.begin_cycle();

        assert_eq!(r.apply_health(c, Err(down()), now), Applied::Retained);
        assert_eq!(r.apply_queue(c, Ok(queue(5)), now), Applied::Committed);

        let state = r.state();
        assert!(state.ready());
        assert!(state.health.is_absent());
        assert!(state.health.last_error().is_some());
        assert_eq!(state.queue.value().map(|q| q.queue_length), Some(5));
    }

    #[test]
    fn test_first_cycle_double_failure_still_goes_live() {
        let mut r = Reconciler::new();
        let now = Instant::now();
        let c = r.begin_cycle();
        r.apply_health(c, Err(down()), now);
        r.apply_queue(c, Err(FetchError::Status(500)), now);

        let state = r.state();
        assert!(state.ready());
        assert!(state.health.is_absent());
        assert!(state.queue.is_absent());
    }

    #[test]
    fn test_value_survives_later_failures() {
        let mut r = Reconciler::new();
        let now = Instant::now();
        let c1 = r.begin_cycle();
        r.apply_health(c1, Ok(healthy()), now);
        r.apply_queue(c1, Ok(queue(2)), now);

        for _ in 0..3 {
            let c = r.begin_cycle();
            r.apply_health(c, Err(FetchError::Timeout), now);
            r.apply_queue(c, Err(FetchError::Decode("bad".into())), now);
        }

        let state = r.state();
        assert_eq!(state.health.value(), Some(&healthy()));
        assert_eq!(state.queue.value(), Some(&queue(2)));
        assert!(state.health.is_stale());
        assert!(state.ready());
    }

    #[test]
    fn test_older_cycle_cannot_overwrite_newer_commit() {
        let mut r = Reconciler::new();
        let now = Instant::now();
        let c1 = r.begin_cycle();
        let c2 = r.begin_cycle();

        assert_eq!(r.apply_queue(c2, Ok(queue(5)), now), Applied::Committed);
        assert_eq!(r.apply_queue(c1, Ok(queue(0)), now), Applied::Stale);
        assert_eq!(r.state().queue.value().map(|q| q.queue_length), Some(5));
        assert_eq!(r.state().queue.committed_cycle(), Some(c2));
    }

    #[test]
    fn test_older_error_does_not_mark_newer_value_stale() {
        let mut r = Reconciler::new();
        let now = Instant::now();
        let c1 = r.begin_cycle();
        let c2 = r.begin_cycle();

        r.apply_queue(c2, Ok(queue(1)), now);
        assert_eq!(r.apply_queue(c1, Err(FetchError::Timeout), now), Applied::Stale);
        assert!(!r.state().queue.is_stale());
        assert!(r.state().queue.last_error().is_none());
    }

    #[test]
    fn test_older_success_applies_after_newer_failure() {
        let mut r = Reconciler::new();
        let now = Instant::now();
        let c1 = r.begin_cycle();
        let c2 = r.begin_cycle();

        r.apply_queue(c2, Err(FetchError::Timeout), now);
        assert_eq!(r.apply_queue(c1, Ok(queue(3)), now), Applied::Committed);
        assert_eq!(r.state().queue.value().map(|q| q.queue_length), Some(3));
        // The newer failure is still reported against the older value.
        assert!(r.state().queue.is_stale());
    }

    #[test]
    fn test_stale_outcome_still_completes_its_cycle() {
        let mut r = Reconciler::new();
        let now = Instant::now();
        let c1 = r.begin_cycle();
        let c2 = r.begin_cycle();

        r.apply_health(c2, Ok(healthy()), now);
        r.apply_queue(c2, Ok(queue(1)), now);
        r.apply_health(c1, Ok(healthy()), now);
        r.apply_queue(c1, Ok(queue(0)), now);

        assert_eq!(r.state().cycles_completed, 2);
        assert_eq!(r.in_flight(), 0);
    }

    #[test]
    fn test_ready_never_reverts() {
        let mut r = Reconciler::new();
        let now = Instant::now();
        let c = r.begin_cycle();
        r.apply_health(c, Ok(healthy()), now);
        r.apply_queue(c, Ok(queue(0)), now);
        assert!(r.state().ready());

        let c = r.begin_cycle();
        r.apply_health(c, Err(down()), now);
        assert!(r.state().ready());
        r.apply_queue(c, Err(down()), now);
        assert!(r.state().ready());
    }

    #[test]
    fn test_abandoned_read_counts_as_failure() {
        let mut r = Reconciler::new();
        let now = Instant::now();
        let c = r.begin_cycle();
        r.apply_health(c, Ok(healthy()), now);
        let applied = r.abandon(c, Field::Queue, "read task panicked".to_string(), now);

        assert_eq!(applied, Applied::Retained);
        assert!(r.state().ready());
        assert_eq!(
            r.state().queue.last_error().map(|e| e.message.as_str()),
            Some("read task panicked")
        );
    }

    #[test]
    fn test_read_failure_keeps_transient_flag() {
        let failure = ReadFailure::from(FetchError::Timeout);
        assert!(failure.transient);
        assert_eq!(failure.message, "Request timed out");

        let failure = ReadFailure::from(FetchError::Status(503));
        assert!(!failure.transient);
        assert_eq!(failure.message, "Endpoint returned status 503");
    }
}
