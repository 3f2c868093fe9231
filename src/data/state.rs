//! Display state shared between the poller and the renderer.
//!
//! The poller task is the only writer; everything else works on clones
//! handed out through a watch channel.

use std::fmt;

use tokio::time::Instant;

use super::records::{HealthRecord, QueueRecord};

/// Identifier of one poll cycle. Strictly increasing for the lifetime of a poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleId(pub u64);

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No cycle has completed yet.
    #[default]
    Priming,
    /// At least one cycle has completed. Never left once entered.
    Live,
}

/// The most recent failed read for a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub message: String,
    pub cycle: CycleId,
    pub at: Instant,
}

/// One independently updated slice of the display state.
///
/// `value` is `None` until the first successful read and is never cleared
/// afterwards; failures only touch `last_error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldState<T> {
    value: Option<T>,
    committed_cycle: Option<CycleId>,
    last_updated: Option<Instant>,
    last_error: Option<FieldError>,
}

impl<T> Default for FieldState<T> {
    fn default() -> Self {
        Self {
            value: None,
            committed_cycle: None,
            last_updated: None,
            last_error: None,
        }
    }
}

impl<T> FieldState<T> {
    /// The last committed record, if any read has succeeded yet.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// True until the first successful read.
    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }

    /// Cycle whose result is currently displayed.
    pub fn committed_cycle(&self) -> Option<CycleId> {
        self.committed_cycle
    }

    /// When the current value was committed.
    pub fn last_updated(&self) -> Option<Instant> {
        self.last_updated
    }

    pub fn last_error(&self) -> Option<&FieldError> {
        self.last_error.as_ref()
    }

    /// True when a read newer than the displayed value has failed.
    pub fn is_stale(&self) -> bool {
        match (&self.last_error, self.committed_cycle) {
            (Some(err), Some(committed)) => err.cycle > committed,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// Whether a resolution from `cycle` is newer than the committed value.
    pub(crate) fn accepts(&self, cycle: CycleId) -> bool {
        self.committed_cycle.is_none_or(|c| cycle > c)
    }

    pub(crate) fn commit(&mut self, cycle: CycleId, value: T, at: Instant) {
        self.value = Some(value);
        self.committed_cycle = Some(cycle);
        self.last_updated = Some(at);
    }

    /// Keeps only the newest failure when several overlap.
    pub(crate) fn record_error(&mut self, cycle: CycleId, message: String, at: Instant) {
        if self.last_error.as_ref().is_some_and(|e| e.cycle > cycle) {
            return;
        }
        self.last_error = Some(FieldError { message, cycle, at });
    }
}

/// Everything the renderer needs to draw one frame.
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    pub health: FieldState<HealthRecord>,
    pub queue: FieldState<QueueRecord>,
    pub phase: Phase,
    pub cycles_started: u64,
    pub cycles_completed: u64,
}

impl DisplayState {
    /// True once the first cycle has completed.
    pub fn ready(&self) -> bool {
        self.phase == Phase::Live
    }

    /// Build a JSON view of the state for export.
    ///
    /// Instants are rendered as ages relative to `now`.
    pub fn to_json(&self, now: Instant) -> serde_json::Value {
        serde_json::json!({
            "ready": self.ready(),
            "cycles_started": self.cycles_started,
            "cycles_completed": self.cycles_completed,
            "health": field_json(&self.health, now),
            "queue": field_json(&self.queue, now),
        })
    }
}

fn field_json<T: serde::Serialize>(field: &FieldState<T>, now: Instant) -> serde_json::Value {
    serde_json::json!({
        "value": field.value(),
        "stale": field.is_stale(),
        "updated_secs_ago": field
            .last_updated()
            .map(|t| now.saturating_duration_since(t).as_secs_f64()),
        "last_error": field.last_error().map(|e| {
            serde_json::json!({
                "message": e.message,
                "cycle": e.cycle.0,
                "secs_ago": now.saturating_duration_since(e.at).as_secs_f64(),
            })
        }),
    })
}
