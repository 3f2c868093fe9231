//! Historical queue tracking for sparklines and rate calculations.

use std::collections::VecDeque;

use tokio::time::Instant;

use super::state::{CycleId, DisplayState};

/// Maximum number of historical samples to keep.
const MAX_HISTORY_SIZE: usize = 60;

/// Tracks recent queue lengths for trending and sparklines.
///
/// Only committed queue reads are recorded, one sample per committed cycle,
/// so repeated frames of the same state do not skew the window.
#[derive(Debug, Clone)]
pub struct History {
    /// Queue length readings, oldest first.
    pub queue_lengths: VecDeque<u64>,
    /// Commit time of each reading.
    pub timestamps: VecDeque<Instant>,
    last_cycle: Option<CycleId>,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            queue_lengths: VecDeque::new(),
            timestamps: VecDeque::new(),
            last_cycle: None,
        }
    }

    /// Record the queue field of a state, if it carries a new commit.
    ///
    /// Returns true when a sample was added.
    pub fn record(&mut self, state: &DisplayState) -> bool {
        let (Some(record), Some(cycle), Some(at)) = (
            state.queue.value(),
            state.queue.committed_cycle(),
            state.queue.last_updated(),
        ) else {
            return false;
        };

        if self.last_cycle.is_some_and(|last| cycle <= last) {
            return false;
        }
        self.last_cycle = Some(cycle);

        self.queue_lengths.push_back(record.queue_length);
        if self.queue_lengths.len() > MAX_HISTORY_SIZE {
            self.queue_lengths.pop_front();
        }

        self.timestamps.push_back(at);
        if self.timestamps.len() > MAX_HISTORY_SIZE {
            self.timestamps.pop_front();
        }
        true
    }

    /// Get sparkline data for queue length (normalized to 0-7 for 8 bar levels).
    ///
    /// Returns an empty Vec if there's not enough history.
    pub fn queue_sparkline(&self) -> Vec<u8> {
        if self.queue_lengths.len() < 2 {
            return Vec::new();
        }

        let max = self.queue_lengths.iter().copied().max().unwrap_or(0).max(1);

        self.queue_lengths
            .iter()
            .map(|&v| {
                let normalized = (v as f64 / max as f64 * 7.0) as u8;
                normalized.min(7)
            })
            .collect()
    }

    /// Get the rate of change of the queue (jobs per second).
    ///
    /// Positive means the queue is filling, negative means it is draining.
    /// Returns None if there's not enough history to calculate a rate.
    pub fn queue_rate(&self) -> Option<f64> {
        if self.queue_lengths.len() < 2 || self.timestamps.len() < 2 {
            return None;
        }

        let current = *self.queue_lengths.back()?;
        let previous = *self.queue_lengths.get(self.queue_lengths.len() - 2)?;
        let delta = current as i64 - previous as i64;

        let current_time = self.timestamps.back()?;
        let previous_time = self.timestamps.get(self.timestamps.len() - 2)?;
        let elapsed = current_time.duration_since(*previous_time).as_secs_f64();

        if elapsed > 0.0 {
            Some(delta as f64 / elapsed)
        } else {
            None
        }
    }
}
