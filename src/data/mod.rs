//! Data models for the monitor.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing of interval strings (e.g., "2s", "500ms") and age formatting
//! - [`history`]: Recent queue lengths for sparklines and fill/drain rates
//! - [`records`]: Typed records for the two status endpoints
//! - [`state`]: [`DisplayState`] and its per-field bookkeeping
//!
//! ## Data Flow
//!
//! ```text
//! HealthRecord / QueueRecord (from the fetcher)
//!        │
//!        ▼
//! Reconciler::apply_*()
//!        │
//!        ├──▶ DisplayState (published on a watch channel)
//!        │
//!        └──▶ History::record() (for sparklines, on the UI side)
//! ```

pub mod duration;
pub mod history;
pub mod records;
pub mod state;

pub use history::History;
pub use records::{HealthRecord, HealthStatus, QueueActivity, QueueRecord};
pub use state::{CycleId, DisplayState, FieldError, FieldState, Phase};
