//! # review-monitor
//!
//! A terminal dashboard and library for watching a code review service.
//!
//! The monitor polls two read-only status endpoints of the API gateway on a
//! fixed period and reconciles the answers into a single [`DisplayState`].
//! Each field (health, queue) is updated independently: a failed read keeps
//! the last good value on screen, and a slow answer from an older cycle
//! never overwrites a newer one.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌──────────┐  │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal │  │
//! │  │ (state) │    │ (models) │    │(render) │    │          │  │
//! │  └────▲────┘    └──────────┘    └─────────┘    └──────────┘  │
//! │       │ watch                                                │
//! │  ┌────┴─────┐    ┌──────────┐                                │
//! │  │  poller  │───▶│  source  │◀── HttpFetcher | any fetcher   │
//! │  │ (task)   │    │ (reads)  │                                │
//! │  └──────────┘    └──────────┘                                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: The [`StatusFetcher`] trait and its HTTP implementation
//! - **[`poller`]**: The periodic task and the [`Reconciler`] that merges
//!   read outcomes into the display state
//! - **[`data`]**: Records, per-field state, history for sparklines
//! - **[`app`]** / **[`events`]** / **[`ui`]**: The interactive dashboard
//! - **[`config`]**: Layered settings (defaults, file, environment, flags)
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the local gateway
//! review-monitor
//!
//! # Another gateway, faster polling
//! review-monitor --url http://gateway.internal:8000 --interval 1s
//!
//! # Take one reading and write it to a file
//! review-monitor --export state.json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use review_monitor::{HttpFetcher, Poller, PollerConfig};
//!
//! # tokio_test::block_on(async {
//! let fetcher = HttpFetcher::builder()
//!     .endpoint("http://localhost:8000")
//!     .build()
//!     .unwrap();
//!
//! let poller = Poller::spawn(Arc::new(fetcher), PollerConfig::default());
//! if let Some(state) = poller.wait_ready(Duration::from_secs(15)).await {
//!     println!("{} cycles completed", state.cycles_completed);
//! }
//! poller.shutdown().await;
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod poller;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use data::{
    CycleId, DisplayState, FieldState, HealthRecord, HealthStatus, Phase, QueueActivity,
    QueueRecord,
};
pub use poller::{Applied, Field, Poller, PollerConfig, PollerHandle, Reconciler};
pub use source::{FetchError, HttpFetcher, StatusFetcher};
