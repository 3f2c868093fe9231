//! Remote state fetcher.
//!
//! This module provides a trait-based abstraction over the two status reads
//! the monitor performs, along with the HTTP implementation used against
//! the real API gateway.

mod error;
mod http;
mod wire;

pub use error::FetchError;
pub use http::{HttpFetcher, HttpFetcherBuilder, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};

use std::fmt::Debug;

use async_trait::async_trait;

use crate::data::{HealthRecord, QueueRecord};

/// Performs the status reads for one monitored service.
///
/// The two reads are independent: the poller issues them concurrently and
/// applies each result on its own, so one failing never holds back the
/// other. Implementations must not retry internally.
#[async_trait]
pub trait StatusFetcher: Send + Sync + Debug {
    /// Read overall health and dependency connectivity.
    async fn read_health(&self) -> Result<HealthRecord, FetchError>;

    /// Read queue depth and worker activity.
    async fn read_queue(&self) -> Result<QueueRecord, FetchError>;

    /// Returns a human-readable description of the target.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}
