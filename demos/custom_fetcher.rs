//! Example: Polling a custom status source
//!
//! This example shows how to plug your own [`StatusFetcher`] into the
//! poller instead of the HTTP fetcher.
//!
//! This is useful when you want to:
//! - Watch a service that exposes its status some other way
//! - Generate synthetic data for testing the dashboard
//! - See how failed reads are kept apart from good values
//!
//! # Usage
//!
//! ```bash
//! cargo run --example custom_fetcher
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use review_monitor::{
    FetchError, HealthRecord, HealthStatus, Poller, PollerConfig, QueueActivity, QueueRecord,
    StatusFetcher,
};

/// A queue that fills for a while, then drains. Every fifth health read fails.
#[derive(Debug, Default)]
struct SyntheticFetcher {
    reads: AtomicU64,
}

#[async_trait]
impl StatusFetcher for SyntheticFetcher {
    async fn read_health(&self) -> Result<HealthRecord, FetchError> {
        let n = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
        if n % 5 == 0 {
            return Err(FetchError::Connection("synthetic outage".to_string()));
        }
        Ok(HealthRecord {
            status: HealthStatus::Healthy,
            redis_connected: true,
            database_connected: n % 7 != 0,
        })
    }

    async fn read_queue(&self) -> Result<QueueRecord, FetchError> {
        // Simulate a slower endpoint
        tokio::time::sleep(Duration::from_millis(150)).await;

        let n = self.reads.load(Ordering::SeqCst);
        let queue_length = if n % 20 < 10 { n % 20 } else { 20 - n % 20 };
        Ok(QueueRecord {
            queue_length,
            activity: if queue_length > 0 {
                QueueActivity::Processing
            } else {
                QueueActivity::Idle
            },
        })
    }

    fn description(&self) -> &str {
        "synthetic"
    }
}

#[tokio::main]
async fn main() {
    println!("Custom fetcher example");
    println!("Polling synthetic status every 500ms...\n");

    let config = PollerConfig {
        period: Duration::from_millis(500),
    };
    let poller = Poller::spawn(Arc::new(SyntheticFetcher::default()), config);
    let mut updates = poller.subscribe();

    // Print every published state for a few seconds
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while let Ok(Ok(())) = tokio::time::timeout_at(deadline, updates.changed()).await {
        let state = updates.borrow_and_update().clone();
        if !state.ready() {
            continue;
        }

        let health = match state.health.value() {
            Some(h) => format!(
                "{} (db: {})",
                h.status.label(),
                if h.database_connected { "up" } else { "down" }
            ),
            None => "no data".to_string(),
        };
        let queue = match state.queue.value() {
            Some(q) => format!("{} jobs, {}", q.queue_length, q.activity.label()),
            None => "no data".to_string(),
        };
        let stale = if state.health.is_stale() { " [health stale]" } else { "" };

        println!(
            "cycle {:>3}: health={} queue={}{}",
            state.cycles_completed, health, queue, stale
        );
    }

    poller.shutdown().await;
    println!("\nPoller stopped.");
}
