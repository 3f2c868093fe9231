//! Wire formats of the two status endpoints.
//!
//! These match the JSON bodies produced by the API gateway. Fields the
//! monitor does not use (timestamps, the health endpoint's copy of the
//! queue length) are ignored on deserialization.

use serde::Deserialize;

use super::FetchError;
use crate::data::{HealthRecord, HealthStatus, QueueActivity, QueueRecord};

/// Body of `GET /health`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct HealthResponse {
    /// "healthy" or "unhealthy".
    pub status: String,
    /// Whether the gateway can reach Redis.
    pub redis: bool,
    /// Whether the gateway can reach the database.
    pub database: bool,
}

/// Body of `GET /queue/status`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct QueueResponse {
    /// Jobs waiting in the review queue.
    pub queue_length: u64,
    /// "processing" or "idle".
    pub status: String,
}

impl From<HealthResponse> for HealthRecord {
    fn from(body: HealthResponse) -> Self {
        HealthRecord {
            status: HealthStatus::from_wire(&body.status),
            redis_connected: body.redis,
            database_connected: body.database,
        }
    }
}

impl TryFrom<QueueResponse> for QueueRecord {
    type Error = FetchError;

    fn try_from(body: QueueResponse) -> Result<Self, Self::Error> {
        let activity = QueueActivity::from_wire(&body.status).ok_or_else(|| {
            FetchError::Decode(format!("unknown queue status '{}'", body.status))
        })?;
        Ok(QueueRecord {
            queue_length: body.queue_length,
            activity,
        })
    }
}
