//! Typed status records produced by the fetcher.
//!
//! These are the normalized forms of the two endpoint bodies. Each record
//! is immutable once received and replaced wholesale on the next
//! successful read.

use serde::Serialize;

/// Overall service status as reported by the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    /// A status string the monitor does not recognize.
    Unknown(String),
}

impl HealthStatus {
    /// Parse the wire status string.
    ///
    /// Unrecognized values are kept verbatim rather than rejected so a
    /// newer service can add states without blanking the health card.
    pub fn from_wire(s: &str) -> Self {
        match s {
            "healthy" => HealthStatus::Healthy,
            "unhealthy" => HealthStatus::Unhealthy,
            other => HealthStatus::Unknown(other.to_string()),
        }
    }

    /// Returns a short label for display.
    pub fn label(&self) -> &str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Unhealthy => "Unhealthy",
            HealthStatus::Unknown(s) => s,
        }
    }
}

/// Result of a successful `/health` read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthRecord {
    pub status: HealthStatus,
    pub redis_connected: bool,
    pub database_connected: bool,
}

/// What the worker pool is doing with the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueActivity {
    Processing,
    Idle,
}

impl QueueActivity {
    /// Parse the wire status string. Returns `None` for anything else.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "processing" => Some(QueueActivity::Processing),
            "idle" => Some(QueueActivity::Idle),
            _ => None,
        }
    }

    /// Returns the display label for this activity.
    pub fn label(&self) -> &'static str {
        match self {
            QueueActivity::Processing => "Processing",
            QueueActivity::Idle => "Idle",
        }
    }
}

/// Result of a successful `/queue/status` read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueRecord {
    pub queue_length: u64,
    pub activity: QueueActivity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_from_wire() {
        assert_eq!(HealthStatus::from_wire("healthy"), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_wire("unhealthy"), HealthStatus::Unhealthy);
        assert_eq!(
            HealthStatus::from_wire("degraded"),
            HealthStatus::Unknown("degraded".to_string())
        );
        assert_eq!(HealthStatus::from_wire("degraded").label(), "degraded");
    }

    #[test]
    fn test_queue_activity_from_wire() {
        assert_eq!(QueueActivity::from_wire("processing"), Some(QueueActivity::Processing));
        assert_eq!(QueueActivity::from_wire("idle"), Some(QueueActivity::Idle));
        assert_eq!(QueueActivity::from_wire("Idle"), None);
    }

    #[test]
    fn test_records_serialize() {
        let record = QueueRecord {
            queue_length: 3,
            activity: QueueActivity::Processing,
        };
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json["queue_length"], 3);
        assert_eq!(json["activity"], "processing");
    }
}
