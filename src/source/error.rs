//! Error types for status reads.

use thiserror::Error;

/// Errors that can occur when reading a status endpoint.
///
/// The poller treats every variant the same way: the failure is logged,
/// recorded on the affected field, and the previous value is kept.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Could not reach the service.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// Other transport-level failure.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The service answered with a non-success status code.
    #[error("Endpoint returned status {0}")]
    Status(u16),

    /// The body could not be parsed into the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Network-level failures that say nothing about the service itself.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::Connection(_) | FetchError::Timeout | FetchError::Http(_)
        )
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connection(err.to_string())
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Http(err.to_string())
        }
    }
}
