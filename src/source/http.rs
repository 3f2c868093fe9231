//! HTTP fetcher for the API gateway's status endpoints.
//!
//! ## Endpoints
//!
//! - `GET {endpoint}/health`: overall status plus Redis/database connectivity
//! - `GET {endpoint}/queue/status`: queue depth and worker activity
//!
//! Any non-200 answer or unparseable body is a [`FetchError`]. Each call is
//! a single attempt; the poller's next tick is the only retry.
//!
//! ## Example
//!
//! ```rust,no_run
//! use review_monitor::{HttpFetcher, StatusFetcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = HttpFetcher::builder()
//!         .endpoint("http://localhost:8000")
//!         .build()?;
//!
//!     let health = fetcher.read_health().await?;
//!     println!("Service is {}", health.status.label());
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use super::wire::{HealthResponse, QueueResponse};
use super::{FetchError, StatusFetcher};
use crate::data::{HealthRecord, QueueRecord};

/// Default base URL of the API gateway.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Reads status from the API gateway over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    endpoint: String,
    description: String,
}

impl HttpFetcher {
    /// Create a new builder for configuring the fetcher.
    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder::default()
    }

    /// Returns the base URL being monitored.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = format!("{}{}", self.endpoint, path);

        let response = self.client.get(&url).send().await?;

        if response.status() != StatusCode::OK {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        // Body read and parse failures come back as timeout or decode errors.
        Ok(response.json().await?)
    }
}

#[async_trait]
impl StatusFetcher for HttpFetcher {
    async fn read_health(&self) -> Result<HealthRecord, FetchError> {
        let body: HealthResponse = self.get("/health").await?;
        Ok(body.into())
    }

    async fn read_queue(&self) -> Result<QueueRecord, FetchError> {
        let body: QueueResponse = self.get("/queue/status").await?;
        body.try_into()
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`HttpFetcher`].
#[derive(Debug, Default)]
pub struct HttpFetcherBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl HttpFetcherBuilder {
    /// Set the gateway base URL (e.g., "http://localhost:8000").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the User-Agent header sent with each read.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the fetcher.
    pub fn build(self) -> Result<HttpFetcher, FetchError> {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| concat!("review-monitor/", env!("CARGO_PKG_VERSION")).to_string());

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();
        let description = format!("http: {}", endpoint);

        Ok(HttpFetcher {
            client,
            endpoint,
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{HealthStatus, QueueActivity};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve canned responses keyed by request path until the test ends.
    async fn serve(routes: Vec<(&'static str, u16, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let routes = routes.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let mut read = 0;
                    while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf[read..]).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => read += n,
                        }
                    }
                    let request = String::from_utf8_lossy(&buf[..read]);
                    let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                    let (status, body) = routes
                        .iter()
                        .find(|(p, _, _)| *p == path)
                        .map(|(_, s, b)| (*s, *b))
                        .unwrap_or((404, "{\"detail\":\"Not Found\"}"));

                    let response = format!(
                        "HTTP/1.1 {} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}", addr)
    }

    #[test]
    fn test_builder_defaults() {
        let fetcher = HttpFetcher::builder().build().unwrap();
        assert_eq!(fetcher.endpoint(), "http://localhost:8000");
        assert_eq!(fetcher.description(), "http: http://localhost:8000");
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let fetcher = HttpFetcher::builder().endpoint("http://gateway:8000/").build().unwrap();
        assert_eq!(fetcher.endpoint(), "http://gateway:8000");
    }

    #[tokio::test]
    async fn test_reads_healthy_service() {
        let base = serve(vec![
            (
                "/health",
                200,
                r#"{"status":"healthy","redis":true,"database":true,"queue_length":0}"#,
            ),
            ("/queue/status", 200, r#"{"queue_length":0,"status":"idle"}"#),
        ])
        .await;
        let fetcher = HttpFetcher::builder().endpoint(base).build().unwrap();

        let health = fetcher.read_health().await.unwrap();
        assert_eq!(health.status, HealthStatus::Healthy);
        assert!(health.redis_connected);
        assert!(health.database_connected);

        let queue = fetcher.read_queue().await.unwrap();
        assert_eq!(queue.queue_length, 0);
        assert_eq!(queue.activity, QueueActivity::Idle);
    }

    #[tokio::test]
    async fn test_non_200_is_status_error() {
        let base = serve(vec![(
            "/queue/status",
            500,
            r#"{"detail":"redis down"}"#,
        )])
        .await;
        let fetcher = HttpFetcher::builder().endpoint(base).build().unwrap();

        let err = fetcher.read_queue().await.unwrap_err();
        assert!(matches!(err, FetchError::Status(500)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let base = serve(vec![("/health", 200, "not json")]).await;
        let fetcher = HttpFetcher::builder().endpoint(base).build().unwrap();

        let err = fetcher.read_health().await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transient() {
        // Bind then drop to get a port nobody is listening on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpFetcher::builder()
            .endpoint(format!("http://{}", addr))
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        let err = fetcher.read_health().await.unwrap_err();
        assert!(err.is_transient(), "unexpected error: {err:?}");
    }

    #[tokio::test]
    async fn test_stalled_service_is_timeout() {
        // Accepts the connection but never answers.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let fetcher = HttpFetcher::builder()
            .endpoint(format!("http://{}", addr))
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();

        let err = fetcher.read_queue().await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout), "unexpected error: {err:?}");
        assert!(err.is_transient());
    }
}
