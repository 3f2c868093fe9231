//! Layered settings.
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file (`--config monitor.toml`)
//! 3. Environment variables prefixed with `REVIEW_MONITOR_`
//!    (e.g. `REVIEW_MONITOR_BASE_URL`, `REVIEW_MONITOR_POLL_INTERVAL`)
//! 4. Command-line overrides
//!
//! ```toml
//! base_url = "http://gateway.internal:8000"
//! poll_interval = "2s"
//! request_timeout = "5s"
//! log_file = "review-monitor.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::poller::PollerConfig;
use crate::source::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "REVIEW_MONITOR";

/// Settings as written in files and the environment (durations as strings).
#[derive(Debug, Clone, Deserialize)]
struct RawSettings {
    base_url: String,
    poll_interval: String,
    request_timeout: String,
    log_file: Option<PathBuf>,
}

/// Command-line values that take precedence over every other source.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub poll_interval: Option<String>,
    pub request_timeout: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// Resolved monitor settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the API gateway.
    pub base_url: String,
    /// Time between poll cycles.
    pub poll_interval: Duration,
    /// Per-request timeout for each status read.
    pub request_timeout: Duration,
    /// Where to write logs in interactive mode. `None` disables logging there.
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ENDPOINT.to_string(),
            poll_interval: crate::poller::DEFAULT_PERIOD,
            request_timeout: DEFAULT_TIMEOUT,
            log_file: None,
        }
    }
}

impl Settings {
    /// Load settings from all sources.
    pub fn load(config_path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let env = Environment::with_prefix(ENV_PREFIX).prefix_separator("_");
        Self::load_with_env(config_path, overrides, env)
    }

    fn load_with_env(
        config_path: Option<&Path>,
        overrides: &Overrides,
        env: Environment,
    ) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("base_url", DEFAULT_ENDPOINT)?
            .set_default("poll_interval", "2s")?
            .set_default("request_timeout", "10s")?;

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder = builder
            .add_source(env)
            .set_override_option("base_url", overrides.base_url.clone())?
            .set_override_option("poll_interval", overrides.poll_interval.clone())?
            .set_override_option("request_timeout", overrides.request_timeout.clone())?
            .set_override_option(
                "log_file",
                overrides.log_file.as_ref().map(|p| p.display().to_string()),
            )?;

        let raw: RawSettings = builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self> {
        let poll_interval = parse_duration(&raw.poll_interval)
            .with_context(|| format!("Invalid poll_interval '{}'", raw.poll_interval))?;
        if poll_interval.is_zero() {
            bail!("poll_interval must be greater than zero");
        }

        let request_timeout = parse_duration(&raw.request_timeout)
            .with_context(|| format!("Invalid request_timeout '{}'", raw.request_timeout))?;
        if request_timeout.is_zero() {
            bail!("request_timeout must be greater than zero");
        }

        let base_url = raw.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            bail!("base_url must be an http(s) URL, got '{}'", raw.base_url);
        }

        Ok(Self {
            base_url,
            poll_interval,
            request_timeout,
            log_file: raw.log_file,
        })
    }

    /// Scheduler settings derived from these settings.
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            period: self.poll_interval,
        }
    }
}
