//! Application state for the terminal dashboard.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::data::{DisplayState, History};
use crate::poller::PollerHandle;
use crate::ui::Theme;

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Default file written by the export key.
pub const DEFAULT_EXPORT_PATH: &str = "review_monitor_export.json";

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    // Data
    poller: PollerHandle,
    state_rx: watch::Receiver<DisplayState>,
    pub state: DisplayState,
    pub history: History,
    /// Set once the poller's channel has closed.
    pub poller_stopped: bool,

    // UI
    pub theme: Theme,
    pub export_path: PathBuf,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App around a running poller, detecting the theme from the terminal.
    pub fn new(poller: PollerHandle) -> Self {
        Self::with_theme(poller, Theme::auto_detect())
    }

    /// Create a new App with an explicit theme.
    pub fn with_theme(poller: PollerHandle, theme: Theme) -> Self {
        let state_rx = poller.subscribe();
        let state = state_rx.borrow().clone();
        Self {
            running: true,
            show_help: false,
            poller,
            state_rx,
            state,
            history: History::new(),
            poller_stopped: false,
            theme,
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            status_message: None,
        }
    }

    /// Returns a description of the monitored target.
    pub fn source_description(&self) -> &str {
        self.poller.description()
    }

    /// Pull the latest published state, if it changed since the last call.
    ///
    /// Returns true if the state was updated.
    pub fn sync(&mut self) -> bool {
        match self.state_rx.has_changed() {
            Ok(true) => {
                self.state = self.state_rx.borrow_and_update().clone();
                self.history.record(&self.state);
                true
            }
            Ok(false) => false,
            Err(_) => {
                self.poller_stopped = true;
                false
            }
        }
    }

    /// Ask the poller for an immediate extra cycle.
    pub fn refresh(&mut self) {
        if self.poller.refresh() {
            self.set_status_message("Refreshing...".to_string());
        } else if self.poller_stopped {
            self.set_status_message("Poller is not running".to_string());
        }
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current state to the configured export path.
    pub fn export(&mut self) {
        let path = self.export_path.clone();
        match write_export(&path, &self.state, self.source_description()) {
            Ok(()) => self.set_status_message(format!("Exported to {}", path.display())),
            Err(e) => self.set_status_message(format!("Export failed: {}", e)),
        }
    }

    /// Give back the poller handle so the caller can shut it down.
    pub fn into_poller(self) -> PollerHandle {
        self.poller
    }
}

/// Write a display state to `path` as pretty JSON.
pub fn write_export(path: &Path, state: &DisplayState, source: &str) -> Result<()> {
    let mut export = state.to_json(Instant::now());
    if let Some(map) = export.as_object_mut() {
        map.insert("source".to_string(), serde_json::json!(source));
    }

    let json = serde_json::to_string_pretty(&export)?;
    std::fs::write(path, json)?;
    Ok(())
}
