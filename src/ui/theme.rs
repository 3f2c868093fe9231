//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{HealthStatus, QueueActivity};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for good states (healthy, connected).
    pub healthy: Color,
    /// Color for busy-but-fine states (processing, stale data).
    pub warning: Color,
    /// Color for bad states (unhealthy, down).
    pub critical: Color,
    /// Color for idle or informational states.
    pub info: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for card titles and the help heading.
    pub header: Style,
    /// Style for values that have not been received yet.
    pub absent: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            healthy: Color::Green,
            warning: Color::Yellow,
            critical: Color::Red,
            info: Color::LightBlue,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            absent: Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            healthy: Color::Green,
            warning: Color::Yellow,
            critical: Color::Red,
            info: Color::Blue,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            absent: Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for the overall service status.
    pub fn health_style(&self, status: &HealthStatus) -> Style {
        match status {
            HealthStatus::Healthy => Style::default().fg(self.healthy),
            HealthStatus::Unhealthy => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
            HealthStatus::Unknown(_) => Style::default().fg(self.warning),
        }
    }

    /// Style for a dependency connection flag.
    pub fn connection_style(&self, connected: bool) -> Style {
        if connected {
            Style::default().fg(self.healthy)
        } else {
            Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
        }
    }

    /// Style for queue activity.
    pub fn activity_style(&self, activity: QueueActivity) -> Style {
        match activity {
            QueueActivity::Processing => Style::default().fg(self.warning),
            QueueActivity::Idle => Style::default().fg(self.info),
        }
    }
}
