//! Terminal rendering using ratatui.
//!
//! Rendering is a pure function of [`App`]: nothing here mutates state.

pub mod common;
pub mod dashboard;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

/// Minimum terminal size for usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 10;

/// Draw one full frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5.min(area.height));
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Min(6),    // Cards
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);

    if app.state.ready() {
        dashboard::render(frame, app, chunks[1]);
    } else {
        dashboard::render_loading(frame, app, chunks[1]);
    }

    common::render_status_bar(frame, app, chunks[2]);

    if app.show_help {
        common::render_help(frame, app, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{HealthRecord, HealthStatus, QueueActivity, QueueRecord};
    use crate::poller::{Poller, PollerConfig};
    use crate::source::{FetchError, StatusFetcher};
    use async_trait::async_trait;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug)]
    struct FixedFetcher {
        health: Option<HealthRecord>,
        queue: Option<QueueRecord>,
    }

    #[async_trait]
    impl StatusFetcher for FixedFetcher {
        async fn read_health(&self) -> Result<HealthRecord, FetchError> {
            self.health
                .clone()
                .ok_or_else(|| FetchError::Connection("connection refused".to_string()))
        }

        async fn read_queue(&self) -> Result<QueueRecord, FetchError> {
            self.queue.ok_or(FetchError::Timeout)
        }

        fn description(&self) -> &str {
            "http: http://localhost:8000"
        }
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 16)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    async fn app_after_first_cycle(fetcher: FixedFetcher) -> App {
        let poller = Poller::spawn(Arc::new(fetcher), PollerConfig::default());
        let mut app = App::with_theme(poller, Theme::dark());
        tokio::time::sleep(Duration::from_millis(10)).await;
        app.sync();
        app
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_screen_before_first_cycle() {
        let poller = Poller::spawn(
            Arc::new(FixedFetcher {
                health: None,
                queue: None,
            }),
            PollerConfig::default(),
        );
        let app = App::with_theme(poller, Theme::dark());

        let text = screen(&app);
        assert!(text.contains("Loading dashboard..."));
    }

    #[tokio::test(start_paused = true)]
    async fn test_healthy_idle_service() {
        let app = app_after_first_cycle(FixedFetcher {
            health: Some(HealthRecord {
                status: HealthStatus::Healthy,
                redis_connected: true,
                database_connected: true,
            }),
            queue: Some(QueueRecord {
                queue_length: 0,
                activity: QueueActivity::Idle,
            }),
        })
        .await;

        let text = screen(&app);
        assert!(text.contains("Healthy"));
        assert_eq!(text.matches("Connected").count(), 2);
        assert!(text.contains("Jobs in Queue"));
        assert!(text.contains("Idle"));
        assert!(!text.contains("no data"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_absent_health_is_not_shown_as_down() {
        let app = app_after_first_cycle(FixedFetcher {
            health: None,
            queue: Some(QueueRecord {
                queue_length: 5,
                activity: QueueActivity::Processing,
            }),
        })
        .await;

        let text = screen(&app);
        assert!(text.contains("no data"));
        assert!(!text.contains("Down"));
        assert!(!text.contains("Unhealthy"));
        assert!(text.contains("Processing"));
        assert!(text.contains("connection refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_small_terminal_message() {
        let poller = Poller::spawn(
            Arc::new(FixedFetcher {
                health: None,
                queue: None,
            }),
            PollerConfig::default(),
        );
        let app = App::with_theme(poller, Theme::dark());

        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        terminal.draw(|frame| draw(frame, &app)).unwrap();
        let buffer = terminal.backend().buffer();
        let first_rows: String = (0..buffer.area.height)
            .flat_map(|y| (0..buffer.area.width).map(move |x| (x, y)))
            .map(|pos| buffer[pos].symbol().to_string())
            .collect();
        assert!(first_rows.contains("Terminal too small"));
    }
}
