//! Dashboard view rendering.
//!
//! Two cards side by side: service health (overall status and dependency
//! connectivity) and the review queue (depth, activity, recent trend).
//! Fields that have never been read render as "no data", never as down.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{FieldState, QueueRecord};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Number of samples shown in the queue trend.
const SPARKLINE_WIDTH: usize = 30;

/// Placeholder for a field with no successful read yet.
const NO_DATA: &str = "no data";

/// Render the loading screen shown until the first cycle completes.
pub fn render_loading(frame: &mut Frame, app: &App, area: Rect) {
    let lines = vec![
        Line::from(Span::styled("Loading dashboard...", app.theme.header)),
        Line::from(""),
        Line::from(Span::styled(
            format!("Polling {}", app.source_description()),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let height = lines.len() as u16;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let centered = Rect::new(area.x, y, area.width, height.min(area.height));

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), centered);
}

/// Render the health and queue cards.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);

    render_health_card(frame, app, chunks[0]);
    render_queue_card(frame, app, chunks[1]);
}

fn card<'a>(app: &App, title: &'a str, stale: bool) -> Block<'a> {
    let title = if stale {
        Line::from(vec![
            Span::styled(format!(" {} ", title), app.theme.header),
            Span::styled("(stale) ", Style::default().fg(app.theme.warning)),
        ])
    } else {
        Line::from(Span::styled(format!(" {} ", title), app.theme.header))
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

fn render_health_card(frame: &mut Frame, app: &App, area: Rect) {
    let field = &app.state.health;
    let block = card(app, "System Health", field.is_stale());

    let absent = || Span::styled(NO_DATA, app.theme.absent);

    let (overall, redis, database) = match field.value() {
        Some(health) => (
            Span::styled(health.status.label().to_string(), app.theme.health_style(&health.status)),
            connection_span(app, health.redis_connected),
            connection_span(app, health.database_connected),
        ),
        None => (absent(), absent(), absent()),
    };

    let lines = vec![
        status_line("Overall Status", overall),
        Line::from(""),
        status_line("Redis", redis),
        status_line("Database", database),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_queue_card(frame: &mut Frame, app: &App, area: Rect) {
    let field: &FieldState<QueueRecord> = &app.state.queue;
    let block = card(app, "Queue Status", field.is_stale());

    let lines = match field.value() {
        Some(queue) => {
            let rate = app
                .history
                .queue_rate()
                .map(|r| format!("{:+.1} jobs/s", r))
                .unwrap_or_else(|| "-".to_string());

            vec![
                status_line(
                    "Jobs in Queue",
                    Span::styled(
                        queue.queue_length.to_string(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ),
                status_line(
                    "Activity",
                    Span::styled(queue.activity.label(), app.theme.activity_style(queue.activity)),
                ),
                status_line("Trend", Span::raw(render_sparkline(&app.history.queue_sparkline()))),
                status_line("Rate", Span::raw(rate)),
            ]
        }
        None => vec![
            status_line("Jobs in Queue", Span::styled(NO_DATA, app.theme.absent)),
            status_line("Activity", Span::styled(NO_DATA, app.theme.absent)),
        ],
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn connection_span(app: &App, connected: bool) -> Span<'static> {
    let label = if connected { "Connected" } else { "Down" };
    Span::styled(label, app.theme.connection_style(connected))
}

fn status_line<'a>(label: &'a str, value: Span<'a>) -> Line<'a> {
    Line::from(vec![Span::raw(format!(" {:<16}", label)), value])
}

fn render_sparkline(data: &[u8]) -> String {
    if data.is_empty() {
        return "-".to_string();
    }

    data.iter()
        .rev()
        .take(SPARKLINE_WIDTH)
        .rev()
        .map(|&v| SPARKLINE_CHARS[v.min(7) as usize])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_sparkline_keeps_latest_samples() {
        let data: Vec<u8> = (0..40).map(|i| (i % 8) as u8).collect();
        let line = render_sparkline(&data);
        assert_eq!(line.chars().count(), SPARKLINE_WIDTH);
        assert_eq!(line.chars().last(), Some(SPARKLINE_CHARS[39 % 8]));
    }

    #[test]
    fn test_render_sparkline_empty() {
        assert_eq!(render_sparkline(&[]), "-");
    }
}
