//! Common UI components.
//!
//! This module contains the header bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tokio::time::Instant;

use crate::app::App;
use crate::data::duration::format_age;
use crate::data::FieldState;

/// Render the header bar with the overall status at a glance.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled(
        " CODE REVIEW MONITOR ",
        Style::default().add_modifier(Modifier::BOLD),
    );

    if !app.state.ready() {
        let line = Line::from(vec![title, Span::raw("| Loading...")]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let mut spans = vec![title, Span::raw("│ ")];

    match app.state.health.value() {
        Some(health) => spans.push(Span::styled(
            format!("● {}", health.status.label()),
            app.theme.health_style(&health.status),
        )),
        None => spans.push(Span::styled("● no data", app.theme.absent)),
    }

    spans.push(Span::raw(" │ "));

    match app.state.queue.value() {
        Some(queue) => {
            spans.push(Span::styled(
                format!("{}", queue.queue_length),
                Style::default().add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw(" queued, "));
            spans.push(Span::styled(
                queue.activity.label().to_lowercase(),
                app.theme.activity_style(queue.activity),
            ));
        }
        None => spans.push(Span::styled("queue: no data", app.theme.absent)),
    }

    spans.push(Span::raw(format!(" │ {} cycles", app.state.cycles_completed)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the status bar at the bottom.
///
/// Shows: target, age of each field, the latest read error, available controls.
/// Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let now = Instant::now();
    let mut status = format!(
        " {} | health {} | queue {}",
        app.source_description(),
        field_age(&app.state.health, now),
        field_age(&app.state.queue, now),
    );

    if let Some(err) = latest_error(app) {
        status.push_str(&format!(" | Error: {}", err));
    }
    if app.poller_stopped {
        status.push_str(" | poller stopped");
    }
    status.push_str(" | r:refresh e:export ?:help q:quit");

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

fn field_age<T>(field: &FieldState<T>, now: Instant) -> String {
    match field.last_updated() {
        Some(at) => {
            let age = format_age(now.saturating_duration_since(at));
            if field.is_stale() {
                format!("{} ago (stale)", age)
            } else {
                format!("{} ago", age)
            }
        }
        None => "pending".to_string(),
    }
}

/// Message of the most recent error across both fields, if it is still current.
fn latest_error(app: &App) -> Option<&str> {
    let health = app.state.health.is_stale().then(|| app.state.health.last_error()).flatten();
    let queue = app.state.queue.is_stale().then(|| app.state.queue.last_error()).flatten();

    match (health, queue) {
        (Some(h), Some(q)) => Some(if h.cycle >= q.cycle {
            h.message.as_str()
        } else {
            q.message.as_str()
        }),
        (Some(h), None) => Some(h.message.as_str()),
        (None, Some(q)) => Some(q.message.as_str()),
        (None, None) => None,
    }
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the dashboard.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from("  r         Refresh now"),
        Line::from("  e         Export state to JSON"),
        Line::from("  ?         Toggle this help"),
        Line::from("  q / Esc   Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Legend",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("no data", app.theme.absent),
            Span::raw("   not read yet"),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("(stale)", Style::default().fg(app.theme.warning)),
            Span::raw("   last read failed"),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 40u16.min(area.width.saturating_sub(4));
    let help_height = 14u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
