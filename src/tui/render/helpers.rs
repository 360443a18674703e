use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::app::App;
use crate::util::unicode;

/// Compute total display width of a slice of spans
pub(super) fn spans_width(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum()
}

/// A rect `percent_x` by `percent_y` of `area`, centered
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Bold section heading
pub(super) fn heading(app: &App, text: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(
        text.into(),
        Style::default()
            .fg(app.theme.text_bright)
            .add_modifier(Modifier::BOLD),
    ))
}

/// `label: value` with a dimmed label
pub(super) fn field_line(app: &App, label: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(app.theme.dim)),
        Span::styled(value.into(), Style::default().fg(app.theme.text)),
    ])
}

/// Multi-line body text, one `Line` per source line
pub(super) fn body_lines(app: &App, text: &str) -> Vec<Line<'static>> {
    text.lines()
        .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(app.theme.text))))
        .collect()
}

/// Cursor gutter: `▸ ` on the focused row, two spaces elsewhere
pub(super) fn gutter(app: &App, on: bool) -> Span<'static> {
    if on {
        Span::styled("\u{25B8} ", Style::default().fg(app.theme.highlight))
    } else {
        Span::raw("  ")
    }
}
