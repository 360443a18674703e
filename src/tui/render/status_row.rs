use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::tui::surface::EditTarget;
use crate::util::unicode::{display_width, truncate_to_width};

use super::helpers::spans_width;

/// Render the status row (bottom of screen): the newest status message on
/// the left, key hints on the right
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let hint = match app.surface.editing {
        Some(EditTarget::Form { .. }) => "Enter submit  Tab next  Esc done",
        Some(_) => "Enter/Esc done  Tab next",
        None if app.confirm.is_some() => "y confirm  n cancel",
        None => "? help  r refresh  q quit",
    };

    let mut spans: Vec<Span> = Vec::new();
    if let Some((_, message)) = app.state.status.latest() {
        let room = width.saturating_sub(display_width(hint) + 2);
        let text = format!(" {} {}", message.at.format("%H:%M:%S"), message.text);
        spans.push(Span::styled(
            truncate_to_width(&text, room),
            Style::default()
                .fg(app.theme.status_color(message.level))
                .bg(bg),
        ));
    }
    let used = spans_width(&spans);
    let hint_width = display_width(hint);
    if used + hint_width < width {
        spans.push(Span::styled(
            " ".repeat(width - used - hint_width),
            Style::default().bg(bg),
        ));
        spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
