use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::sync::forms::FormId;
use crate::tui::app::App;
use crate::tui::surface::EditTarget;
use crate::util::unicode::truncate_to_width;

use super::helpers::gutter;

/// Render one form: `label: value` per field, the edited field highlighted
/// with a block cursor
pub fn render_form(frame: &mut Frame, app: &App, form: FormId, area: Rect) {
    let editing_field = match app.surface.editing {
        Some(EditTarget::Form { form: f, field }) if f == form => Some(field),
        _ => None,
    };
    let border = if editing_field.is_some() {
        app.theme.highlight
    } else {
        app.theme.dim
    };
    let key = if app.view.forms().get(1) == Some(&form) { 'E' } else { 'e' };
    let hint = if editing_field.is_some() {
        String::new()
    } else {
        format!(" ({key}) ")
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" {}{hint}", form.title()),
            Style::default().fg(app.theme.text_bright),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width as usize;
    let lines: Vec<Line> = form
        .fields()
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let active = editing_field == Some(i);
            let value = app.surface.value(form, spec.name);
            let label = format!("{}: ", spec.label);
            let room = width.saturating_sub(label.len() + 3);
            let mut spans = vec![
                gutter(app, active),
                Span::styled(label, Style::default().fg(app.theme.dim)),
            ];
            if active {
                spans.push(Span::styled(
                    truncate_to_width(value, room),
                    Style::default()
                        .fg(app.theme.text_bright)
                        .bg(app.theme.selection_bg),
                ));
                spans.push(Span::styled(
                    "\u{258C}",
                    Style::default().fg(app.theme.highlight),
                ));
            } else {
                spans.push(Span::styled(
                    truncate_to_width(value, room),
                    Style::default().fg(app.theme.text),
                ));
            }
            Line::from(spans)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}
