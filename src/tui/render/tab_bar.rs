use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, View};

use super::helpers::spans_width;

/// Render the tab bar: one tab per view, endpoint on the right, separator below
pub fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // tabs
            Constraint::Length(1), // separator
        ])
        .split(area);

    render_tabs(frame, app, chunks[0]);
    let sep = Paragraph::new(Line::from(Span::styled(
        "\u{2500}".repeat(chunks[1].width as usize),
        Style::default().fg(app.theme.dim).bg(app.theme.background),
    )));
    frame.render_widget(sep, chunks[1]);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let sep = Span::styled("\u{2502}", Style::default().fg(app.theme.dim).bg(bg));
    let mut spans: Vec<Span> = vec![
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled("\u{25B6}", Style::default().fg(app.theme.purple).bg(bg)),
        Span::styled(" ", Style::default().bg(bg)),
    ];

    for (i, view) in View::ALL.iter().enumerate() {
        let count = app.state.lists.get(view.collection()).len();
        spans.push(Span::styled(
            format!(" {} {} ({count}) ", i + 1, view.title()),
            tab_style(app, app.view == *view),
        ));
        spans.push(sep.clone());
    }

    let mut right = String::new();
    if app.view == View::Ideas {
        right.push_str(&format!("filter: {}  ", app.state.idea_filter.label()));
    }
    right.push_str(&app.endpoint);
    right.push(' ');
    let used = spans_width(&spans);
    let width = area.width as usize;
    let right_width = crate::util::unicode::display_width(&right);
    if used + right_width < width {
        spans.push(Span::styled(" ".repeat(width - used - right_width), Style::default().bg(bg)));
        spans.push(Span::styled(right, Style::default().fg(app.theme.dim).bg(bg)));
    }

    let tabs = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(tabs, area);
}

fn tab_style(app: &App, is_current: bool) -> Style {
    if is_current {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.dim).bg(app.theme.background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn tabs_show_counts_and_endpoint() {
        let app = app_with_lists();
        let out = render_to_string(120, 2, |frame, area| render_tab_bar(frame, &app, area));
        let first = out.lines().next().unwrap_or_default();
        assert!(first.contains("1 Runs (1)"));
        assert!(first.contains("3 Literature (1)"));
        assert!(first.contains("filter: all"));
        assert!(first.ends_with("http://127.0.0.1:8000"));
    }
}
