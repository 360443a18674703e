use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::app::{App, Focus};
use crate::util::unicode::truncate_to_width;

use super::helpers::gutter;

/// Render the current view's list. Each row takes two lines; the list
/// scrolls to keep the cursor visible.
pub fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::List;
    let border = if focused {
        app.theme.highlight
    } else {
        app.theme.dim
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" {} ", app.view.title()),
            Style::default().fg(app.theme.text_bright),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = app.rows();
    if rows.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "Nothing here yet.",
            Style::default().fg(app.theme.dim),
        )));
        frame.render_widget(empty, inner);
        return;
    }

    let text_width = (inner.width as usize).saturating_sub(2);
    let visible_rows = (inner.height as usize / 2).max(1);
    let cursor = app.cursor();
    let first = cursor.saturating_sub(visible_rows - 1);

    let mut lines: Vec<Line> = Vec::new();
    for (i, row) in rows.iter().enumerate().skip(first).take(visible_rows) {
        let on_cursor = focused && i == cursor;
        let mut title_style = Style::default().fg(app.theme.text);
        if row.selected {
            title_style = title_style
                .fg(app.theme.text_bright)
                .add_modifier(Modifier::BOLD);
        }
        if on_cursor {
            title_style = title_style.bg(app.theme.selection_bg);
        }
        let marker = if row.selected { "\u{25CF} " } else { "" };
        lines.push(Line::from(vec![
            gutter(app, i == cursor),
            Span::styled(
                truncate_to_width(&format!("{marker}{}", row.title), text_width),
                title_style,
            ),
        ]));
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                truncate_to_width(&row.subtitle, text_width),
                Style::default().fg(app.theme.dim),
            ),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::EntityKind;
    use crate::tui::app::View;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn rows_show_title_and_subtitle() {
        let mut app = app_with_lists();
        app.view = View::Runs;
        let out = render_to_string(60, 8, |frame, area| render_list(frame, &app, area));
        assert!(out.contains("Run #1 [done] openai/gpt-4o"));
        assert!(out.contains("Focus: tides, memory"));
    }

    #[test]
    fn selected_row_is_marked() {
        let mut app = app_with_lists();
        app.view = View::Reviews;
        app.state.selection.select(EntityKind::Review, 9);
        app.state.rerender_lists();
        let out = render_to_string(60, 8, |frame, area| render_list(frame, &app, area));
        assert!(out.contains("\u{25CF} Sleep and recall"));
    }

    #[test]
    fn empty_list_says_so() {
        let mut app = app_with_lists();
        app.state.collections.reviews.clear();
        app.state.rerender_lists();
        app.view = View::Reviews;
        let out = render_to_string(60, 8, |frame, area| render_list(frame, &app, area));
        assert!(out.contains("Nothing here yet."));
    }
}
