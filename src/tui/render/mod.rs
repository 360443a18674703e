pub mod detail;
pub mod forms;
pub mod helpers;
pub mod lists;
pub mod overlays;
pub mod status_row;
pub mod tab_bar;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::App;

/// Main render function. Dispatches to sub-renderers.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: tab bar (2 rows) | content | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // tab bar + separator
            Constraint::Min(1),    // content area
            Constraint::Length(1), // status row
        ])
        .split(area);

    tab_bar::render_tab_bar(frame, app, chunks[0]);

    // Content: list (and the view's form) on the left, detail on the right
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    let view_forms = app.view.forms();
    if view_forms.is_empty() {
        lists::render_list(frame, app, columns[0]);
    } else {
        let mut constraints = vec![Constraint::Min(3)];
        constraints.extend(
            view_forms
                .iter()
                .map(|form| Constraint::Length(form.fields().len() as u16 + 2)),
        );
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(columns[0]);
        lists::render_list(frame, app, left[0]);
        for (form, area) in view_forms.iter().zip(left.iter().skip(1)) {
            forms::render_form(frame, app, *form, *area);
        }
    }
    detail::render_detail(frame, app, columns[1]);

    if app.show_help {
        overlays::render_help_overlay(frame, app, frame.area());
    }
    if app.confirm.is_some() {
        overlays::render_confirm_popup(frame, app, frame.area());
    }

    status_row::render_status_row(frame, app, chunks[2]);
}
