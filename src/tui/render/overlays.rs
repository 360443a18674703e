use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::tui::app::{App, View};

use super::helpers::centered_rect;

/// Render the y/n prompt for a pending destructive action
pub fn render_confirm_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(pending) = &app.confirm else {
        return;
    };
    let popup = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup);

    let bg = app.theme.background;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.red).bg(bg))
        .title(Span::styled(
            " Confirm ",
            Style::default()
                .fg(app.theme.red)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(bg));
    let lines = vec![
        Line::from(Span::styled(
            pending.prompt.clone(),
            Style::default().fg(app.theme.text_bright),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(app.theme.highlight)),
            Span::styled(" yes   ", Style::default().fg(app.theme.text)),
            Span::styled("n", Style::default().fg(app.theme.highlight)),
            Span::styled(" no", Style::default().fg(app.theme.text)),
        ]),
    ];
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup);
}

/// Render the help overlay (toggled with ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let overlay_area = centered_rect(60, 80, area);
    frame.render_widget(Clear, overlay_area);

    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(" Key Bindings", header_style)),
        Line::from(""),
        Line::from(Span::styled(" Everywhere", header_style)),
    ];
    let global: &[(&str, &str)] = &[
        (" Tab/1-4", "Switch view"),
        (" \u{2191}\u{2193}/jk", "Move cursor or scroll detail"),
        (" \u{2190}\u{2192}/hl", "Focus list / detail"),
        (" Enter", "Open or close the row under the cursor"),
        (" e", "Edit this view's form"),
        (" r", "Refresh now"),
        (" q", "Quit"),
    ];
    add_bindings(&mut lines, global, key_style, desc_style);

    let view_keys: &[(&str, &str)] = match app.view {
        View::Runs => &[(" e, Enter", "Fill in and start a run")],
        View::Ideas => &[
            (" f", "Cycle status filter"),
            (" g/G", "Next/previous gate"),
            (" s", "Cycle gate status"),
            (" n", "Edit gate notes"),
            (" w", "Save gate"),
            (" o/O, z", "Move through dossier, fold part"),
            (" [ ]", "Newer/older council round"),
            (" v", "Cycle version snapshots"),
            (" R", "Resubmit and re-review"),
            (" A", "Resubmit applying revisions"),
            (" S", "Resubmit without a re-review"),
        ],
        View::Literature => &[
            (" J/K", "Next/previous work"),
            (" p", "Choose local PDF"),
            (" a/x", "Attach/detach PDF"),
            (" D", "Remove work"),
            (" c", "Remove book and chapter results"),
            (" b", "Rebuild synthesis"),
            (" m, L", "Edit/run LLM assessment"),
            (" X", "Delete query"),
        ],
        View::Reviews => &[
            (" R", "Run the review with the form's model"),
            (" E", "Create a new review"),
        ],
    };
    let title = format!(" {}", app.view.title());
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(title, header_style)));
    add_bindings(&mut lines, view_keys, key_style, desc_style);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg));
    frame.render_widget(Paragraph::new(lines).block(block), overlay_area);
}

fn add_bindings(
    lines: &mut Vec<Line>,
    bindings: &[(&str, &str)],
    key_style: Style,
    desc_style: Style,
) {
    for (key, desc) in bindings {
        lines.push(Line::from(vec![
            Span::styled(format!("{key:<12}"), key_style),
            Span::styled(desc.to_string(), desc_style),
        ]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::actions::Action;
    use crate::tui::app::PendingConfirm;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn confirm_popup_shows_prompt() {
        let mut app = app_with_lists();
        app.confirm = Some(PendingConfirm {
            prompt: "Delete query #3?".into(),
            action: Action::DeleteQuery { query_id: 3 },
        });
        let out = render_to_string(80, 20, |frame, area| render_confirm_popup(frame, &app, area));
        assert!(out.contains("Delete query #3?"));
        assert!(out.contains("y yes"));
    }

    #[test]
    fn help_lists_view_keys() {
        let mut app = app_with_lists();
        app.view = View::Literature;
        let out = render_to_string(100, 40, |frame, area| render_help_overlay(frame, &app, area));
        assert!(out.contains("Rebuild synthesis"));
        assert!(out.contains("Switch view"));
    }
}
