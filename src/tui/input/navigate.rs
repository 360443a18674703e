use crossterm::event::{KeyCode, KeyEvent};

use crate::sync::reconcile;
use crate::tui::app::{App, Effect, Focus, View};
use crate::tui::surface::EditTarget;

use super::detail::handle_detail_key;

const PAGE: u16 = 10;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) -> Vec<Effect> {
    match key.code {
        KeyCode::Char('q') => return vec![Effect::Quit],
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('r') => return vec![Effect::Refresh],
        KeyCode::Tab => switch_view(app, app.view.next()),
        KeyCode::BackTab => switch_view(app, app.view.prev()),
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            switch_view(app, View::ALL[index]);
        }
        KeyCode::Char('h') | KeyCode::Left => app.focus = Focus::List,
        KeyCode::Char('l') | KeyCode::Right => app.focus = Focus::Detail,
        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            Focus::List => app.move_cursor(1),
            Focus::Detail => app.surface.scroll = app.surface.scroll.saturating_add(1),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            Focus::List => app.move_cursor(-1),
            Focus::Detail => app.surface.scroll = app.surface.scroll.saturating_sub(1),
        },
        KeyCode::PageDown => app.surface.scroll = app.surface.scroll.saturating_add(PAGE),
        KeyCode::PageUp => app.surface.scroll = app.surface.scroll.saturating_sub(PAGE),
        KeyCode::Enter => return select_row(app),
        KeyCode::Char(c @ ('e' | 'E')) => {
            let index = usize::from(c == 'E');
            if let Some(&form) = app.view.forms().get(index) {
                app.surface.editing = Some(EditTarget::Form { form, field: 0 });
            }
        }
        _ => return handle_detail_key(app, key),
    }
    Vec::new()
}

fn switch_view(app: &mut App, view: View) {
    if app.view != view {
        app.view = view;
        app.focus = Focus::List;
        app.surface.scroll = 0;
    }
}

/// Toggle the row under the cursor open or closed
fn select_row(app: &mut App) -> Vec<Effect> {
    let Some(kind) = app.view.entity() else {
        return Vec::new();
    };
    let Some(id) = app.cursor_row().map(|row| row.id) else {
        return Vec::new();
    };
    app.surface.scroll = 0;
    app.gate_cursor = 0;
    app.dossier_cursor = 0;
    app.work_cursor = 0;
    app.pdf_choice = 0;
    match reconcile::select(&mut app.state, kind, id) {
        Some(request) => {
            app.focus = Focus::Detail;
            vec![Effect::Load(request)]
        }
        None => Vec::new(),
    }
}
