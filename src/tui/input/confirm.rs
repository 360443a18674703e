use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Effect};

pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) -> Vec<Effect> {
    match key.code {
        // Confirm: y
        KeyCode::Char('y') | KeyCode::Char('Y') => match app.confirm.take() {
            Some(pending) => vec![Effect::Perform(pending.action)],
            None => Vec::new(),
        },
        // Cancel: n or Esc
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.confirm = None;
            Vec::new()
        }
        _ => Vec::new(),
    }
}
