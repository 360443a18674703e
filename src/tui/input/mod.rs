mod confirm;
mod detail;
mod edit;
mod navigate;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Effect, PendingConfirm};
use crate::sync::actions::Action;

use confirm::handle_confirm;
use edit::{handle_edit, insert_text};
use navigate::handle_navigate;

/// Handle a key event, returning the work the event loop should run
pub fn handle_key(app: &mut App, key: KeyEvent) -> Vec<Effect> {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return Vec::new();
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return vec![Effect::Quit];
    }
    let key = normalize_key(key);

    if app.confirm.is_some() {
        return handle_confirm(app, key);
    }
    if app.surface.editing.is_some() {
        return handle_edit(app, key);
    }
    if app.show_help {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.show_help = false;
        }
        return Vec::new();
    }
    handle_navigate(app, key)
}

/// Handle a bracketed paste. Only lands in the line editor; newlines
/// become spaces.
pub fn handle_paste(app: &mut App, text: &str) {
    if app.surface.editing.is_none() || text.is_empty() {
        return;
    }
    let clean = text.replace('\n', " ").replace('\r', "");
    insert_text(app, &clean);
}

/// Shift+letter arrives as either `Char('J')` or `Char('j')` with SHIFT
/// depending on the terminal; fold both to the uppercase char.
fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
    {
        key.code = KeyCode::Char(c.to_ascii_uppercase());
        key.modifiers.remove(KeyModifiers::SHIFT);
    }
    key
}

/// Queue `action`, parking it behind a y/n prompt if it is destructive
fn request(app: &mut App, action: Action) -> Vec<Effect> {
    match action.confirmation() {
        Some(prompt) => {
            app.confirm = Some(PendingConfirm { prompt, action });
            Vec::new()
        }
        None => vec![Effect::Perform(action)],
    }
}

#[cfg(test)]
pub(crate) mod test_keys {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    pub fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    pub fn ch(c: char) -> KeyEvent {
        key(KeyCode::Char(c))
    }

    pub fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}
