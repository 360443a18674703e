use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::sync::EntityKind;
use crate::sync::actions::Action;
use crate::sync::forms::{FormId, ViewSurface};
use crate::sync::status::StatusScope;
use crate::tui::app::{App, Effect};
use crate::tui::surface::{AssessmentField, EditTarget};
use crate::util::unicode::pop_grapheme;

use super::request;

pub(super) fn handle_edit(app: &mut App, key: KeyEvent) -> Vec<Effect> {
    let Some(target) = app.surface.editing else {
        return Vec::new();
    };
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => {
            app.surface.editing = None;
            Vec::new()
        }
        KeyCode::Enter => {
            app.surface.editing = None;
            match target {
                EditTarget::Form { form, .. } => submit(app, form),
                _ => Vec::new(),
            }
        }
        KeyCode::Tab | KeyCode::Down => {
            app.surface.editing = Some(move_field(target, 1));
            Vec::new()
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.surface.editing = Some(move_field(target, -1));
            Vec::new()
        }
        KeyCode::Backspace => {
            if let Some(mut value) = current_value(app, target) {
                pop_grapheme(&mut value);
                write_value(app, target, value);
            }
            Vec::new()
        }
        // Ctrl+U: clear the field
        KeyCode::Char('u') if ctrl => {
            write_value(app, target, String::new());
            Vec::new()
        }
        KeyCode::Char(c) if !ctrl => {
            insert_text(app, &c.to_string());
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Append `text` to the field being edited
pub(super) fn insert_text(app: &mut App, text: &str) {
    let Some(target) = app.surface.editing else {
        return;
    };
    let Some(mut value) = current_value(app, target) else {
        return;
    };
    value.push_str(text);
    write_value(app, target, value);
}

fn move_field(target: EditTarget, delta: isize) -> EditTarget {
    match target {
        EditTarget::Form { form, field } => {
            let len = form.fields().len() as isize;
            let next = (field as isize + delta).rem_euclid(len) as usize;
            EditTarget::Form { form, field: next }
        }
        EditTarget::Assessment { field } => {
            let field = if delta > 0 {
                field.next()
            } else {
                // Three steps forward is one step back
                field.next().next().next()
            };
            EditTarget::Assessment { field }
        }
        EditTarget::GateNotes { .. } => target,
    }
}

fn current_value(app: &mut App, target: EditTarget) -> Option<String> {
    match target {
        EditTarget::Form { form, field } => {
            let spec = form.fields().get(field)?;
            app.surface.field_value(form, spec.name)
        }
        EditTarget::GateNotes { gate } => app
            .state
            .idea
            .ready_mut()?
            .gate_mut(gate)
            .map(|card| card.notes.clone()),
        EditTarget::Assessment { field } => {
            let query_id = app.state.selection.current(EntityKind::Literature)?;
            let settings = app.state.assessment_settings(query_id);
            Some(match field {
                AssessmentField::Provider => settings.provider.clone(),
                AssessmentField::Model => settings.model.clone(),
                AssessmentField::MaxDocs => number_text(settings.max_docs),
                AssessmentField::MaxTokens => number_text(settings.max_tokens_budget),
            })
        }
    }
}

fn write_value(app: &mut App, target: EditTarget, value: String) {
    match target {
        EditTarget::Form { form, field } => {
            let Some(spec) = form.fields().get(field) else {
                return;
            };
            if app.surface.set_field_value(form, spec.name, &value) {
                app.state.record_edit(form, spec.name, &value);
            }
        }
        EditTarget::GateNotes { gate } => {
            if let Some(card) = app
                .state
                .idea
                .ready_mut()
                .and_then(|view| view.gate_mut(gate))
            {
                card.notes = value;
            }
        }
        EditTarget::Assessment { field } => {
            let Some(query_id) = app.state.selection.current(EntityKind::Literature) else {
                return;
            };
            let settings = app.state.assessment_settings(query_id);
            match field {
                AssessmentField::Provider => settings.provider = value,
                AssessmentField::Model => settings.model = value,
                AssessmentField::MaxDocs => {
                    if let Some(n) = parse_number(&value) {
                        settings.max_docs = n;
                    }
                }
                AssessmentField::MaxTokens => {
                    if let Some(n) = parse_number(&value) {
                        settings.max_tokens_budget = n;
                    }
                }
            }
        }
    }
}

fn number_text(n: u32) -> String {
    if n == 0 { String::new() } else { n.to_string() }
}

/// Digits only; an empty field reads as zero
fn parse_number(s: &str) -> Option<u32> {
    if s.is_empty() {
        return Some(0);
    }
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn submit(app: &mut App, form: FormId) -> Vec<Effect> {
    match form {
        FormId::RunCreate => request(app, Action::SubmitRun),
        FormId::LiteratureQuery => request(app, Action::SubmitLiteratureQuery),
        FormId::ReviewCreate => request(app, Action::SubmitReview),
        FormId::ReviewRun => match app.state.selection.current(EntityKind::Review) {
            Some(review_id) => request(app, Action::RunReview { review_id }),
            None => {
                app.state
                    .status
                    .error(StatusScope::ReviewRun, "Select a review to run");
                Vec::new()
            }
        },
    }
}
