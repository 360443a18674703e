//! Keys that act on the open idea, literature query or review.

use crossterm::event::{KeyCode, KeyEvent};

use crate::sync::actions::Action;
use crate::sync::reconcile;
use crate::tui::app::{App, Effect, View, step};
use crate::tui::surface::{AssessmentField, EditTarget};

use super::request;

pub(super) fn handle_detail_key(app: &mut App, key: KeyEvent) -> Vec<Effect> {
    match app.view {
        View::Ideas => handle_idea_key(app, key),
        View::Literature => handle_literature_key(app, key),
        View::Reviews => handle_review_key(app, key),
        View::Runs => Vec::new(),
    }
}

fn handle_idea_key(app: &mut App, key: KeyEvent) -> Vec<Effect> {
    if key.code == KeyCode::Char('f') {
        let next = app.state.idea_filter.next();
        app.state.set_idea_filter(next);
        app.clamp_cursors();
        return Vec::new();
    }
    let Some(view) = app.state.idea.ready_mut() else {
        return Vec::new();
    };
    let idea_id = view.idea.id;
    let gate = view.gates.get(app.gate_cursor).map(|card| card.gate());

    match key.code {
        KeyCode::Char('g') => app.gate_cursor = step(app.gate_cursor, 1, view.gates.len()),
        KeyCode::Char('G') => app.gate_cursor = step(app.gate_cursor, -1, view.gates.len()),
        KeyCode::Char('s') => {
            if let Some(card) = view.gates.get_mut(app.gate_cursor) {
                card.status = card.status.next();
            }
        }
        KeyCode::Char('n') => {
            if let Some(gate) = gate {
                app.surface.editing = Some(EditTarget::GateNotes { gate });
            }
        }
        KeyCode::Char('w') => {
            if let Some(gate) = gate {
                return request(app, Action::SaveGate { idea_id, gate });
            }
        }
        KeyCode::Char('o') => {
            app.dossier_cursor = step(app.dossier_cursor, 1, view.dossier.len());
        }
        KeyCode::Char('O') => {
            app.dossier_cursor = step(app.dossier_cursor, -1, view.dossier.len());
        }
        KeyCode::Char('z') => view.toggle_dossier(app.dossier_cursor),
        // Rounds are newest first: ] goes back in time
        KeyCode::Char(']') | KeyCode::Char('[') => {
            let delta = if key.code == KeyCode::Char(']') { 1 } else { -1 };
            let current = view
                .round
                .and_then(|id| view.rounds.iter().position(|r| r.id == id))
                .unwrap_or(0);
            let next = step(current, delta, view.rounds.len());
            if let Some(round_id) = view.rounds.get(next).map(|r| r.id) {
                return reconcile::select_round(&mut app.state, round_id)
                    .map(Effect::Load)
                    .into_iter()
                    .collect();
            }
        }
        KeyCode::Char('v') => {
            let ids: Vec<String> = view.versions.iter().map(|v| v.id.clone()).collect();
            let current = view
                .version
                .as_deref()
                .and_then(|open| ids.iter().position(|id| id == open));
            // Past the last version the snapshot closes
            let target = match current {
                None => ids.first(),
                Some(i) if i + 1 < ids.len() => ids.get(i + 1),
                Some(i) => ids.get(i),
            };
            if let Some(version_id) = target.cloned() {
                return reconcile::select_version(&mut app.state, &version_id)
                    .map(Effect::Load)
                    .into_iter()
                    .collect();
            }
        }
        KeyCode::Char('R') => {
            return request(
                app,
                Action::ResubmitCouncil {
                    idea_id,
                    run_review: true,
                    apply_revisions: false,
                },
            );
        }
        KeyCode::Char('A') => {
            return request(
                app,
                Action::ResubmitCouncil {
                    idea_id,
                    run_review: true,
                    apply_revisions: true,
                },
            );
        }
        KeyCode::Char('S') => {
            return request(
                app,
                Action::ResubmitCouncil {
                    idea_id,
                    run_review: false,
                    apply_revisions: false,
                },
            );
        }
        _ => {}
    }
    Vec::new()
}

fn handle_literature_key(app: &mut App, key: KeyEvent) -> Vec<Effect> {
    let Some(view) = app.state.literature.ready() else {
        return Vec::new();
    };
    let query_id = view.query.id;
    let work_id = view.works.get(app.work_cursor).map(|w| w.work.id);
    let works = view.works.len();
    let pdfs = view.local_pdfs.len();
    let filename = view.local_pdfs.get(app.pdf_choice).cloned();

    let action = match key.code {
        KeyCode::Char('J') => {
            app.work_cursor = step(app.work_cursor, 1, works);
            None
        }
        KeyCode::Char('K') => {
            app.work_cursor = step(app.work_cursor, -1, works);
            None
        }
        KeyCode::Char('p') => {
            if pdfs > 0 {
                app.pdf_choice = (app.pdf_choice + 1) % pdfs;
            }
            None
        }
        KeyCode::Char('a') => work_id.map(|work_id| Action::AttachPdf {
            query_id,
            work_id,
            filename: filename.unwrap_or_default(),
        }),
        KeyCode::Char('x') => work_id.map(|work_id| Action::DetachPdf { query_id, work_id }),
        KeyCode::Char('D') => work_id.map(|work_id| Action::RemoveWork { query_id, work_id }),
        KeyCode::Char('X') => Some(Action::DeleteQuery { query_id }),
        KeyCode::Char('c') => Some(Action::CleanupQuery { query_id }),
        KeyCode::Char('b') => Some(Action::RebuildSynthesis { query_id }),
        KeyCode::Char('L') => Some(Action::RunAssessment { query_id }),
        KeyCode::Char('m') => {
            app.state.assessment_settings(query_id);
            app.surface.editing = Some(EditTarget::Assessment {
                field: AssessmentField::Provider,
            });
            None
        }
        _ => None,
    };
    match action {
        Some(action) => request(app, action),
        None => Vec::new(),
    }
}

fn handle_review_key(app: &mut App, key: KeyEvent) -> Vec<Effect> {
    let Some(review_id) = app.state.review.ready().map(|v| v.review.id) else {
        return Vec::new();
    };
    match key.code {
        KeyCode::Char('R') => request(app, Action::RunReview { review_id }),
        _ => Vec::new(),
    }
}
