mod confirm;
pub use confirm::PromptConfirm;

use std::io::Write;

use serde::Serialize;

use crate::api::Gateway;
use crate::cli::CliError;
use crate::cli::commands::*;
use crate::cli::output::*;
use crate::model::IdeaFilter;
use crate::sync::actions::{self, Action, ActionOutcome, Approved, Confirm};
use crate::sync::forms::{FormId, ScrollPosition, ViewSurface};
use crate::sync::reconcile;
use crate::sync::refresh::{self, CollectionKind, TickOutcome};
use crate::sync::status::StatusScope;
use crate::sync::{AppState, EntityKind, Pane};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run one command to completion on a private runtime, writing to stdout
pub fn dispatch(
    command: Commands,
    json: bool,
    gateway: &dyn Gateway,
    state: &mut AppState,
) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let mut stdout = std::io::stdout().lock();
    let mut prompt = PromptConfirm::stdin();
    runtime.block_on(execute(command, json, gateway, state, &mut prompt, &mut stdout))
}

/// Run one command. `confirm` answers destructive prompts unless the
/// command carries `--yes`.
pub async fn execute(
    command: Commands,
    json: bool,
    gateway: &dyn Gateway,
    state: &mut AppState,
    confirm: &mut dyn Confirm,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Commands::Runs => cmd_list(CollectionKind::Runs, json, gateway, state, out).await,
        Commands::Ideas(args) => {
            let filter =
                IdeaFilter::parse(&args.filter).ok_or_else(|| CliError::BadFilter(args.filter))?;
            state.set_idea_filter(filter);
            cmd_list(CollectionKind::Ideas, json, gateway, state, out).await
        }
        Commands::Queries => {
            cmd_list(CollectionKind::LiteratureQueries, json, gateway, state, out).await
        }
        Commands::Reviews => cmd_list(CollectionKind::Reviews, json, gateway, state, out).await,
        Commands::Providers => cmd_providers(json, gateway, out).await,
        Commands::Idea(args) => cmd_show(EntityKind::Idea, args.id, json, gateway, state, out).await,
        Commands::Query(args) => {
            cmd_show(EntityKind::Literature, args.id, json, gateway, state, out).await
        }
        Commands::Review(args) => {
            cmd_show(EntityKind::Review, args.id, json, gateway, state, out).await
        }
        Commands::DeleteQuery(args) => {
            let action = Action::DeleteQuery { query_id: args.id };
            cmd_destructive(action, args.yes, json, gateway, state, confirm, out).await
        }
        Commands::CleanupQuery(args) => {
            let action = Action::CleanupQuery { query_id: args.id };
            cmd_destructive(action, args.yes, json, gateway, state, confirm, out).await
        }
    }
}

/// Stand-in view for one-shot commands: no fields, never focused
struct Headless;

impl ViewSurface for Headless {
    fn has_form_focus(&self) -> bool {
        false
    }

    fn field_value(&self, _form: FormId, _field: &str) -> Option<String> {
        None
    }

    fn set_field_value(&mut self, _form: FormId, _field: &str, _value: &str) -> bool {
        false
    }

    fn scroll_position(&self) -> ScrollPosition {
        0
    }

    fn set_scroll_position(&mut self, _position: ScrollPosition) {}
}

fn emit_lines(out: &mut dyn Write, lines: &[String]) -> Result<(), CliError> {
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

fn emit_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<(), CliError> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

async fn cmd_list(
    kind: CollectionKind,
    json: bool,
    gateway: &dyn Gateway,
    state: &mut AppState,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let outcome = refresh::run_tick(state, &mut Headless, gateway).await;
    if let TickOutcome::Completed { failed, .. } = &outcome
        && failed.contains(&kind)
    {
        let message = state
            .status
            .text(StatusScope::Refresh(kind))
            .unwrap_or("refresh failed")
            .to_string();
        return Err(CliError::Failed(message));
    }

    if json {
        let filter = state.idea_filter;
        let c = &state.collections;
        return match kind {
            CollectionKind::Runs => emit_json(out, &c.runs),
            CollectionKind::Ideas => {
                let ideas: Vec<_> = c.ideas.iter().filter(|i| filter.matches(i)).collect();
                emit_json(out, &ideas)
            }
            CollectionKind::LiteratureQueries => emit_json(out, &c.queries),
            CollectionKind::Reviews => emit_json(out, &c.reviews),
        };
    }
    let rows = state.lists.get(kind);
    if rows.is_empty() {
        writeln!(out, "no {}", kind.label())?;
        return Ok(());
    }
    emit_lines(out, &format_rows(rows))
}

async fn cmd_providers(
    json: bool,
    gateway: &dyn Gateway,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let providers = gateway.providers().await?;
    if json {
        emit_json(out, &providers)
    } else {
        emit_lines(out, &format_providers(&providers))
    }
}

async fn cmd_show(
    kind: EntityKind,
    id: i64,
    json: bool,
    gateway: &dyn Gateway,
    state: &mut AppState,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    if let Some(request) = reconcile::select(state, kind, id) {
        reconcile::load_and_apply(state, gateway, request).await;
    }

    fn ready<T>(pane: &Pane<T>, kind: EntityKind, id: i64) -> Result<&T, CliError> {
        match pane {
            Pane::Ready(view) => Ok(view),
            Pane::Failed(message) => Err(CliError::Failed(message.clone())),
            _ => Err(CliError::Failed(format!("{} #{id} did not load", kind.label()))),
        }
    }

    match kind {
        EntityKind::Idea => {
            let view = ready(&state.idea, kind, id)?;
            if json {
                emit_json(out, view)
            } else {
                emit_lines(out, &format_idea(view))
            }
        }
        EntityKind::Literature => {
            let view = ready(&state.literature, kind, id)?;
            if json {
                emit_json(out, view)
            } else {
                emit_lines(out, &format_literature(view))
            }
        }
        EntityKind::Review => {
            let view = ready(&state.review, kind, id)?;
            if json {
                emit_json(out, view)
            } else {
                emit_lines(out, &format_review(view))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ActionJson<'a> {
    done: bool,
    message: &'a str,
}

async fn cmd_destructive(
    action: Action,
    yes: bool,
    json: bool,
    gateway: &dyn Gateway,
    state: &mut AppState,
    confirm: &mut dyn Confirm,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let outcome = if yes {
        actions::perform(state, gateway, &mut Approved, action).await
    } else {
        actions::perform(state, gateway, confirm, action).await
    };
    let message = match outcome {
        ActionOutcome::Declined => "cancelled".to_string(),
        ActionOutcome::Done { .. } => state
            .status
            .latest()
            .map(|(_, m)| m.text.clone())
            .unwrap_or_else(|| "done".to_string()),
        ActionOutcome::Failed(message) => return Err(CliError::Failed(message)),
    };
    let done = message != "cancelled";
    if json {
        emit_json(out, &ActionJson { done, message: &message })
    } else {
        writeln!(out, "{}", message)?;
        Ok(())
    }
}
