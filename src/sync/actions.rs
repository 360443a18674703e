//! Explicit mutations and form submits.
//!
//! An action runs in three steps. [`prepare`] reads its inputs from state,
//! [`Prepared::send`] talks to the gateway without touching state, and
//! [`finish`] applies the answer and reports under the action's own
//! [`StatusScope`]. The TUI spawns the middle step so a slow server never
//! blocks input; one-shot callers chain all three through [`perform`].
//! Nothing is patched optimistically; a successful action hands back the
//! ticket of the detail that must be re-fetched.

use super::forms::FormId;
use super::reconcile::DetailRequest;
use super::status::StatusScope;
use super::{AppState, EntityKind};
use crate::api::{ApiError, Gateway};
use crate::model::{
    Gate, GateUpdate, LiteratureQueryRequest, LlmAssessmentRequest, ResubmitRequest,
    ResubmitResponse, ReviewCreateRequest, ReviewRunRequest, ReviewRunResponse, ReviewType,
    RunRequest, default_model_for,
};

/// Asks the user to approve a destructive action
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Approves everything. Used once the user has already answered a prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct Approved;

impl Confirm for Approved {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SaveGate { idea_id: i64, gate: u32 },
    ResubmitCouncil { idea_id: i64, run_review: bool, apply_revisions: bool },
    AttachPdf { query_id: i64, work_id: i64, filename: String },
    DetachPdf { query_id: i64, work_id: i64 },
    RemoveWork { query_id: i64, work_id: i64 },
    DeleteQuery { query_id: i64 },
    CleanupQuery { query_id: i64 },
    RebuildSynthesis { query_id: i64 },
    RunAssessment { query_id: i64 },
    RunReview { review_id: i64 },
    SubmitRun,
    SubmitLiteratureQuery,
    SubmitReview,
}

impl Action {
    /// Prompt for actions that need confirmation
    pub fn confirmation(&self) -> Option<String> {
        match self {
            Action::DeleteQuery { query_id } => Some(format!(
                "Delete literature query #{query_id} and all its works?"
            )),
            Action::CleanupQuery { query_id } => Some(format!(
                "Remove all book and chapter results from query #{query_id}?"
            )),
            Action::RemoveWork { work_id, .. } => {
                Some(format!("Remove work #{work_id} from this query?"))
            }
            Action::DetachPdf { work_id, .. } => {
                Some(format!("Detach the stored PDF from work #{work_id}?"))
            }
            Action::ResubmitCouncil {
                idea_id,
                apply_revisions: true,
                ..
            } => Some(format!(
                "Apply council revisions and resubmit idea #{idea_id}?"
            )),
            Action::ResubmitCouncil { idea_id, .. } => {
                Some(format!("Resubmit idea #{idea_id} to the council?"))
            }
            Action::RunAssessment { query_id } => Some(format!(
                "Run an LLM assessment of query #{query_id}? This uses provider credits."
            )),
            _ => None,
        }
    }

    pub fn scope(&self) -> StatusScope {
        match self {
            Action::SaveGate { gate, .. } => StatusScope::Gate(*gate),
            Action::ResubmitCouncil { .. } => StatusScope::Resubmit,
            Action::AttachPdf { work_id, .. }
            | Action::DetachPdf { work_id, .. }
            | Action::RemoveWork { work_id, .. } => StatusScope::Work(*work_id),
            Action::DeleteQuery { .. }
            | Action::CleanupQuery { .. }
            | Action::RebuildSynthesis { .. } => StatusScope::Literature,
            Action::RunAssessment { .. } => StatusScope::Assessment,
            Action::RunReview { .. } => StatusScope::ReviewRun,
            Action::SubmitRun => StatusScope::RunCreate,
            Action::SubmitLiteratureQuery => StatusScope::LiteratureCreate,
            Action::SubmitReview => StatusScope::ReviewCreate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The user said no; nothing happened
    Declined,
    /// Succeeded. `reload` is the open detail to re-fetch, if any.
    Done { reload: Option<DetailRequest> },
    Failed(String),
}

/// Input that never reached the gateway, or a failed call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

fn invalid(msg: impl Into<String>) -> ActionError {
    ActionError::Invalid(msg.into())
}

/// Reload request for the open entity of `kind`, if it is `id`
fn reload_if_open(state: &AppState, kind: EntityKind, id: i64) -> Option<DetailRequest> {
    state
        .selection
        .ticket(kind)
        .filter(|t| t.id == id)
        .map(DetailRequest::Entity)
}

/// Run `action` to completion, asking `confirm` first when it is destructive
pub async fn perform(
    state: &mut AppState,
    gateway: &dyn Gateway,
    confirm: &mut dyn Confirm,
    action: Action,
) -> ActionOutcome {
    if let Some(prompt) = action.confirmation() {
        if !confirm.confirm(&prompt) {
            tracing::debug!(?action, "action declined");
            return ActionOutcome::Declined;
        }
    }
    let prepared = match prepare(state, &action) {
        Ok(prepared) => prepared,
        Err(error) => return reject(state, action.scope(), error),
    };
    let sent = prepared.send(gateway).await;
    finish(state, sent)
}

// ---------------------------------------------------------------------------
// Prepare

/// A gateway call with its inputs already read from state
#[derive(Debug, Clone)]
enum Call {
    SaveGate { idea_id: i64, gate: u32, update: GateUpdate },
    Resubmit { idea_id: i64, request: ResubmitRequest },
    AttachPdf { query_id: i64, work_id: i64, filename: String },
    DetachPdf { query_id: i64, work_id: i64 },
    RemoveWork { query_id: i64, work_id: i64 },
    DeleteQuery { query_id: i64 },
    CleanupQuery { query_id: i64 },
    RebuildSynthesis { query_id: i64 },
    Assessment { query_id: i64, request: LlmAssessmentRequest },
    Review { review_id: i64, request: ReviewRunRequest },
    CreateReview(ReviewCreateRequest),
    StartRun(RunRequest),
    StartQuery(LiteratureQueryRequest),
}

/// An action ready to send. Owns everything it needs, so it can move to
/// another task.
#[derive(Debug, Clone)]
pub struct Prepared {
    scope: StatusScope,
    call: Call,
}

/// Validate `action` against state and build its request
pub fn prepare(state: &mut AppState, action: &Action) -> Result<Prepared, ActionError> {
    tracing::info!(?action, "performing action");
    let call = match action.clone() {
        Action::SaveGate { idea_id, gate } => {
            let update = state
                .idea
                .ready()
                .filter(|v| v.idea.id == idea_id)
                .and_then(|v| v.gates.iter().find(|c| c.gate() == gate))
                .map(|c| c.update())
                .ok_or_else(|| invalid(format!("Gate {gate} is not open")))?;
            Call::SaveGate {
                idea_id,
                gate,
                update,
            }
        }
        Action::ResubmitCouncil {
            idea_id,
            run_review,
            apply_revisions,
        } => Call::Resubmit {
            idea_id,
            request: resubmit_request(state, run_review, apply_revisions),
        },
        Action::AttachPdf {
            query_id,
            work_id,
            filename,
        } => {
            let filename = filename.trim();
            if filename.is_empty() {
                return Err(invalid("Choose a local PDF to attach"));
            }
            Call::AttachPdf {
                query_id,
                work_id,
                filename: filename.to_string(),
            }
        }
        Action::DetachPdf { query_id, work_id } => Call::DetachPdf { query_id, work_id },
        Action::RemoveWork { query_id, work_id } => Call::RemoveWork { query_id, work_id },
        Action::DeleteQuery { query_id } => Call::DeleteQuery { query_id },
        Action::CleanupQuery { query_id } => Call::CleanupQuery { query_id },
        Action::RebuildSynthesis { query_id } => Call::RebuildSynthesis { query_id },
        Action::RunAssessment { query_id } => Call::Assessment {
            query_id,
            request: state
                .assessment_settings(query_id)
                .request()
                .ok_or_else(|| invalid("Choose a provider for the assessment"))?,
        },
        Action::RunReview { review_id } => Call::Review {
            review_id,
            request: review_run_request(state)?,
        },
        Action::SubmitRun => Call::StartRun(run_request(state)?),
        Action::SubmitLiteratureQuery => Call::StartQuery(literature_request(state)?),
        Action::SubmitReview => Call::CreateReview(review_request(state)?),
    };
    Ok(Prepared {
        scope: action.scope(),
        call,
    })
}

/// Report an action that failed before or during its call
pub fn reject(state: &mut AppState, scope: StatusScope, error: ActionError) -> ActionOutcome {
    let message = error.to_string();
    tracing::warn!(error = %message, ?scope, "action failed");
    state.status.error(scope, message.clone());
    ActionOutcome::Failed(message)
}

// ---------------------------------------------------------------------------
// Send

/// What the server confirmed, with the ids needed to apply it
#[derive(Debug, Clone)]
enum Landed {
    GateSaved { idea_id: i64, gate: u32, update: GateUpdate, saved: Gate },
    Resubmitted { idea_id: i64, response: ResubmitResponse },
    PdfAttached { query_id: i64, filename: String },
    PdfDetached { query_id: i64 },
    WorkRemoved { query_id: i64, work_id: i64 },
    QueryDeleted { query_id: i64 },
    QueryCleaned { query_id: i64, removed: u32 },
    SynthesisRebuilt { query_id: i64 },
    Assessed { query_id: i64, provider: String, model: Option<String> },
    ReviewStarted { review_id: i64, request: ReviewRunRequest, response: ReviewRunResponse },
    ReviewCreated { review_id: i64 },
    RunStarted { request: RunRequest, run_id: i64 },
    QueryStarted { query_id: i64 },
}

/// The gateway's answer to a [`Prepared`] action
#[derive(Debug, Clone)]
pub struct Sent {
    scope: StatusScope,
    result: Result<Landed, ApiError>,
}

impl Sent {
    pub fn scope(&self) -> StatusScope {
        self.scope
    }

    /// Whether a collection gained or lost an entry
    pub fn changes_collections(&self) -> bool {
        matches!(
            self.result,
            Ok(Landed::QueryDeleted { .. }
                | Landed::ReviewCreated { .. }
                | Landed::RunStarted { .. }
                | Landed::QueryStarted { .. })
        )
    }
}

impl Prepared {
    /// Make the gateway call. Reads no client state.
    pub async fn send(self, gateway: &dyn Gateway) -> Sent {
        Sent {
            scope: self.scope,
            result: call_gateway(gateway, self.call).await,
        }
    }
}

async fn call_gateway(gateway: &dyn Gateway, call: Call) -> Result<Landed, ApiError> {
    Ok(match call {
        Call::SaveGate {
            idea_id,
            gate,
            update,
        } => {
            let saved = gateway.save_gate(idea_id, gate, &update).await?;
            Landed::GateSaved {
                idea_id,
                gate,
                update,
                saved,
            }
        }
        Call::Resubmit { idea_id, request } => Landed::Resubmitted {
            idea_id,
            response: gateway.resubmit_council(idea_id, &request).await?,
        },
        Call::AttachPdf {
            query_id,
            work_id,
            filename,
        } => {
            gateway.attach_pdf(work_id, &filename).await?;
            Landed::PdfAttached { query_id, filename }
        }
        Call::DetachPdf { query_id, work_id } => {
            gateway.detach_pdf(work_id).await?;
            Landed::PdfDetached { query_id }
        }
        Call::RemoveWork { query_id, work_id } => {
            gateway.remove_work(work_id).await?;
            Landed::WorkRemoved { query_id, work_id }
        }
        Call::DeleteQuery { query_id } => {
            gateway.delete_query(query_id).await?;
            Landed::QueryDeleted { query_id }
        }
        Call::CleanupQuery { query_id } => Landed::QueryCleaned {
            query_id,
            removed: gateway.cleanup_query(query_id).await?.removed,
        },
        Call::RebuildSynthesis { query_id } => {
            gateway.rebuild_synthesis(query_id).await?;
            Landed::SynthesisRebuilt { query_id }
        }
        Call::Assessment { query_id, request } => {
            gateway.run_llm_assessment(query_id, &request).await?;
            Landed::Assessed {
                query_id,
                provider: request.provider,
                model: request.model,
            }
        }
        Call::Review { review_id, request } => {
            let response = gateway.run_review(review_id, &request).await?;
            Landed::ReviewStarted {
                review_id,
                request,
                response,
            }
        }
        Call::CreateReview(request) => Landed::ReviewCreated {
            review_id: gateway.create_review(&request).await?.review_id,
        },
        Call::StartRun(request) => {
            let run_id = gateway.start_run(&request).await?.run_id;
            Landed::RunStarted { request, run_id }
        }
        Call::StartQuery(request) => Landed::QueryStarted {
            query_id: gateway.start_literature_query(&request).await?.query_id,
        },
    })
}

// ---------------------------------------------------------------------------
// Finish

/// Apply a gateway answer to state and report it
pub fn finish(state: &mut AppState, sent: Sent) -> ActionOutcome {
    let landed = match sent.result {
        Ok(landed) => landed,
        Err(error) => return reject(state, sent.scope, error.into()),
    };
    let (message, reload) = match landed {
        Landed::GateSaved {
            idea_id,
            gate,
            update,
            saved,
        } => {
            // The idea may have been closed or replaced while the save was in flight
            if let Some(card) = state
                .idea
                .ready_mut()
                .filter(|v| v.idea.id == idea_id)
                .and_then(|v| v.gate_mut(gate))
            {
                card.saved = saved;
                if card.update() == update {
                    card.status = card.saved.status;
                    card.notes = card.saved.notes.clone().unwrap_or_default();
                }
            }
            (format!("Gate {gate} saved"), None)
        }
        Landed::Resubmitted { idea_id, response } => {
            let message = if response.review_ran {
                format!("Resubmitted as version {} and re-reviewed", response.version_id)
            } else {
                format!("Resubmitted as version {}", response.version_id)
            };
            (message, reload_if_open(state, EntityKind::Idea, idea_id))
        }
        Landed::PdfAttached { query_id, filename } => (
            format!("Attached {filename}"),
            reload_if_open(state, EntityKind::Literature, query_id),
        ),
        Landed::PdfDetached { query_id } => (
            "PDF detached".to_string(),
            reload_if_open(state, EntityKind::Literature, query_id),
        ),
        Landed::WorkRemoved { query_id, work_id } => (
            format!("Work #{work_id} removed"),
            reload_if_open(state, EntityKind::Literature, query_id),
        ),
        Landed::QueryDeleted { query_id } => {
            state.collections.queries.retain(|q| q.id != query_id);
            state.assessment.remove(&query_id);
            if state.selection.current(EntityKind::Literature) == Some(query_id) {
                state.close(EntityKind::Literature);
            } else {
                state.rerender_lists();
            }
            (format!("Literature query #{query_id} deleted"), None)
        }
        Landed::QueryCleaned { query_id, removed } => (
            match removed {
                1 => "Removed 1 book or chapter result".to_string(),
                n => format!("Removed {n} book and chapter results"),
            },
            reload_if_open(state, EntityKind::Literature, query_id),
        ),
        Landed::SynthesisRebuilt { query_id } => (
            "Synthesis rebuilt".to_string(),
            reload_if_open(state, EntityKind::Literature, query_id),
        ),
        Landed::Assessed {
            query_id,
            provider,
            model,
        } => {
            state.remember_llm(&provider, model.as_deref().unwrap_or_default());
            (
                "LLM assessment complete".to_string(),
                reload_if_open(state, EntityKind::Literature, query_id),
            )
        }
        Landed::ReviewStarted {
            review_id,
            request,
            response,
        } => {
            state.remember_llm(&request.provider, request.model.as_deref().unwrap_or_default());
            let status = response.status.as_deref().unwrap_or("started");
            (
                format!("Review #{} {status}", response.review_id),
                reload_if_open(state, EntityKind::Review, review_id),
            )
        }
        Landed::ReviewCreated { review_id } => (format!("Review created: #{review_id}"), None),
        Landed::RunStarted { request, run_id } => {
            state.remember_llm(&request.provider, request.model.as_deref().unwrap_or_default());
            (format!("Run started: #{run_id}"), None)
        }
        Landed::QueryStarted { query_id } => {
            (format!("Literature query started: #{query_id}"), None)
        }
    };
    state.status.info(sent.scope, message);
    ActionOutcome::Done { reload }
}

// ---------------------------------------------------------------------------
// Request builders

/// Resubmit body. The council provider and model only travel with a
/// re-review; without one the server picks nothing.
pub fn resubmit_request(
    state: &AppState,
    run_review: bool,
    apply_revisions: bool,
) -> ResubmitRequest {
    let pref = &state.llm_preference;
    let (provider, model) = if run_review {
        let provider = Some(pref.provider.clone()).filter(|p| !p.is_empty());
        let model = Some(pref.model.clone()).filter(|m| !m.is_empty()).or_else(|| {
            provider
                .as_deref()
                .and_then(|p| default_model_for(&state.providers, p))
                .map(str::to_string)
        });
        (provider, model)
    } else {
        (None, None)
    };
    ResubmitRequest {
        run_review,
        apply_revisions,
        provider,
        model,
    }
}

/// Review run body from the review form's draft
pub fn review_run_request(state: &AppState) -> Result<ReviewRunRequest, ActionError> {
    let draft = state.forms.draft(FormId::ReviewRun);
    let provider = draft
        .non_empty("provider")
        .ok_or_else(|| invalid("Choose a provider for the review"))?
        .to_string();
    let model = draft
        .non_empty("model")
        .or_else(|| default_model_for(&state.providers, &provider))
        .map(str::to_string);
    Ok(ReviewRunRequest { provider, model })
}

/// New review from its form's draft. Project reviews need a level; paper
/// reviews never carry one.
pub fn review_request(state: &AppState) -> Result<ReviewCreateRequest, ActionError> {
    let draft = state.forms.draft(FormId::ReviewCreate);
    let review_type = match draft
        .non_empty("review_type")
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("paper") => ReviewType::Paper,
        Some("project") => ReviewType::Project,
        _ => return Err(invalid("Review type must be paper or project")),
    };
    let level = match review_type {
        ReviewType::Project => Some(
            draft
                .non_empty("level")
                .ok_or_else(|| invalid("Project reviews require a level"))?
                .to_string(),
        ),
        ReviewType::Paper => None,
    };
    let text = |field: &str| draft.non_empty(field).map(str::to_string);
    Ok(ReviewCreateRequest {
        review_type,
        level,
        title: text("title"),
        domain: text("domain"),
        method_family: text("method_family"),
    })
}

fn parse_positive(value: &str, what: &str) -> Result<u32, ActionError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid(format!("{what} must be a positive whole number"))),
    }
}

/// Build the run submission from the run form's draft
pub fn run_request(state: &AppState) -> Result<RunRequest, ActionError> {
    let draft = state.forms.draft(FormId::RunCreate);
    let provider = draft
        .non_empty("provider")
        .ok_or_else(|| invalid("Choose a provider"))?
        .to_string();
    let model = draft
        .non_empty("model")
        .or_else(|| default_model_for(&state.providers, &provider))
        .map(str::to_string);
    let idea_count = parse_positive(draft.get("idea_count"), "Idea count")?;
    let literature_query_id = match draft.non_empty("literature_query_id") {
        Some(raw) => Some(
            raw.trim_start_matches('#')
                .parse::<i64>()
                .map_err(|_| invalid("Literature query must be a query number"))?,
        ),
        None => None,
    };
    Ok(RunRequest {
        provider,
        model,
        idea_count,
        topic_focus: draft.non_empty("topic_focus").map(str::to_string),
        topic_exclude: draft.non_empty("topic_exclude").map(str::to_string),
        literature_query_id,
        use_assessment_seeds: draft.is_yes("use_assessment_seeds"),
    })
}

/// Build the literature query submission from its form's draft
pub fn literature_request(state: &AppState) -> Result<LiteratureQueryRequest, ActionError> {
    let draft = state.forms.draft(FormId::LiteratureQuery);
    let query = draft
        .non_empty("query")
        .ok_or_else(|| invalid("Enter a query"))?
        .to_string();
    let sources: Vec<String> = draft
        .get("sources")
        .split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if sources.is_empty() {
        return Err(invalid("Choose at least one source"));
    }
    Ok(LiteratureQueryRequest {
        query,
        sources,
        per_source_limit: parse_positive(draft.get("per_source_limit"), "Per-source limit")?,
        include_non_article: draft.is_yes("include_non_article"),
        openalex_email: draft.non_empty("openalex_email").map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::state::MemoryKvStore;
    use pretty_assertions::assert_eq;

    fn state() -> AppState {
        AppState::new(Box::new(MemoryKvStore::new()))
    }

    #[test]
    fn destructive_actions_need_confirmation() {
        assert!(Action::DeleteQuery { query_id: 1 }.confirmation().is_some());
        assert!(Action::CleanupQuery { query_id: 1 }.confirmation().is_some());
        assert!(
            Action::RemoveWork {
                query_id: 1,
                work_id: 2
            }
            .confirmation()
            .is_some()
        );
        assert!(Action::SaveGate { idea_id: 1, gate: 1 }.confirmation().is_none());
        assert!(Action::SubmitRun.confirmation().is_none());
    }

    #[test]
    fn run_request_from_draft() {
        let mut s = state();
        s.record_edit(FormId::RunCreate, "provider", "openai");
        s.record_edit(FormId::RunCreate, "idea_count", "3");
        s.record_edit(FormId::RunCreate, "topic_exclude", "crypto; sports");
        s.record_edit(FormId::RunCreate, "literature_query_id", "#12");
        s.record_edit(FormId::RunCreate, "use_assessment_seeds", "yes");
        let req = run_request(&s).unwrap();
        assert_eq!(req.provider, "openai");
        assert_eq!(req.model, None);
        assert_eq!(req.idea_count, 3);
        assert_eq!(req.topic_focus, None);
        assert_eq!(req.topic_exclude.as_deref(), Some("crypto; sports"));
        assert_eq!(req.literature_query_id, Some(12));
        assert!(req.use_assessment_seeds);
    }

    #[test]
    fn run_request_rejects_bad_count() {
        let mut s = state();
        s.record_edit(FormId::RunCreate, "provider", "openai");
        s.record_edit(FormId::RunCreate, "idea_count", "0");
        assert_eq!(
            run_request(&s).unwrap_err().to_string(),
            "Idea count must be a positive whole number"
        );
    }

    #[test]
    fn literature_request_uses_defaults() {
        let mut s = state();
        s.record_edit(FormId::LiteratureQuery, "query", "rent control");
        let req = literature_request(&s).unwrap();
        assert_eq!(req.sources, vec!["openalex", "crossref"]);
        assert_eq!(req.per_source_limit, 20);
        assert!(!req.include_non_article);
        assert_eq!(req.openalex_email, None);
    }

    #[test]
    fn literature_request_needs_query() {
        assert!(literature_request(&state()).is_err());
    }

    #[test]
    fn cleanup_prompt_names_what_it_removes() {
        let prompt = Action::CleanupQuery { query_id: 3 }.confirmation().unwrap();
        assert_eq!(prompt, "Remove all book and chapter results from query #3?");
    }

    #[test]
    fn resubmit_sends_the_council_model_only_with_a_review() {
        let mut s = state();
        s.remember_llm("anthropic", "claude-x");

        let plain = resubmit_request(&s, false, true);
        assert!(!plain.run_review);
        assert!(plain.apply_revisions);
        assert_eq!(plain.provider, None);
        assert_eq!(plain.model, None);

        let reviewed = resubmit_request(&s, true, false);
        assert_eq!(reviewed.provider.as_deref(), Some("anthropic"));
        assert_eq!(reviewed.model.as_deref(), Some("claude-x"));
    }

    #[test]
    fn applying_revisions_gets_its_own_prompt() {
        let apply = Action::ResubmitCouncil {
            idea_id: 5,
            run_review: true,
            apply_revisions: true,
        };
        assert_eq!(
            apply.confirmation().as_deref(),
            Some("Apply council revisions and resubmit idea #5?")
        );
    }

    #[test]
    fn paper_review_drops_level() {
        let mut s = state();
        s.record_edit(FormId::ReviewCreate, "level", "mestrado");
        s.record_edit(FormId::ReviewCreate, "title", " Sleep draft ");
        let req = review_request(&s).unwrap();
        assert_eq!(req.review_type, ReviewType::Paper);
        assert_eq!(req.level, None);
        assert_eq!(req.title.as_deref(), Some("Sleep draft"));
        assert_eq!(req.domain, None);
    }

    #[test]
    fn project_review_requires_level() {
        let mut s = state();
        s.record_edit(FormId::ReviewCreate, "review_type", "Project");
        assert_eq!(
            review_request(&s).unwrap_err().to_string(),
            "Project reviews require a level"
        );
        s.record_edit(FormId::ReviewCreate, "level", "IC");
        let req = review_request(&s).unwrap();
        assert_eq!(req.review_type, ReviewType::Project);
        assert_eq!(req.level.as_deref(), Some("IC"));
    }

    #[test]
    fn unknown_review_type_is_rejected() {
        let mut s = state();
        s.record_edit(FormId::ReviewCreate, "review_type", "essay");
        assert!(review_request(&s).is_err());
    }

    #[test]
    fn invalid_input_fails_before_any_call() {
        let mut s = state();
        let err = prepare(&mut s, &Action::SaveGate { idea_id: 1, gate: 2 }).unwrap_err();
        assert_eq!(err.to_string(), "Gate 2 is not open");
        let outcome = reject(&mut s, StatusScope::Gate(2), err);
        assert_eq!(outcome, ActionOutcome::Failed("Gate 2 is not open".into()));
        assert_eq!(s.status.text(StatusScope::Gate(2)), Some("Gate 2 is not open"));
    }
}
