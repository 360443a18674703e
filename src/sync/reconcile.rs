//! Detail loads and their merge into one view per entity kind.
//!
//! Loads are plain async functions over a [`Gateway`]; they never see
//! [`AppState`]. The result comes back as a [`DetailLoad`] carrying the
//! ticket stamped at dispatch, and [`apply_detail`] drops it unless the
//! selection still matches.

use indexmap::IndexMap;
use serde::Serialize;

use super::artifacts::{ArtifactGroup, group_artifacts};
use super::selection::{LoadTicket, SelectOutcome};
use super::status::{StatusBoard, StatusScope};
use super::{AppState, EntityKind, Pane};
use crate::api::{ApiError, Gateway};
use crate::model::{
    CouncilRound, DossierPart, Gate, GateStatus, GateUpdate, Idea, IdeaEnvelope, IdeaStatus,
    LiteratureEnvelope, LiteratureQuery, LlmAssessmentRequest, Memo, PdfStatus, Review,
    ReviewEnvelope, RoundDetail, Section, VersionDetail, VersionSummary, Work,
};

/// Dossier kinds shown collapsed until the user expands them
const COLLAPSED_KINDS: &[&str] = &["DESIGN", "DATA_PLAN", "POSITIONING"];

pub const DEFAULT_MAX_DOCS: u32 = 8;
pub const DEFAULT_MAX_TOKENS_BUDGET: u32 = 100_000;

// ---------------------------------------------------------------------------
// Idea

/// An editable gate. `saved` is the server copy; `status` and `notes` are
/// the card's working values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateCard {
    pub saved: Gate,
    pub status: GateStatus,
    pub notes: String,
}

impl GateCard {
    pub fn new(saved: Gate) -> Self {
        GateCard {
            status: saved.status,
            notes: saved.notes.clone().unwrap_or_default(),
            saved,
        }
    }

    pub fn gate(&self) -> u32 {
        self.saved.gate
    }

    /// Edited but not yet saved
    pub fn is_dirty(&self) -> bool {
        self.status != self.saved.status
            || self.notes != self.saved.notes.as_deref().unwrap_or_default()
    }

    pub fn update(&self) -> GateUpdate {
        let notes = self.notes.trim();
        GateUpdate {
            status: self.status,
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DossierView {
    pub kind: String,
    pub content: String,
    pub collapsed: bool,
}

impl DossierView {
    fn new(part: DossierPart) -> Self {
        let collapsed = COLLAPSED_KINDS
            .iter()
            .any(|k| k.eq_ignore_ascii_case(part.kind.trim()));
        DossierView {
            kind: part.kind,
            content: part.content,
            collapsed,
        }
    }
}

/// Everything fetched for one idea, in fetch order
#[derive(Debug, Clone)]
pub struct IdeaSnapshot {
    pub envelope: IdeaEnvelope,
    /// Most recent first
    pub rounds: Vec<CouncilRound>,
    pub versions: Vec<VersionSummary>,
    pub latest_round: Option<RoundDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdeaView {
    pub idea: Idea,
    /// Ascending by gate number
    pub gates: Vec<GateCard>,
    pub dossier: Vec<DossierView>,
    /// Memos embedded in the idea header, shown when there are no rounds
    pub header_memos: Vec<Memo>,
    pub rounds: Vec<CouncilRound>,
    /// Round whose memos are shown
    pub round: Option<i64>,
    pub memos: Vec<Memo>,
    pub memos_loading: bool,
    pub versions: Vec<VersionSummary>,
    pub version: Option<String>,
    pub version_detail: Option<VersionDetail>,
}

/// Keep one memo per referee; a repeated referee replaces the earlier memo
/// in its original position.
pub fn key_memos(memos: Vec<Memo>) -> Vec<Memo> {
    let mut by_referee: IndexMap<String, Memo> = IndexMap::new();
    for memo in memos {
        by_referee.insert(memo.referee.clone(), memo);
    }
    by_referee.into_values().collect()
}

pub fn sort_rounds(rounds: &mut [CouncilRound]) {
    rounds.sort_by(|a, b| b.round_number.cmp(&a.round_number));
}

impl IdeaView {
    /// Merge a fresh snapshot with the view it replaces. For the same idea,
    /// unsaved gate edits, dossier toggles, the chosen round and the open
    /// version survive.
    pub fn build(snapshot: IdeaSnapshot, previous: Option<&IdeaView>) -> IdeaView {
        let IdeaSnapshot {
            envelope,
            rounds,
            versions,
            latest_round,
        } = snapshot;
        let previous = previous.filter(|p| p.idea.id == envelope.idea.id);

        let mut gates: Vec<GateCard> = envelope.gates.into_iter().map(GateCard::new).collect();
        gates.sort_by_key(GateCard::gate);
        if let Some(prev) = previous {
            for card in &mut gates {
                if let Some(old) = prev
                    .gates
                    .iter()
                    .find(|c| c.gate() == card.gate() && c.is_dirty())
                {
                    card.status = old.status;
                    card.notes = old.notes.clone();
                }
            }
        }

        let mut dossier: Vec<DossierView> =
            envelope.dossier_parts.into_iter().map(DossierView::new).collect();
        if let Some(prev) = previous {
            for part in &mut dossier {
                if let Some(old) = prev.dossier.iter().find(|d| d.kind == part.kind) {
                    part.collapsed = old.collapsed;
                }
            }
        }

        let (mut round, mut memos) = match latest_round {
            Some(detail) => (Some(detail.round.id), key_memos(detail.memos)),
            None => (None, Vec::new()),
        };
        if let Some(prev) = previous {
            if let Some(r) = prev.round {
                if round != Some(r) && !prev.memos_loading && rounds.iter().any(|x| x.id == r) {
                    round = Some(r);
                    memos = prev.memos.clone();
                }
            }
        }

        let (version, version_detail) = match previous {
            Some(prev) => match &prev.version {
                Some(v) if versions.iter().any(|x| &x.id == v) => {
                    (Some(v.clone()), prev.version_detail.clone())
                }
                _ => (None, None),
            },
            None => (None, None),
        };

        IdeaView {
            idea: envelope.idea,
            gates,
            dossier,
            header_memos: key_memos(envelope.council_memos),
            rounds,
            round,
            memos,
            memos_loading: false,
            versions,
            version,
            version_detail,
        }
    }

    /// Memos to display: the chosen round's, or the header's when the idea
    /// has never been through a round
    pub fn shown_memos(&self) -> &[Memo] {
        if self.rounds.is_empty() {
            &self.header_memos
        } else {
            &self.memos
        }
    }

    pub fn gate_mut(&mut self, gate: u32) -> Option<&mut GateCard> {
        self.gates.iter_mut().find(|c| c.gate() == gate)
    }

    pub fn toggle_dossier(&mut self, index: usize) {
        if let Some(part) = self.dossier.get_mut(index) {
            part.collapsed = !part.collapsed;
        }
    }

    /// "Last resubmitted" timestamp for resubmitted ideas. The server lists
    /// versions newest first, but the latest timestamp wins regardless.
    pub fn last_resubmitted(&self) -> Option<&str> {
        if self.idea.status_class() != IdeaStatus::Resubmitted {
            return None;
        }
        self.versions
            .iter()
            .filter_map(|v| v.created_at.as_deref())
            .filter(|s| !s.is_empty())
            .max()
            .or(Some(self.idea.updated_at.as_str()).filter(|s| !s.is_empty()))
    }
}

/// Header, rounds, versions, then the latest round's memos
pub async fn load_idea(gateway: &dyn Gateway, idea_id: i64) -> Result<IdeaSnapshot, ApiError> {
    let envelope = gateway.idea(idea_id).await?;
    let mut rounds = gateway.council_rounds(idea_id).await?;
    sort_rounds(&mut rounds);
    let versions = gateway.idea_versions(idea_id).await?;
    let latest_round = match rounds.first() {
        Some(r) => Some(gateway.council_round(idea_id, r.id).await?),
        None => None,
    };
    Ok(IdeaSnapshot {
        envelope,
        rounds,
        versions,
        latest_round,
    })
}

// ---------------------------------------------------------------------------
// Literature

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PdfAction {
    Attach,
    Detach,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkView {
    pub work: Work,
    pub pdf: PdfStatus,
    /// Never both: a stored PDF can only be detached, and attaching needs
    /// local candidates
    pub pdf_action: Option<PdfAction>,
}

impl WorkView {
    fn new(work: Work, has_candidates: bool) -> Self {
        let pdf = PdfStatus::of(&work);
        let pdf_action = match pdf {
            PdfStatus::Ingested => Some(PdfAction::Detach),
            _ if has_candidates => Some(PdfAction::Attach),
            _ => None,
        };
        WorkView {
            work,
            pdf,
            pdf_action,
        }
    }

    pub fn byline(&self) -> String {
        let w = &self.work;
        let mut parts = Vec::new();
        if let Some(a) = w.authors.as_deref().filter(|s| !s.is_empty()) {
            parts.push(a.to_string());
        }
        if let Some(y) = w.year {
            parts.push(y.to_string());
        }
        if let Some(v) = w.venue.as_deref().filter(|s| !s.is_empty()) {
            parts.push(v.to_string());
        }
        parts.join(" · ")
    }
}

#[derive(Debug, Clone)]
pub struct LiteratureSnapshot {
    pub envelope: LiteratureEnvelope,
    pub local_pdfs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiteratureView {
    pub query: LiteratureQuery,
    pub works: Vec<WorkView>,
    pub synthesis: Option<String>,
    pub local_pdfs: Vec<String>,
}

impl LiteratureView {
    pub fn build(snapshot: LiteratureSnapshot) -> Self {
        let has_candidates = !snapshot.local_pdfs.is_empty();
        LiteratureView {
            query: snapshot.envelope.query,
            works: snapshot
                .envelope
                .works
                .into_iter()
                .map(|w| WorkView::new(w, has_candidates))
                .collect(),
            synthesis: snapshot
                .envelope
                .synthesis
                .filter(|s| !s.trim().is_empty()),
            local_pdfs: snapshot.local_pdfs,
        }
    }

    pub fn work(&self, work_id: i64) -> Option<&WorkView> {
        self.works.iter().find(|w| w.work.id == work_id)
    }
}

/// Query detail plus local PDF candidates. A failed candidate listing
/// degrades to no candidates.
pub async fn load_literature(
    gateway: &dyn Gateway,
    query_id: i64,
) -> Result<LiteratureSnapshot, ApiError> {
    let envelope = gateway.literature_query(query_id).await?;
    let local_pdfs = match gateway.local_pdfs(query_id).await {
        Ok(pdfs) => pdfs,
        Err(e) => {
            tracing::warn!(query_id, error = %e, "could not list local PDFs");
            Vec::new()
        }
    };
    Ok(LiteratureSnapshot {
        envelope,
        local_pdfs,
    })
}

/// LLM assessment inputs for one query, kept across re-renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentSettings {
    pub provider: String,
    pub model: String,
    pub max_docs: u32,
    pub max_tokens_budget: u32,
}

impl AssessmentSettings {
    pub fn seeded(provider: &str, model: &str) -> Self {
        AssessmentSettings {
            provider: provider.to_string(),
            model: model.to_string(),
            max_docs: DEFAULT_MAX_DOCS,
            max_tokens_budget: DEFAULT_MAX_TOKENS_BUDGET,
        }
    }

    pub fn request(&self) -> Option<LlmAssessmentRequest> {
        let provider = self.provider.trim();
        if provider.is_empty() {
            return None;
        }
        let model = self.model.trim();
        Some(LlmAssessmentRequest {
            provider: provider.to_string(),
            model: (!model.is_empty()).then(|| model.to_string()),
            max_docs: self.max_docs.max(1),
            max_tokens_budget: self.max_tokens_budget.max(1),
        })
    }
}

// ---------------------------------------------------------------------------
// Review

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewView {
    pub review: Review,
    /// Read-only gate results, ascending by gate number
    pub gates: Vec<Gate>,
    pub sections: Vec<Section>,
    pub groups: Vec<ArtifactGroup>,
}

impl ReviewView {
    pub fn build(envelope: ReviewEnvelope) -> Self {
        let mut gates = envelope.gates;
        gates.sort_by_key(|g| g.gate);
        ReviewView {
            groups: group_artifacts(&envelope.artifacts),
            review: envelope.review,
            gates,
            sections: envelope.sections,
        }
    }
}

pub async fn load_review(gateway: &dyn Gateway, review_id: i64) -> Result<ReviewEnvelope, ApiError> {
    gateway.review(review_id).await
}

// ---------------------------------------------------------------------------
// Dispatch and apply

/// A load to run, stamped at dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailRequest {
    Entity(LoadTicket),
    Round { ticket: LoadTicket, round_id: i64 },
    Version { ticket: LoadTicket, version_id: String },
}

/// A finished load, still carrying its dispatch stamp
#[derive(Debug)]
pub enum DetailLoad {
    Idea {
        ticket: LoadTicket,
        result: Result<IdeaSnapshot, ApiError>,
    },
    Literature {
        ticket: LoadTicket,
        result: Result<LiteratureSnapshot, ApiError>,
    },
    Review {
        ticket: LoadTicket,
        result: Result<ReviewEnvelope, ApiError>,
    },
    Round {
        ticket: LoadTicket,
        round_id: i64,
        result: Result<RoundDetail, ApiError>,
    },
    Version {
        ticket: LoadTicket,
        version_id: String,
        result: Result<VersionDetail, ApiError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Applied,
    /// Superseded by a newer selection; dropped
    Stale,
    Failed,
}

pub async fn fetch_detail(gateway: &dyn Gateway, request: DetailRequest) -> DetailLoad {
    match request {
        DetailRequest::Entity(ticket) => match ticket.kind {
            EntityKind::Idea => DetailLoad::Idea {
                ticket,
                result: load_idea(gateway, ticket.id).await,
            },
            EntityKind::Literature => DetailLoad::Literature {
                ticket,
                result: load_literature(gateway, ticket.id).await,
            },
            EntityKind::Review => DetailLoad::Review {
                ticket,
                result: load_review(gateway, ticket.id).await,
            },
        },
        DetailRequest::Round { ticket, round_id } => DetailLoad::Round {
            ticket,
            round_id,
            result: gateway.council_round(ticket.id, round_id).await,
        },
        DetailRequest::Version { ticket, version_id } => {
            let result = gateway.idea_version(ticket.id, &version_id).await;
            DetailLoad::Version {
                ticket,
                version_id,
                result,
            }
        }
    }
}

/// Select `id`, or close it if it is already open. Returns the load to
/// dispatch when a pane opens.
pub fn select(state: &mut AppState, kind: EntityKind, id: i64) -> Option<DetailRequest> {
    let outcome = state.selection.select(kind, id);
    state.rerender_lists();
    match outcome {
        SelectOutcome::Opened(ticket) => {
            match kind {
                EntityKind::Idea => state.idea = Pane::Loading(id),
                EntityKind::Literature => state.literature = Pane::Loading(id),
                EntityKind::Review => state.review = Pane::Loading(id),
            }
            Some(DetailRequest::Entity(ticket))
        }
        SelectOutcome::Closed => {
            state.close(kind);
            None
        }
    }
}

/// Show another round's memos for the open idea
pub fn select_round(state: &mut AppState, round_id: i64) -> Option<DetailRequest> {
    let ticket = state.selection.ticket(EntityKind::Idea)?;
    let view = state.idea.ready_mut().filter(|v| v.idea.id == ticket.id)?;
    if view.round == Some(round_id) || !view.rounds.iter().any(|r| r.id == round_id) {
        return None;
    }
    view.round = Some(round_id);
    view.memos_loading = true;
    Some(DetailRequest::Round { ticket, round_id })
}

/// Open a version snapshot of the open idea; choosing the open one closes it
pub fn select_version(state: &mut AppState, version_id: &str) -> Option<DetailRequest> {
    let ticket = state.selection.ticket(EntityKind::Idea)?;
    let view = state.idea.ready_mut().filter(|v| v.idea.id == ticket.id)?;
    if view.version.as_deref() == Some(version_id) {
        view.version = None;
        view.version_detail = None;
        return None;
    }
    view.version = Some(version_id.to_string());
    view.version_detail = None;
    Some(DetailRequest::Version {
        ticket,
        version_id: version_id.to_string(),
    })
}

fn stale(ticket: &LoadTicket) -> Applied {
    tracing::debug!(kind = ?ticket.kind, id = ticket.id, "discarding stale detail load");
    Applied::Stale
}

/// Record a failed entity load. A pane already showing this entity keeps
/// its content; otherwise the pane shows the error.
fn entity_failed<T: HasEntityId>(
    pane: &mut Pane<T>,
    status: &mut StatusBoard,
    ticket: LoadTicket,
    e: ApiError,
) {
    let message = format!("Could not load {}: {e}", ticket.kind.label());
    tracing::warn!(kind = ?ticket.kind, id = ticket.id, error = %e, "detail load failed");
    let showing = matches!(pane, Pane::Ready(view) if view.entity_id() == ticket.id);
    if showing {
        status.error(StatusScope::Detail(ticket.kind), message);
    } else {
        *pane = Pane::Failed(message);
    }
}

trait HasEntityId {
    fn entity_id(&self) -> i64;
}

impl HasEntityId for IdeaView {
    fn entity_id(&self) -> i64 {
        self.idea.id
    }
}

impl HasEntityId for LiteratureView {
    fn entity_id(&self) -> i64 {
        self.query.id
    }
}

impl HasEntityId for ReviewView {
    fn entity_id(&self) -> i64 {
        self.review.id
    }
}

/// Apply a finished load if its stamp is still current
pub fn apply_detail(state: &mut AppState, load: DetailLoad) -> Applied {
    match load {
        DetailLoad::Idea { ticket, result } => {
            if !state.selection.accepts(&ticket) {
                return stale(&ticket);
            }
            match result {
                Ok(snapshot) => {
                    let view = IdeaView::build(snapshot, state.idea.ready());
                    state.idea = Pane::Ready(view);
                    state.status.clear(StatusScope::Detail(EntityKind::Idea));
                    Applied::Applied
                }
                Err(e) => {
                    entity_failed(&mut state.idea, &mut state.status, ticket, e);
                    Applied::Failed
                }
            }
        }
        DetailLoad::Literature { ticket, result } => {
            if !state.selection.accepts(&ticket) {
                return stale(&ticket);
            }
            match result {
                Ok(snapshot) => {
                    state.literature = Pane::Ready(LiteratureView::build(snapshot));
                    state.status.clear(StatusScope::Detail(EntityKind::Literature));
                    Applied::Applied
                }
                Err(e) => {
                    entity_failed(&mut state.literature, &mut state.status, ticket, e);
                    Applied::Failed
                }
            }
        }
        DetailLoad::Review { ticket, result } => {
            if !state.selection.accepts(&ticket) {
                return stale(&ticket);
            }
            match result {
                Ok(envelope) => {
                    state.review = Pane::Ready(ReviewView::build(envelope));
                    state.status.clear(StatusScope::Detail(EntityKind::Review));
                    Applied::Applied
                }
                Err(e) => {
                    entity_failed(&mut state.review, &mut state.status, ticket, e);
                    Applied::Failed
                }
            }
        }
        DetailLoad::Round {
            ticket,
            round_id,
            result,
        } => {
            if !state.selection.accepts(&ticket) {
                return stale(&ticket);
            }
            let Some(view) = state
                .idea
                .ready_mut()
                .filter(|v| v.idea.id == ticket.id && v.round == Some(round_id))
            else {
                return stale(&ticket);
            };
            view.memos_loading = false;
            match result {
                Ok(detail) => {
                    view.memos = key_memos(detail.memos);
                    Applied::Applied
                }
                Err(e) => {
                    view.memos.clear();
                    state.status.error(
                        StatusScope::Detail(EntityKind::Idea),
                        format!("Could not load round: {e}"),
                    );
                    Applied::Failed
                }
            }
        }
        DetailLoad::Version {
            ticket,
            version_id,
            result,
        } => {
            if !state.selection.accepts(&ticket) {
                return stale(&ticket);
            }
            let Some(view) = state.idea.ready_mut().filter(|v| {
                v.idea.id == ticket.id && v.version.as_deref() == Some(version_id.as_str())
            }) else {
                return stale(&ticket);
            };
            match result {
                Ok(detail) => {
                    view.version_detail = Some(detail);
                    Applied::Applied
                }
                Err(e) => {
                    view.version = None;
                    state.status.error(
                        StatusScope::Detail(EntityKind::Idea),
                        format!("Could not load version {version_id}: {e}"),
                    );
                    Applied::Failed
                }
            }
        }
    }
}

/// Fetch and apply in one step, for callers without a task pool
pub async fn load_and_apply(
    state: &mut AppState,
    gateway: &dyn Gateway,
    request: DetailRequest,
) -> Applied {
    let load = fetch_detail(gateway, request).await;
    apply_detail(state, load)
}
