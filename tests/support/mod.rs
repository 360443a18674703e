//! Scripted gateway and view surface shared by the integration tests.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use council::api::{ApiError, Gateway};
use council::model::{
    CleanupResult, CouncilRound, Gate, GateUpdate, Idea, IdeaEnvelope, LiteratureEnvelope,
    LiteratureQuery, LiteratureQueryRequest, LlmAssessmentRequest, Memo, ProviderInfo,
    QueryStarted, ResubmitRequest, ResubmitResponse, Review, ReviewCreateRequest, ReviewCreated,
    ReviewEnvelope, ReviewRunRequest, ReviewRunResponse, ReviewType, RoundDetail, Run,
    RunRequest, RunStarted, VersionDetail, VersionSummary, Work,
};
use council::sync::forms::{FormId, ScrollPosition, ViewSurface};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn run(id: i64) -> Run {
    Run {
        id,
        status: "done".into(),
        provider: "openai".into(),
        model: "gpt-4o".into(),
        idea_count: Some(3),
        topic_focus: Some("memory; sleep".into()),
        topic_exclude: None,
        created_at: "2026-03-01T10:00:00".into(),
    }
}

pub fn idea(id: i64, title: &str, status: Option<&str>) -> Idea {
    Idea {
        id,
        run_id: 1,
        title: Some(title.into()),
        status: status.map(str::to_string),
        lane_primary: Some("neuro".into()),
        breakthrough_type: None,
        big_claim: Some("Tides shape recall.".into()),
        updated_at: "2026-03-02T09:00:00".into(),
    }
}

pub fn query(id: i64, text: &str) -> LiteratureQuery {
    LiteratureQuery {
        id,
        query: text.into(),
        sources: "openalex,crossref".into(),
        status: "done".into(),
        per_source_limit: Some(20),
        include_non_article: Some(false),
    }
}

pub fn work(id: i64, title: &str, pdf_path: Option<&str>) -> Work {
    Work {
        id,
        title: title.into(),
        authors: Some("Ada Lovelace".into()),
        year: Some(2021),
        venue: None,
        source: Some("openalex".into()),
        work_type: None,
        doi: None,
        pdf_path: pdf_path.map(str::to_string),
        open_access_url: None,
    }
}

pub fn book(id: i64, title: &str) -> Work {
    Work {
        work_type: Some("book-chapter".into()),
        ..work(id, title, None)
    }
}

pub fn memo(referee: &str, content: &str) -> Memo {
    Memo {
        referee: referee.into(),
        content: content.into(),
    }
}

pub fn round(id: i64, number: u32) -> CouncilRound {
    CouncilRound {
        id,
        round_number: number,
        status: Some("done".into()),
        notes: None,
        created_at: format!("2026-03-0{number}T12:00:00"),
    }
}

pub fn version(id: &str, created_at: &str) -> VersionSummary {
    VersionSummary {
        id: id.into(),
        label: None,
        created_at: Some(created_at.into()),
    }
}

pub fn review(id: i64, title: &str) -> Review {
    Review {
        id,
        review_type: ReviewType::Paper,
        level: None,
        status: Some("done".into()),
        title: Some(title.into()),
        language: None,
        domain: None,
        method_family: None,
    }
}

pub fn not_found() -> ApiError {
    ApiError::Http {
        status: 404,
        detail: "Not found".into(),
    }
}

pub fn unavailable() -> ApiError {
    ApiError::Http {
        status: 503,
        detail: "Service unavailable".into(),
    }
}

// ---------------------------------------------------------------------------
// FakeGateway
// ---------------------------------------------------------------------------

/// Server-side data the fake answers from
#[derive(Default)]
pub struct World {
    pub providers: Vec<ProviderInfo>,
    pub runs: Vec<Run>,
    pub ideas: Vec<Idea>,
    pub queries: Vec<LiteratureQuery>,
    pub reviews: Vec<Review>,
    pub idea_details: HashMap<i64, IdeaEnvelope>,
    pub rounds: HashMap<i64, Vec<CouncilRound>>,
    /// Memos keyed by round id
    pub round_memos: HashMap<i64, Vec<Memo>>,
    pub versions: HashMap<i64, Vec<VersionSummary>>,
    /// Snapshots keyed by version id
    pub version_details: HashMap<String, VersionDetail>,
    pub literature: HashMap<i64, LiteratureEnvelope>,
    pub local_pdfs: HashMap<i64, Vec<String>>,
    pub review_details: HashMap<i64, ReviewEnvelope>,
    /// Endpoint names that answer with a 503
    pub failing: HashSet<&'static str>,
    /// Every resubmit body received, oldest first
    pub resubmits: Vec<ResubmitRequest>,
}

/// In-memory gateway. Every call is recorded by endpoint name.
#[derive(Default)]
pub struct FakeGateway {
    pub world: Mutex<World>,
    calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn new(world: World) -> Self {
        FakeGateway {
            world: Mutex::new(world),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A small project: one run, two ideas, two queries, one review.
    /// Idea 5 has two council rounds and two versions; query 4 carries a
    /// book chapter next to its article.
    pub fn seeded() -> Self {
        let mut world = World {
            providers: vec![ProviderInfo {
                name: "openai".into(),
                default_model: Some("gpt-4o".into()),
            }],
            runs: vec![run(1)],
            ideas: vec![
                idea(5, "Tidal memory", Some("resubmitted")),
                idea(6, "Lunar sleep", None),
            ],
            queries: vec![query(3, "sleep spindles"), query(4, "tidal rhythms")],
            reviews: vec![review(9, "Sleep and recall")],
            ..World::default()
        };
        for (id, title, status) in [
            (5, "Tidal memory", Some("resubmitted")),
            (6, "Lunar sleep", None),
        ] {
            world.idea_details.insert(
                id,
                IdeaEnvelope {
                    idea: idea(id, title, status),
                    gates: Vec::new(),
                    dossier_parts: Vec::new(),
                    council_memos: Vec::new(),
                },
            );
        }
        world.rounds.insert(5, vec![round(10, 1), round(11, 2)]);
        world.round_memos.insert(10, vec![memo("methods", "First pass: weak design")]);
        world.round_memos.insert(11, vec![memo("methods", "Second pass: design fixed")]);
        world.versions.insert(
            5,
            vec![
                version("v2", "2026-03-05T09:00:00"),
                version("v1", "2026-03-01T09:00:00"),
            ],
        );
        for (id, metadata) in [("v1", "first draft"), ("v2", "after council")] {
            world.version_details.insert(
                id.to_string(),
                VersionDetail {
                    id: id.to_string(),
                    metadata: Some(metadata.into()),
                    dossier_parts: Vec::new(),
                    council_memos: Vec::new(),
                },
            );
        }
        for (id, title) in [(3, "Spindles and recall"), (4, "Tides in the cortex")] {
            world.literature.insert(
                id,
                LiteratureEnvelope {
                    query: query(id, &format!("query {id}")),
                    works: vec![work(id * 10, title, None)],
                    synthesis: Some(format!("Synthesis of {id}")),
                },
            );
            world.local_pdfs.insert(id, vec![format!("paper-{id}.pdf")]);
        }
        if let Some(envelope) = world.literature.get_mut(&4) {
            envelope.works.push(book(41, "Handbook of tides"));
        }
        world.review_details.insert(
            9,
            ReviewEnvelope {
                review: review(9, "Sleep and recall"),
                sections: Vec::new(),
                artifacts: Vec::new(),
                gates: Vec::new(),
            },
        );
        FakeGateway::new(world)
    }

    pub fn fail(&self, endpoint: &'static str) {
        self.world.lock().unwrap().failing.insert(endpoint);
    }

    pub fn recover(&self, endpoint: &'static str) {
        self.world.lock().unwrap().failing.remove(endpoint);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, endpoint: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == endpoint).count()
    }

    fn enter(&self, endpoint: &'static str) -> Result<std::sync::MutexGuard<'_, World>, ApiError> {
        self.calls.lock().unwrap().push(endpoint.to_string());
        let world = self.world.lock().unwrap();
        if world.failing.contains(endpoint) {
            return Err(unavailable());
        }
        Ok(world)
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn providers(&self) -> Result<Vec<ProviderInfo>, ApiError> {
        Ok(self.enter("providers")?.providers.clone())
    }

    async fn runs(&self) -> Result<Vec<Run>, ApiError> {
        Ok(self.enter("runs")?.runs.clone())
    }

    async fn ideas(&self) -> Result<Vec<Idea>, ApiError> {
        Ok(self.enter("ideas")?.ideas.clone())
    }

    async fn literature_queries(&self) -> Result<Vec<LiteratureQuery>, ApiError> {
        Ok(self.enter("literature_queries")?.queries.clone())
    }

    async fn reviews(&self) -> Result<Vec<Review>, ApiError> {
        Ok(self.enter("reviews")?.reviews.clone())
    }

    async fn idea(&self, idea_id: i64) -> Result<IdeaEnvelope, ApiError> {
        self.enter("idea")?
            .idea_details
            .get(&idea_id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn council_rounds(&self, idea_id: i64) -> Result<Vec<CouncilRound>, ApiError> {
        Ok(self
            .enter("council_rounds")?
            .rounds
            .get(&idea_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn council_round(&self, idea_id: i64, round_id: i64) -> Result<RoundDetail, ApiError> {
        let world = self.enter("council_round")?;
        let round = world
            .rounds
            .get(&idea_id)
            .and_then(|rounds| rounds.iter().find(|r| r.id == round_id))
            .cloned()
            .ok_or_else(not_found)?;
        Ok(RoundDetail {
            round,
            memos: world.round_memos.get(&round_id).cloned().unwrap_or_default(),
        })
    }

    async fn idea_versions(&self, idea_id: i64) -> Result<Vec<VersionSummary>, ApiError> {
        Ok(self
            .enter("idea_versions")?
            .versions
            .get(&idea_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn idea_version(
        &self,
        _idea_id: i64,
        version_id: &str,
    ) -> Result<VersionDetail, ApiError> {
        self.enter("idea_version")?
            .version_details
            .get(version_id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn literature_query(&self, query_id: i64) -> Result<LiteratureEnvelope, ApiError> {
        self.enter("literature_query")?
            .literature
            .get(&query_id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn local_pdfs(&self, query_id: i64) -> Result<Vec<String>, ApiError> {
        Ok(self
            .enter("local_pdfs")?
            .local_pdfs
            .get(&query_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn review(&self, review_id: i64) -> Result<ReviewEnvelope, ApiError> {
        self.enter("review")?
            .review_details
            .get(&review_id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn save_gate(
        &self,
        _idea_id: i64,
        gate: u32,
        update: &GateUpdate,
    ) -> Result<Gate, ApiError> {
        self.enter("save_gate")?;
        Ok(Gate {
            gate,
            status: update.status,
            notes: update.notes.clone(),
        })
    }

    async fn resubmit_council(
        &self,
        _idea_id: i64,
        request: &ResubmitRequest,
    ) -> Result<ResubmitResponse, ApiError> {
        self.enter("resubmit_council")?.resubmits.push(request.clone());
        Ok(ResubmitResponse {
            version_id: "v2".into(),
            review_ran: request.run_review,
        })
    }

    async fn attach_pdf(&self, _work_id: i64, _filename: &str) -> Result<(), ApiError> {
        self.enter("attach_pdf")?;
        Ok(())
    }

    async fn detach_pdf(&self, _work_id: i64) -> Result<(), ApiError> {
        self.enter("detach_pdf")?;
        Ok(())
    }

    async fn remove_work(&self, work_id: i64) -> Result<(), ApiError> {
        let mut world = self.enter("remove_work")?;
        for envelope in world.literature.values_mut() {
            envelope.works.retain(|w| w.id != work_id);
        }
        Ok(())
    }

    async fn delete_query(&self, query_id: i64) -> Result<(), ApiError> {
        let mut world = self.enter("delete_query")?;
        if !world.queries.iter().any(|q| q.id == query_id) {
            return Err(not_found());
        }
        world.queries.retain(|q| q.id != query_id);
        world.literature.remove(&query_id);
        Ok(())
    }

    async fn cleanup_query(&self, query_id: i64) -> Result<CleanupResult, ApiError> {
        const EXCLUDED: &[&str] = &["book", "book-chapter", "monograph"];
        let mut world = self.enter("cleanup_query")?;
        let envelope = world.literature.get_mut(&query_id).ok_or_else(not_found)?;
        let before = envelope.works.len();
        envelope
            .works
            .retain(|w| !w.work_type.as_deref().is_some_and(|t| EXCLUDED.contains(&t)));
        Ok(CleanupResult {
            removed: (before - envelope.works.len()) as u32,
        })
    }

    async fn rebuild_synthesis(&self, _query_id: i64) -> Result<(), ApiError> {
        self.enter("rebuild_synthesis")?;
        Ok(())
    }

    async fn run_llm_assessment(
        &self,
        _query_id: i64,
        _request: &LlmAssessmentRequest,
    ) -> Result<(), ApiError> {
        self.enter("run_llm_assessment")?;
        Ok(())
    }

    async fn run_review(
        &self,
        review_id: i64,
        _request: &ReviewRunRequest,
    ) -> Result<ReviewRunResponse, ApiError> {
        self.enter("run_review")?;
        Ok(ReviewRunResponse {
            review_id,
            status: Some("started".into()),
        })
    }

    async fn create_review(
        &self,
        request: &ReviewCreateRequest,
    ) -> Result<ReviewCreated, ApiError> {
        let mut world = self.enter("create_review")?;
        if request.review_type == ReviewType::Project && request.level.is_none() {
            return Err(ApiError::Http {
                status: 400,
                detail: "Project reviews require a level".into(),
            });
        }
        let id = world.reviews.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let created = Review {
            id,
            review_type: request.review_type,
            level: request.level.clone(),
            status: Some("new".into()),
            title: request.title.clone(),
            language: None,
            domain: request.domain.clone(),
            method_family: request.method_family.clone(),
        };
        world.reviews.push(created.clone());
        world.review_details.insert(
            id,
            ReviewEnvelope {
                review: created,
                sections: Vec::new(),
                artifacts: Vec::new(),
                gates: Vec::new(),
            },
        );
        Ok(ReviewCreated { review_id: id })
    }

    async fn start_run(&self, _request: &RunRequest) -> Result<RunStarted, ApiError> {
        self.enter("start_run")?;
        Ok(RunStarted { run_id: 2 })
    }

    async fn start_literature_query(
        &self,
        _request: &LiteratureQueryRequest,
    ) -> Result<QueryStarted, ApiError> {
        self.enter("start_literature_query")?;
        Ok(QueryStarted { query_id: 7 })
    }
}

// ---------------------------------------------------------------------------
// FakeSurface
// ---------------------------------------------------------------------------

/// A view whose fields exist only once `build` has been called for them
#[derive(Debug, Default)]
pub struct FakeSurface {
    pub fields: BTreeMap<(FormId, String), String>,
    pub focused: bool,
    pub scroll: ScrollPosition,
}

impl FakeSurface {
    pub fn new() -> Self {
        FakeSurface::default()
    }

    /// Build every field of `form`, blank
    pub fn build(&mut self, form: FormId) {
        for spec in form.fields() {
            self.fields.insert((form, spec.name.to_string()), String::new());
        }
    }

    /// Simulate typing into a built field
    pub fn type_into(&mut self, form: FormId, field: &str, value: &str) {
        self.fields.insert((form, field.to_string()), value.to_string());
    }

    pub fn get(&self, form: FormId, field: &str) -> Option<&str> {
        self.fields
            .get(&(form, field.to_string()))
            .map(String::as_str)
    }
}

impl ViewSurface for FakeSurface {
    fn has_form_focus(&self) -> bool {
        self.focused
    }

    fn field_value(&self, form: FormId, field: &str) -> Option<String> {
        self.get(form, field).map(str::to_string)
    }

    fn set_field_value(&mut self, form: FormId, field: &str, value: &str) -> bool {
        match self.fields.get_mut(&(form, field.to_string())) {
            Some(slot) => {
                *slot = value.to_string();
                true
            }
            None => false,
        }
    }

    fn scroll_position(&self) -> ScrollPosition {
        self.scroll
    }

    fn set_scroll_position(&mut self, position: ScrollPosition) {
        self.scroll = position;
    }
}
