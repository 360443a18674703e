//! Remote entity gateway: typed calls against the research API.
//!
//! The gateway holds no state of its own. Every method is one
//! request/response; a failure aborts that call only.

pub mod error;
pub mod http;

use async_trait::async_trait;

pub use error::ApiError;
pub use http::{HttpGateway, HttpGatewayConfig};

use crate::model::{
    CleanupResult, CouncilRound, Gate, GateUpdate, Idea, IdeaEnvelope, LiteratureEnvelope,
    LiteratureQuery, LiteratureQueryRequest, LlmAssessmentRequest, ProviderInfo, QueryStarted,
    ResubmitRequest, ResubmitResponse, Review, ReviewCreateRequest, ReviewCreated, ReviewEnvelope,
    ReviewRunRequest, ReviewRunResponse, RoundDetail, Run, RunRequest, RunStarted, VersionDetail,
    VersionSummary,
};

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn providers(&self) -> Result<Vec<ProviderInfo>, ApiError>;

    // Collections
    async fn runs(&self) -> Result<Vec<Run>, ApiError>;
    async fn ideas(&self) -> Result<Vec<Idea>, ApiError>;
    async fn literature_queries(&self) -> Result<Vec<LiteratureQuery>, ApiError>;
    async fn reviews(&self) -> Result<Vec<Review>, ApiError>;

    // Idea detail
    async fn idea(&self, idea_id: i64) -> Result<IdeaEnvelope, ApiError>;
    async fn council_rounds(&self, idea_id: i64) -> Result<Vec<CouncilRound>, ApiError>;
    async fn council_round(&self, idea_id: i64, round_id: i64) -> Result<RoundDetail, ApiError>;
    async fn idea_versions(&self, idea_id: i64) -> Result<Vec<VersionSummary>, ApiError>;
    async fn idea_version(&self, idea_id: i64, version_id: &str)
    -> Result<VersionDetail, ApiError>;

    // Literature detail
    async fn literature_query(&self, query_id: i64) -> Result<LiteratureEnvelope, ApiError>;
    async fn local_pdfs(&self, query_id: i64) -> Result<Vec<String>, ApiError>;

    // Review detail
    async fn review(&self, review_id: i64) -> Result<ReviewEnvelope, ApiError>;

    // Mutations
    async fn save_gate(&self, idea_id: i64, gate: u32, update: &GateUpdate)
    -> Result<Gate, ApiError>;
    async fn resubmit_council(
        &self,
        idea_id: i64,
        request: &ResubmitRequest,
    ) -> Result<ResubmitResponse, ApiError>;
    async fn attach_pdf(&self, work_id: i64, filename: &str) -> Result<(), ApiError>;
    async fn detach_pdf(&self, work_id: i64) -> Result<(), ApiError>;
    async fn remove_work(&self, work_id: i64) -> Result<(), ApiError>;
    async fn delete_query(&self, query_id: i64) -> Result<(), ApiError>;
    /// Drop book and chapter results from a query
    async fn cleanup_query(&self, query_id: i64) -> Result<CleanupResult, ApiError>;
    async fn rebuild_synthesis(&self, query_id: i64) -> Result<(), ApiError>;
    async fn run_llm_assessment(
        &self,
        query_id: i64,
        request: &LlmAssessmentRequest,
    ) -> Result<(), ApiError>;
    async fn run_review(
        &self,
        review_id: i64,
        request: &ReviewRunRequest,
    ) -> Result<ReviewRunResponse, ApiError>;
    async fn create_review(&self, request: &ReviewCreateRequest)
    -> Result<ReviewCreated, ApiError>;
    async fn start_run(&self, request: &RunRequest) -> Result<RunStarted, ApiError>;
    async fn start_literature_query(
        &self,
        request: &LiteratureQueryRequest,
    ) -> Result<QueryStarted, ApiError>;
}
