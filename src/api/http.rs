use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{ApiError, Gateway};
use crate::model::{
    CleanupResult, CouncilRound, Gate, GateUpdate, Idea, IdeaEnvelope, LiteratureEnvelope,
    LiteratureQuery, LiteratureQueryRequest, LlmAssessmentRequest, ProviderInfo, QueryStarted,
    ResubmitRequest, ResubmitResponse, Review, ReviewCreateRequest, ReviewCreated, ReviewEnvelope,
    ReviewRunRequest, ReviewRunResponse, RoundDetail, Run, RunRequest, RunStarted, VersionDetail,
    VersionSummary,
};

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// LLM-backed calls answer only when the model has finished
pub const DEFAULT_LLM_TIMEOUT_MS: u64 = 600_000;

#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Applies to assessment, review run and council resubmit
    pub llm_timeout_ms: u64,
}

impl HttpGatewayConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            llm_timeout_ms: DEFAULT_LLM_TIMEOUT_MS,
        }
    }
}

/// Which timeout a request runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Budget {
    Quick,
    Llm,
}

/// Gateway over the JSON HTTP API
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: String,
    timeout: Duration,
    llm_timeout: Duration,
    http: reqwest::Client,
}

impl HttpGateway {
    pub fn new(config: HttpGatewayConfig) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(&config.base_url)?;
        let timeout = Duration::from_millis(config.timeout_ms.max(250));
        Ok(Self {
            base_url,
            timeout,
            llm_timeout: Duration::from_millis(config.llm_timeout_ms).max(timeout),
            http: reqwest::Client::new(),
        })
    }

    fn timeout_for(&self, budget: Budget) -> Duration {
        match budget {
            Budget::Quick => self.timeout,
            Budget::Llm => self.llm_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> Option<String> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with('/') {
            Some(format!("{}{}", self.base_url, trimmed))
        } else {
            Some(format!("{}/{}", self.base_url, trimmed))
        }
    }

    #[must_use]
    pub fn idea_path(idea_id: i64) -> String {
        format!("/api/ideas/{idea_id}")
    }

    #[must_use]
    pub fn gate_path(idea_id: i64, gate: u32) -> String {
        format!("/api/ideas/{idea_id}/gates/{gate}")
    }

    #[must_use]
    pub fn council_rounds_path(idea_id: i64) -> String {
        format!("/api/ideas/{idea_id}/council/rounds")
    }

    #[must_use]
    pub fn council_round_path(idea_id: i64, round_id: i64) -> String {
        format!("/api/ideas/{idea_id}/council/rounds/{round_id}")
    }

    #[must_use]
    pub fn versions_path(idea_id: i64) -> String {
        format!("/api/ideas/{idea_id}/versions")
    }

    #[must_use]
    pub fn version_path(idea_id: i64, version_id: &str) -> String {
        format!("/api/ideas/{idea_id}/versions/{}", version_id.trim())
    }

    #[must_use]
    pub fn query_path(query_id: i64) -> String {
        format!("/api/literature/queries/{query_id}")
    }

    #[must_use]
    pub fn work_pdf_path(work_id: i64) -> String {
        format!("/api/literature/works/{work_id}/attach-pdf")
    }

    #[must_use]
    pub fn review_path(review_id: i64) -> String {
        format!("/api/reviews/{review_id}")
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .send(Method::GET, path, None::<&()>, Budget::Quick)
            .await?;
        decode_json_response(response).await
    }

    async fn send_json<Req, Res>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Req>,
        budget: Budget,
    ) -> Result<Res, ApiError>
    where
        Req: Serialize + ?Sized + Sync,
        Res: DeserializeOwned,
    {
        let response = self.send(method, path, payload, budget).await?;
        decode_json_response(response).await
    }

    /// Send a mutation whose response body carries nothing we keep
    async fn send_discard<Req>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Req>,
        budget: Budget,
    ) -> Result<(), ApiError>
    where
        Req: Serialize + ?Sized + Sync,
    {
        let response = self.send(method, path, payload, budget).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let bytes = response.bytes().await.map_err(|error| ApiError::Read {
            message: error.to_string(),
        })?;
        Err(ApiError::from_status(status.as_u16(), &bytes))
    }

    async fn send<Req>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Req>,
        budget: Budget,
    ) -> Result<reqwest::Response, ApiError>
    where
        Req: Serialize + ?Sized + Sync,
    {
        let url = self.endpoint(path).ok_or(ApiError::BaseUrlMissing)?;
        tracing::debug!(%method, %url, ?budget, "api request");
        let mut request = self
            .http
            .request(method, url.as_str())
            .timeout(self.timeout_for(budget));
        if let Some(body) = payload {
            request = request.json(body);
        }
        request.send().await.map_err(|error| ApiError::Request {
            message: error.to_string(),
        })
    }
}

fn normalize_base_url(base_url: &str) -> Result<String, ApiError> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BaseUrlMissing);
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

async fn decode_json_response<T>(response: reqwest::Response) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let bytes = response.bytes().await.map_err(|error| ApiError::Read {
        message: error.to_string(),
    })?;

    if !status.is_success() {
        return Err(ApiError::from_status(status.as_u16(), &bytes));
    }

    serde_json::from_slice::<T>(&bytes).map_err(|error| ApiError::Decode {
        message: error.to_string(),
    })
}

#[derive(Serialize)]
struct AttachPdfBody<'a> {
    filename: &'a str,
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn providers(&self) -> Result<Vec<ProviderInfo>, ApiError> {
        self.get_json("/api/providers").await
    }

    async fn runs(&self) -> Result<Vec<Run>, ApiError> {
        self.get_json("/api/runs").await
    }

    async fn ideas(&self) -> Result<Vec<Idea>, ApiError> {
        self.get_json("/api/ideas").await
    }

    async fn literature_queries(&self) -> Result<Vec<LiteratureQuery>, ApiError> {
        self.get_json("/api/literature/queries").await
    }

    async fn reviews(&self) -> Result<Vec<Review>, ApiError> {
        self.get_json("/api/reviews").await
    }

    async fn idea(&self, idea_id: i64) -> Result<IdeaEnvelope, ApiError> {
        self.get_json(&Self::idea_path(idea_id)).await
    }

    async fn council_rounds(&self, idea_id: i64) -> Result<Vec<CouncilRound>, ApiError> {
        self.get_json(&Self::council_rounds_path(idea_id)).await
    }

    async fn council_round(&self, idea_id: i64, round_id: i64) -> Result<RoundDetail, ApiError> {
        self.get_json(&Self::council_round_path(idea_id, round_id))
            .await
    }

    async fn idea_versions(&self, idea_id: i64) -> Result<Vec<VersionSummary>, ApiError> {
        self.get_json(&Self::versions_path(idea_id)).await
    }

    async fn idea_version(
        &self,
        idea_id: i64,
        version_id: &str,
    ) -> Result<VersionDetail, ApiError> {
        self.get_json(&Self::version_path(idea_id, version_id))
            .await
    }

    async fn literature_query(&self, query_id: i64) -> Result<LiteratureEnvelope, ApiError> {
        self.get_json(&Self::query_path(query_id)).await
    }

    async fn local_pdfs(&self, query_id: i64) -> Result<Vec<String>, ApiError> {
        self.get_json(&format!("{}/local-pdfs", Self::query_path(query_id)))
            .await
    }

    async fn review(&self, review_id: i64) -> Result<ReviewEnvelope, ApiError> {
        self.get_json(&Self::review_path(review_id)).await
    }

    async fn save_gate(
        &self,
        idea_id: i64,
        gate: u32,
        update: &GateUpdate,
    ) -> Result<Gate, ApiError> {
        self.send_json(
            Method::PUT,
            &Self::gate_path(idea_id, gate),
            Some(update),
            Budget::Quick,
        )
        .await
    }

    async fn resubmit_council(
        &self,
        idea_id: i64,
        request: &ResubmitRequest,
    ) -> Result<ResubmitResponse, ApiError> {
        let path = format!("{}/council/resubmit", Self::idea_path(idea_id));
        self.send_json(Method::POST, &path, Some(request), Budget::Llm)
            .await
    }

    async fn attach_pdf(&self, work_id: i64, filename: &str) -> Result<(), ApiError> {
        let body = AttachPdfBody { filename };
        self.send_discard(
            Method::POST,
            &Self::work_pdf_path(work_id),
            Some(&body),
            Budget::Quick,
        )
        .await
    }

    async fn detach_pdf(&self, work_id: i64) -> Result<(), ApiError> {
        self.send_discard(
            Method::DELETE,
            &Self::work_pdf_path(work_id),
            None::<&()>,
            Budget::Quick,
        )
        .await
    }

    async fn remove_work(&self, work_id: i64) -> Result<(), ApiError> {
        let path = format!("/api/literature/works/{work_id}");
        self.send_discard(Method::DELETE, &path, None::<&()>, Budget::Quick)
            .await
    }

    async fn delete_query(&self, query_id: i64) -> Result<(), ApiError> {
        self.send_discard(
            Method::DELETE,
            &Self::query_path(query_id),
            None::<&()>,
            Budget::Quick,
        )
        .await
    }

    async fn cleanup_query(&self, query_id: i64) -> Result<CleanupResult, ApiError> {
        let path = format!("{}/cleanup", Self::query_path(query_id));
        self.send_json(Method::POST, &path, None::<&()>, Budget::Quick)
            .await
    }

    async fn rebuild_synthesis(&self, query_id: i64) -> Result<(), ApiError> {
        let path = format!("{}/assessment", Self::query_path(query_id));
        self.send_discard(Method::POST, &path, None::<&()>, Budget::Quick)
            .await
    }

    async fn run_llm_assessment(
        &self,
        query_id: i64,
        request: &LlmAssessmentRequest,
    ) -> Result<(), ApiError> {
        let path = format!("{}/assessment/llm", Self::query_path(query_id));
        self.send_discard(Method::POST, &path, Some(request), Budget::Llm)
            .await
    }

    async fn run_review(
        &self,
        review_id: i64,
        request: &ReviewRunRequest,
    ) -> Result<ReviewRunResponse, ApiError> {
        let path = format!("{}/run", Self::review_path(review_id));
        self.send_json(Method::POST, &path, Some(request), Budget::Llm)
            .await
    }

    async fn create_review(
        &self,
        request: &ReviewCreateRequest,
    ) -> Result<ReviewCreated, ApiError> {
        self.send_json(Method::POST, "/api/reviews", Some(request), Budget::Quick)
            .await
    }

    async fn start_run(&self, request: &RunRequest) -> Result<RunStarted, ApiError> {
        self.send_json(Method::POST, "/api/runs", Some(request), Budget::Quick)
            .await
    }

    async fn start_literature_query(
        &self,
        request: &LiteratureQueryRequest,
    ) -> Result<QueryStarted, ApiError> {
        self.send_json(
            Method::POST,
            "/api/literature/queries",
            Some(request),
            Budget::Quick,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_builder_normalizes_paths() {
        let gateway = HttpGateway::new(HttpGatewayConfig::new("http://127.0.0.1:8000/"))
            .expect("gateway");

        assert_eq!(
            gateway.endpoint("/api/runs"),
            Some("http://127.0.0.1:8000/api/runs".to_string())
        );
        assert_eq!(
            gateway.endpoint("api/runs"),
            Some("http://127.0.0.1:8000/api/runs".to_string())
        );
        assert_eq!(gateway.endpoint("  "), None);
    }

    #[test]
    fn llm_calls_get_the_longer_timeout() {
        let mut config = HttpGatewayConfig::new("http://127.0.0.1:8000");
        config.timeout_ms = 5_000;
        config.llm_timeout_ms = 900_000;
        let gateway = HttpGateway::new(config).expect("gateway");
        assert_eq!(gateway.timeout_for(Budget::Quick), Duration::from_secs(5));
        assert_eq!(gateway.timeout_for(Budget::Llm), Duration::from_secs(900));
    }

    #[test]
    fn llm_timeout_never_undercuts_the_regular_one() {
        let mut config = HttpGatewayConfig::new("http://127.0.0.1:8000");
        config.timeout_ms = 30_000;
        config.llm_timeout_ms = 1_000;
        let gateway = HttpGateway::new(config).expect("gateway");
        assert_eq!(gateway.timeout_for(Budget::Llm), Duration::from_secs(30));
    }

    #[test]
    fn blank_base_url_is_rejected() {
        let err = HttpGateway::new(HttpGatewayConfig::new("  ")).unwrap_err();
        assert_eq!(err, ApiError::BaseUrlMissing);
    }

    #[test]
    fn path_helpers_are_deterministic() {
        assert_eq!(HttpGateway::gate_path(4, 2), "/api/ideas/4/gates/2");
        assert_eq!(
            HttpGateway::council_round_path(4, 9),
            "/api/ideas/4/council/rounds/9"
        );
        assert_eq!(HttpGateway::version_path(4, " v2 "), "/api/ideas/4/versions/v2");
        assert_eq!(
            HttpGateway::work_pdf_path(11),
            "/api/literature/works/11/attach-pdf"
        );
        assert_eq!(HttpGateway::review_path(3), "/api/reviews/3");
    }
}
