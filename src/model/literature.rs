use serde::{Deserialize, Serialize};

/// A literature query as listed by `/api/literature/queries`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteratureQuery {
    pub id: i64,
    pub query: String,
    /// Comma- or semicolon-delimited source names
    #[serde(default)]
    pub sources: String,
    pub status: String,
    #[serde(default)]
    pub per_source_limit: Option<u32>,
    #[serde(default)]
    pub include_non_article: Option<bool>,
}

impl LiteratureQuery {
    pub fn source_list(&self) -> Vec<&str> {
        self.sources
            .split([',', ';'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Work {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub authors: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub work_type: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub pdf_path: Option<String>,
    #[serde(default)]
    pub open_access_url: Option<String>,
}

/// Where a work's full text stands, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PdfStatus {
    Ingested,
    OpenAccess,
    Missing,
}

impl PdfStatus {
    pub fn of(work: &Work) -> PdfStatus {
        if non_blank(work.pdf_path.as_deref()) {
            PdfStatus::Ingested
        } else if non_blank(work.open_access_url.as_deref()) {
            PdfStatus::OpenAccess
        } else {
            PdfStatus::Missing
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PdfStatus::Ingested => "PDF ingested",
            PdfStatus::OpenAccess => "OA link available",
            PdfStatus::Missing => "No PDF",
        }
    }
}

fn non_blank(s: Option<&str>) -> bool {
    s.is_some_and(|s| !s.trim().is_empty())
}

/// `GET /api/literature/queries/{id}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LiteratureEnvelope {
    pub query: LiteratureQuery,
    #[serde(default)]
    pub works: Vec<Work>,
    /// The query's synthesis text (served as `assessment`)
    #[serde(default, alias = "assessment")]
    pub synthesis: Option<String>,
}

/// Body of `POST /api/literature/queries`
#[derive(Debug, Clone, Serialize)]
pub struct LiteratureQueryRequest {
    pub query: String,
    pub sources: Vec<String>,
    pub per_source_limit: u32,
    pub include_non_article: bool,
    pub openalex_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryStarted {
    pub query_id: i64,
}

/// Reply of `POST /api/literature/queries/{id}/cleanup`
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct CleanupResult {
    #[serde(default)]
    pub removed: u32,
}

/// Body of `POST /api/literature/queries/{id}/assessment/llm`
#[derive(Debug, Clone, Serialize)]
pub struct LlmAssessmentRequest {
    pub provider: String,
    pub model: Option<String>,
    pub max_docs: u32,
    pub max_tokens_budget: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn work(pdf: Option<&str>, oa: Option<&str>) -> Work {
        Work {
            id: 7,
            title: "On Things".into(),
            authors: None,
            year: None,
            venue: None,
            source: None,
            work_type: None,
            doi: None,
            pdf_path: pdf.map(Into::into),
            open_access_url: oa.map(Into::into),
        }
    }

    #[test]
    fn stored_pdf_takes_priority_over_oa_url() {
        let w = work(Some("pdfs/7.pdf"), Some("https://oa.example/7"));
        assert_eq!(PdfStatus::of(&w).label(), "PDF ingested");
    }

    #[test]
    fn oa_url_without_pdf() {
        let w = work(None, Some("https://oa.example/7"));
        assert_eq!(PdfStatus::of(&w), PdfStatus::OpenAccess);
    }

    #[test]
    fn blank_values_count_as_missing() {
        let w = work(Some("  "), Some(""));
        assert_eq!(PdfStatus::of(&w).label(), "No PDF");
    }

    #[test]
    fn sources_accept_both_delimiters() {
        let q = LiteratureQuery {
            id: 1,
            query: "q".into(),
            sources: "openalex, crossref;semantic_scholar".into(),
            status: "done".into(),
            per_source_limit: None,
            include_non_article: None,
        };
        assert_eq!(q.source_list(), vec!["openalex", "crossref", "semantic_scholar"]);
    }

    #[test]
    fn synthesis_reads_assessment_field() {
        let env: LiteratureEnvelope = serde_json::from_str(
            r#"{"query":{"id":1,"query":"q","sources":"","status":"done"},"works":[],"assessment":"text"}"#,
        )
        .unwrap();
        assert_eq!(env.synthesis.as_deref(), Some("text"));
    }
}
