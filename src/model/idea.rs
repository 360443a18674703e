use serde::{Deserialize, Serialize};

/// An idea as listed by `/api/ideas`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idea {
    pub id: i64,
    pub run_id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub lane_primary: Option<String>,
    #[serde(default)]
    pub breakthrough_type: Option<String>,
    #[serde(default)]
    pub big_claim: Option<String>,
    #[serde(default)]
    pub updated_at: String,
}

impl Idea {
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => "Untitled Idea",
        }
    }

    pub fn status_class(&self) -> IdeaStatus {
        IdeaStatus::classify(self.status.as_deref())
    }
}

/// Coarse idea status used for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdeaStatus {
    Unset,
    Resubmitted,
    Other,
}

impl IdeaStatus {
    pub fn classify(status: Option<&str>) -> IdeaStatus {
        match status.map(str::trim) {
            None | Some("") => IdeaStatus::Unset,
            Some("resubmitted") => IdeaStatus::Resubmitted,
            Some(_) => IdeaStatus::Other,
        }
    }
}

/// Status filter applied to the idea list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdeaFilter {
    #[default]
    All,
    Resubmitted,
    None,
    Other,
}

impl IdeaFilter {
    pub fn matches(self, idea: &Idea) -> bool {
        match self {
            IdeaFilter::All => true,
            IdeaFilter::Resubmitted => idea.status_class() == IdeaStatus::Resubmitted,
            IdeaFilter::None => idea.status_class() == IdeaStatus::Unset,
            IdeaFilter::Other => idea.status_class() == IdeaStatus::Other,
        }
    }

    pub fn next(self) -> IdeaFilter {
        match self {
            IdeaFilter::All => IdeaFilter::Resubmitted,
            IdeaFilter::Resubmitted => IdeaFilter::None,
            IdeaFilter::None => IdeaFilter::Other,
            IdeaFilter::Other => IdeaFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IdeaFilter::All => "all",
            IdeaFilter::Resubmitted => "resubmitted",
            IdeaFilter::None => "none",
            IdeaFilter::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<IdeaFilter> {
        match s {
            "all" => Some(IdeaFilter::All),
            "resubmitted" => Some(IdeaFilter::Resubmitted),
            "none" => Some(IdeaFilter::None),
            "other" => Some(IdeaFilter::Other),
            _ => None,
        }
    }
}

/// Outcome of a gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    Passed,
    Failed,
    NeedsRevision,
}

impl GateStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GateStatus::Passed => "passed",
            GateStatus::Failed => "failed",
            GateStatus::NeedsRevision => "needs_revision",
        }
    }

    /// Cycle order used by the gate card status selector
    pub fn next(self) -> GateStatus {
        match self {
            GateStatus::Passed => GateStatus::Failed,
            GateStatus::Failed => GateStatus::NeedsRevision,
            GateStatus::NeedsRevision => GateStatus::Passed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    pub gate: u32,
    pub status: GateStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Body of `PUT /api/ideas/{id}/gates/{gate}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateUpdate {
    pub status: GateStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DossierPart {
    pub kind: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memo {
    pub referee: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouncilRound {
    pub id: i64,
    pub round_number: u32,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

/// `GET /api/ideas/{id}/council/rounds/{round}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoundDetail {
    pub round: CouncilRound,
    #[serde(default)]
    pub memos: Vec<Memo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSummary {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl VersionSummary {
    pub fn display(&self) -> String {
        let mut out = self.id.clone();
        if let Some(label) = self.label.as_deref().filter(|l| !l.is_empty()) {
            out.push_str(&format!(" - {label}"));
        }
        if let Some(created) = self.created_at.as_deref().filter(|c| !c.is_empty()) {
            out.push_str(&format!(" ({created})"));
        }
        out
    }
}

/// `GET /api/ideas/{id}/versions/{version}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VersionDetail {
    pub id: String,
    #[serde(default)]
    pub metadata: Option<String>,
    #[serde(default)]
    pub dossier_parts: Vec<DossierPart>,
    #[serde(default)]
    pub council_memos: Vec<Memo>,
}

/// `GET /api/ideas/{id}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdeaEnvelope {
    pub idea: Idea,
    #[serde(default)]
    pub gates: Vec<Gate>,
    #[serde(default)]
    pub dossier_parts: Vec<DossierPart>,
    #[serde(default)]
    pub council_memos: Vec<Memo>,
}

/// Body of `POST /api/ideas/{id}/council/resubmit`
#[derive(Debug, Clone, Serialize)]
pub struct ResubmitRequest {
    pub run_review: bool,
    pub apply_revisions: bool,
    pub provider: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResubmitResponse {
    pub version_id: String,
    #[serde(default)]
    pub review_ran: bool,
}
