use serde::{Deserialize, Serialize};

use super::Gate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewType {
    Paper,
    Project,
}

impl ReviewType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewType::Paper => "paper",
            ReviewType::Project => "project",
        }
    }
}

/// A review as listed by `/api/reviews`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub review_type: ReviewType,
    /// Only meaningful for project reviews
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub method_family: Option<String>,
}

impl Review {
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => "Untitled Review",
        }
    }

    /// `paper` or `project (level)`; a level on a paper review is ignored
    pub fn type_label(&self) -> String {
        match (self.review_type, self.level.as_deref()) {
            (ReviewType::Project, Some(level)) if !level.is_empty() => {
                format!("project ({level})")
            }
            (t, _) => t.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub section_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub page_start: Option<u32>,
    #[serde(default)]
    pub page_end: Option<u32>,
    #[serde(default)]
    pub excerpt: Option<String>,
}

impl Section {
    pub fn page_range(&self) -> String {
        match (self.page_start, self.page_end) {
            (Some(a), Some(b)) if a != b => format!("pp. {a}-{b}"),
            (Some(a), _) | (None, Some(a)) => format!("p. {a}"),
            (None, None) => String::new(),
        }
    }
}

/// One piece of generated review output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub kind: String,
    pub content: String,
    #[serde(default)]
    pub slot: Option<u32>,
    #[serde(default)]
    pub persona: Option<String>,
}

/// `GET /api/reviews/{id}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReviewEnvelope {
    pub review: Review,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    #[serde(default)]
    pub gates: Vec<Gate>,
}

/// Body of `POST /api/reviews`. `level` is only sent for project reviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewCreateRequest {
    pub review_type: ReviewType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    pub title: Option<String>,
    pub domain: Option<String>,
    pub method_family: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReviewCreated {
    pub review_id: i64,
}

/// Body of `POST /api/reviews/{id}/run`
#[derive(Debug, Clone, Serialize)]
pub struct ReviewRunRequest {
    pub provider: String,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReviewRunResponse {
    pub review_id: i64,
    #[serde(default)]
    pub status: Option<String>,
}

const PERSONA_LABELS: &[(&str, &str)] = &[
    ("theory_positioning", "Theory & Positioning"),
    ("identification_design", "Identification & Design"),
    ("measurement_constructs", "Measurement & Constructs"),
    ("contribution_agenda", "Contribution & Agenda"),
    ("feasibility_clarity", "Feasibility & Clarity"),
    ("evidence_robustness", "Evidence & Robustness"),
];

/// Display label for a reviewer persona key; unknown keys are shown as-is
pub fn persona_label(key: &str) -> &str {
    PERSONA_LABELS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
        .unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persona_labels() {
        assert_eq!(persona_label("identification_design"), "Identification & Design");
        assert_eq!(persona_label("wildcard"), "wildcard");
    }

    #[test]
    fn level_only_shown_for_projects() {
        let mut r = Review {
            id: 1,
            review_type: ReviewType::Paper,
            level: Some("phd".into()),
            status: None,
            title: None,
            language: None,
            domain: None,
            method_family: None,
        };
        assert_eq!(r.type_label(), "paper");
        r.review_type = ReviewType::Project;
        assert_eq!(r.type_label(), "project (phd)");
    }

    #[test]
    fn page_ranges() {
        let s = |a, b| Section {
            section_id: "s1".into(),
            title: None,
            page_start: a,
            page_end: b,
            excerpt: None,
        };
        assert_eq!(s(Some(2), Some(5)).page_range(), "pp. 2-5");
        assert_eq!(s(Some(3), Some(3)).page_range(), "p. 3");
        assert_eq!(s(None, None).page_range(), "");
    }

    #[test]
    fn review_detail_carries_gates_and_excerpts() {
        let envelope: ReviewEnvelope = serde_json::from_str(
            r#"{
                "review": {"id": 9, "review_type": "project", "level": "mestrado"},
                "artifacts": [],
                "gates": [{"gate": 2, "status": "needs_revision", "notes": "thin sample"}],
                "sections": [{"section_id": "s1", "title": "Intro", "page_start": 1,
                              "page_end": 2, "excerpt": "We study tides."}]
            }"#,
        )
        .unwrap();
        assert_eq!(envelope.gates.len(), 1);
        assert_eq!(envelope.gates[0].notes.as_deref(), Some("thin sample"));
        assert_eq!(envelope.sections[0].excerpt.as_deref(), Some("We study tides."));
    }

    #[test]
    fn paper_create_request_omits_level() {
        let request = ReviewCreateRequest {
            review_type: ReviewType::Paper,
            level: None,
            title: Some("Draft".into()),
            domain: None,
            method_family: None,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["review_type"], "paper");
        assert!(body.get("level").is_none());
    }
}
