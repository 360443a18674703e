use serde::{Deserialize, Serialize};

/// A generation run as listed by `/api/runs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub id: i64,
    pub status: String,
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub idea_count: Option<u32>,
    #[serde(default)]
    pub topic_focus: Option<String>,
    /// Semicolon-delimited list of excluded topics
    #[serde(default)]
    pub topic_exclude: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

impl Run {
    /// Topics the run was steered toward, split on `;`
    pub fn included_topics(&self) -> Vec<String> {
        split_topics(self.topic_focus.as_deref())
    }

    /// Topics the run was steered away from, split on `;`
    pub fn excluded_topics(&self) -> Vec<String> {
        split_topics(self.topic_exclude.as_deref())
    }

    /// One-line topic summary for list rows
    pub fn topic_summary(&self) -> String {
        let included = self.included_topics();
        let excluded = self.excluded_topics();
        let mut out = if included.is_empty() {
            "No topic focus".to_string()
        } else {
            format!("Focus: {}", included.join(", "))
        };
        if !excluded.is_empty() {
            out.push_str(&format!(" | Excluding: {}", excluded.join(", ")));
        }
        out
    }
}

/// Split a delimited topic string and trim each entry.
///
/// There is no escaping: a topic that itself contains `;` is split in two.
pub fn split_topics(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Body of `POST /api/runs`
#[derive(Debug, Clone, Serialize)]
pub struct RunRequest {
    pub provider: String,
    pub model: Option<String>,
    pub idea_count: u32,
    pub topic_focus: Option<String>,
    pub topic_exclude: Option<String>,
    pub literature_query_id: Option<i64>,
    pub use_assessment_seeds: bool,
}

/// Response to a run submission
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunStarted {
    pub run_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(focus: Option<&str>, exclude: Option<&str>) -> Run {
        Run {
            id: 1,
            status: "completed".into(),
            provider: "openai".into(),
            model: "gpt".into(),
            idea_count: Some(2),
            topic_focus: focus.map(Into::into),
            topic_exclude: exclude.map(Into::into),
            created_at: "2025-01-01T00:00:00".into(),
        }
    }

    #[test]
    fn split_trims_and_drops_empty_entries() {
        assert_eq!(
            split_topics(Some(" migration ;; labor markets ; ")),
            vec!["migration", "labor markets"]
        );
        assert!(split_topics(None).is_empty());
        assert!(split_topics(Some(" ; ")).is_empty());
    }

    #[test]
    fn topic_summary_without_focus() {
        assert_eq!(run(None, None).topic_summary(), "No topic focus");
    }

    #[test]
    fn topic_summary_with_exclusions() {
        let r = run(Some("housing"), Some("crypto; sports"));
        assert_eq!(r.topic_summary(), "Focus: housing | Excluding: crypto, sports");
    }

    #[test]
    fn delimiter_inside_topic_splits() {
        let r = run(Some("war; peace"), None);
        assert_eq!(r.included_topics(), vec!["war", "peace"]);
    }
}
