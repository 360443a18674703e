use serde::Serialize;

use crate::model::{Artifact, persona_label};

/// Known artifact kinds and their display labels, in render priority order
const KIND_PRIORITY: &[(&str, &str)] = &[
    ("referee_memo", "Referee Memo"),
    ("revision_checklist", "Revision Checklist"),
];

/// One reviewer's output: every artifact sharing a `(slot, persona)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactGroup {
    pub slot: u32,
    pub persona: Option<String>,
    pub entries: Vec<ArtifactEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactEntry {
    pub kind: String,
    pub label: String,
    pub body: String,
}

impl ArtifactGroup {
    pub fn title(&self) -> String {
        let persona = self
            .persona
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(persona_label);
        match (self.slot, persona) {
            (0, None) => "General".to_string(),
            (0, Some(p)) => p.to_string(),
            (slot, None) => format!("Reviewer {slot}"),
            (slot, Some(p)) => format!("Reviewer {slot}: {p}"),
        }
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.kind.as_str()).collect()
    }
}

/// Lower sorts first; unknown kinds share the last rank
pub fn kind_priority(kind: &str) -> usize {
    KIND_PRIORITY
        .iter()
        .position(|(k, _)| *k == kind)
        .unwrap_or(KIND_PRIORITY.len())
}

pub fn kind_label(kind: &str) -> String {
    if let Some((_, label)) = KIND_PRIORITY.iter().find(|(k, _)| *k == kind) {
        return (*label).to_string();
    }
    kind.split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase, `#` and `_` read as spaces, whitespace collapsed
fn normalize_heading(s: &str) -> String {
    s.chars()
        .map(|c| if c == '#' || c == '_' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Drop a leading heading that only repeats the artifact's kind.
///
/// The first non-blank line is removed when, normalized, it equals the
/// kind's label or the raw kind name. Blank lines right after it go too.
/// Anything else is returned unchanged.
pub fn strip_heading(content: &str, kind: &str) -> String {
    let mut lines = content.lines().skip_while(|l| l.trim().is_empty());
    let Some(first) = lines.next() else {
        return content.to_string();
    };
    let heading = normalize_heading(first);
    if heading.is_empty()
        || (heading != normalize_heading(&kind_label(kind)) && heading != normalize_heading(kind))
    {
        return content.to_string();
    }
    lines
        .skip_while(|l| l.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Group artifacts by reviewer and order them for display.
///
/// Groups appear by ascending slot (a missing slot counts as 0), ties kept
/// in first-seen order. Within a group, entries follow the kind priority
/// table, ties kept in fetch order.
pub fn group_artifacts(artifacts: &[Artifact]) -> Vec<ArtifactGroup> {
    let mut groups: Vec<ArtifactGroup> = Vec::new();
    for artifact in artifacts {
        let slot = artifact.slot.unwrap_or(0);
        let persona = artifact.persona.clone().filter(|p| !p.is_empty());
        let entry = ArtifactEntry {
            kind: artifact.kind.clone(),
            label: kind_label(&artifact.kind),
            body: strip_heading(&artifact.content, &artifact.kind),
        };
        match groups
            .iter_mut()
            .find(|g| g.slot == slot && g.persona == persona)
        {
            Some(group) => group.entries.push(entry),
            None => groups.push(ArtifactGroup {
                slot,
                persona,
                entries: vec![entry],
            }),
        }
    }
    // sort_by_key is stable
    groups.sort_by_key(|g| g.slot);
    for group in &mut groups {
        group.entries.sort_by_key(|e| kind_priority(&e.kind));
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn artifact(kind: &str, slot: Option<u32>, persona: Option<&str>, content: &str) -> Artifact {
        Artifact {
            kind: kind.into(),
            content: content.into(),
            slot,
            persona: persona.map(Into::into),
        }
    }

    #[test]
    fn groups_by_slot_then_kind_priority() {
        let groups = group_artifacts(&[
            artifact("revision_checklist", Some(1), None, "a"),
            artifact("referee_memo", Some(1), None, "b"),
            artifact("referee_memo", Some(2), None, "c"),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].slot, 1);
        assert_eq!(groups[0].kinds(), vec!["referee_memo", "revision_checklist"]);
        assert_eq!(groups[1].slot, 2);
        assert_eq!(groups[1].kinds(), vec!["referee_memo"]);
    }

    #[test]
    fn missing_slot_sorts_first() {
        let groups = group_artifacts(&[
            artifact("referee_memo", Some(3), None, ""),
            artifact("summary", None, None, ""),
        ]);
        assert_eq!(groups[0].slot, 0);
        assert_eq!(groups[0].title(), "General");
        assert_eq!(groups[1].title(), "Reviewer 3");
    }

    #[test]
    fn personas_split_groups_within_a_slot() {
        let groups = group_artifacts(&[
            artifact("referee_memo", Some(1), Some("theory_positioning"), ""),
            artifact("referee_memo", Some(1), Some("evidence_robustness"), ""),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].title(), "Reviewer 1: Theory & Positioning");
        assert_eq!(groups[1].title(), "Reviewer 1: Evidence & Robustness");
    }

    #[test]
    fn unknown_kinds_keep_fetch_order_after_known() {
        let groups = group_artifacts(&[
            artifact("zeta_notes", Some(1), None, ""),
            artifact("alpha_notes", Some(1), None, ""),
            artifact("referee_memo", Some(1), None, ""),
        ]);
        assert_eq!(groups[0].kinds(), vec!["referee_memo", "zeta_notes", "alpha_notes"]);
    }

    #[test]
    fn labels() {
        assert_eq!(kind_label("referee_memo"), "Referee Memo");
        assert_eq!(kind_label("section_notes"), "Section Notes");
    }

    #[test]
    fn strips_matching_heading() {
        assert_eq!(
            strip_heading("## Referee  memo\n\nThe paper argues.", "referee_memo"),
            "The paper argues."
        );
        assert_eq!(
            strip_heading("# revision_checklist\n- fix table 2", "revision_checklist"),
            "- fix table 2"
        );
    }

    #[test]
    fn keeps_non_matching_heading() {
        let content = "## Summary of concerns\nToo many.";
        assert_eq!(strip_heading(content, "referee_memo"), content);
    }

    #[test]
    fn heading_only_content_becomes_empty() {
        assert_eq!(strip_heading("Referee Memo", "referee_memo"), "");
    }
}
