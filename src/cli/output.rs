use crate::model::ProviderInfo;
use crate::sync::artifacts::kind_label;
use crate::sync::reconcile::{IdeaView, LiteratureView, PdfAction, ReviewView};
use crate::sync::refresh::ListRow;

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format a list as `#id title` lines with the subtitle indented below
pub fn format_rows(rows: &[ListRow]) -> Vec<String> {
    let mut lines = Vec::new();
    for row in rows {
        lines.push(format!("#{} {}", row.id, row.title));
        if !row.subtitle.is_empty() {
            lines.push(format!("    {}", row.subtitle));
        }
    }
    lines
}

pub fn format_providers(providers: &[ProviderInfo]) -> Vec<String> {
    providers
        .iter()
        .map(|p| match p.default_model.as_deref() {
            Some(model) if !model.is_empty() => format!("{} (default model: {model})", p.name),
            _ => p.name.clone(),
        })
        .collect()
}

fn push_body(lines: &mut Vec<String>, text: &str) {
    for line in text.lines() {
        lines.push(format!("  {}", line));
    }
}

/// Format the reconciled idea detail
pub fn format_idea(view: &IdeaView) -> Vec<String> {
    let idea = &view.idea;
    let mut lines = vec![format!("#{} {}", idea.id, idea.display_title())];
    lines.push(format!(
        "status: {}",
        idea.status.as_deref().unwrap_or("none")
    ));
    if let Some(lane) = idea.lane_primary.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("lane: {}", lane));
    }
    if let Some(kind) = idea.breakthrough_type.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("breakthrough: {}", kind));
    }
    if let Some(at) = view.last_resubmitted() {
        lines.push(format!("last resubmitted: {}", at));
    }
    if let Some(claim) = idea.big_claim.as_deref().filter(|s| !s.is_empty()) {
        lines.push("claim:".to_string());
        push_body(&mut lines, claim);
    }

    if !view.gates.is_empty() {
        lines.push(String::new());
        lines.push("gates:".to_string());
        for card in &view.gates {
            let mut line = format!("  gate {} [{}]", card.gate(), card.status.as_str());
            if !card.notes.is_empty() {
                line.push_str(&format!(" {}", card.notes));
            }
            lines.push(line);
        }
    }

    for part in &view.dossier {
        lines.push(String::new());
        if part.collapsed {
            lines.push(format!("{} (collapsed)", kind_label(&part.kind)));
        } else {
            lines.push(format!("{}:", kind_label(&part.kind)));
            push_body(&mut lines, &part.content);
        }
    }

    if !view.rounds.is_empty() {
        lines.push(String::new());
        lines.push("council rounds:".to_string());
        for round in &view.rounds {
            let marker = if view.round == Some(round.id) { "*" } else { " " };
            lines.push(format!(
                " {marker}round {} {} {}",
                round.round_number,
                round.status.as_deref().unwrap_or(""),
                round.created_at
            ).trim_end().to_string());
        }
    }
    let memos = view.shown_memos();
    if !memos.is_empty() {
        lines.push(String::new());
        lines.push("memos:".to_string());
        for memo in memos {
            lines.push(format!("  {}:", memo.referee));
            for line in memo.content.lines() {
                lines.push(format!("    {}", line));
            }
        }
    }

    if !view.versions.is_empty() {
        lines.push(String::new());
        lines.push("versions:".to_string());
        for version in &view.versions {
            lines.push(format!("  {}", version.display()));
        }
    }
    lines
}

/// Format the reconciled literature query detail
pub fn format_literature(view: &LiteratureView) -> Vec<String> {
    let query = &view.query;
    let mut lines = vec![
        format!("#{} {}", query.id, query.query),
        format!("status: {}", query.status),
        format!("sources: {}", query.source_list().join(", ")),
    ];
    if let Some(limit) = query.per_source_limit {
        lines.push(format!("per-source limit: {}", limit));
    }

    lines.push(String::new());
    lines.push(format!("works ({}):", view.works.len()));
    for work in &view.works {
        let action = match work.pdf_action {
            Some(PdfAction::Attach) => " (attachable)",
            Some(PdfAction::Detach) => "",
            None => "",
        };
        lines.push(format!(
            "  #{} {} [{}]{}",
            work.work.id,
            work.work.title,
            work.pdf.label(),
            action
        ));
        let byline = work.byline();
        if !byline.is_empty() {
            lines.push(format!("      {}", byline));
        }
    }

    if !view.local_pdfs.is_empty() {
        lines.push(String::new());
        lines.push("local pdfs:".to_string());
        for name in &view.local_pdfs {
            lines.push(format!("  {}", name));
        }
    }

    if let Some(synthesis) = view.synthesis.as_deref().filter(|s| !s.trim().is_empty()) {
        lines.push(String::new());
        lines.push("synthesis:".to_string());
        push_body(&mut lines, synthesis);
    }
    lines
}

/// Format the reconciled review detail, artifacts grouped by reviewer
pub fn format_review(view: &ReviewView) -> Vec<String> {
    let review = &view.review;
    let mut lines = vec![
        format!("#{} {}", review.id, review.display_title()),
        format!("type: {}", review.type_label()),
        format!("status: {}", review.status.as_deref().unwrap_or("new")),
    ];
    for (label, value) in [
        ("language", &review.language),
        ("domain", &review.domain),
        ("method family", &review.method_family),
    ] {
        if let Some(v) = value.as_deref().filter(|s| !s.is_empty()) {
            lines.push(format!("{}: {}", label, v));
        }
    }

    if !view.gates.is_empty() {
        lines.push(String::new());
        lines.push("gates:".to_string());
        for gate in &view.gates {
            let mut line = format!("  gate {} [{}]", gate.gate, gate.status.as_str());
            if let Some(notes) = gate.notes.as_deref().filter(|n| !n.is_empty()) {
                line.push_str(&format!(" {}", notes));
            }
            lines.push(line);
        }
    }

    if !view.sections.is_empty() {
        lines.push(String::new());
        lines.push("sections:".to_string());
        for section in &view.sections {
            let title = section.title.as_deref().unwrap_or("");
            lines.push(
                format!("  {} {} {}", section.section_id, title, section.page_range())
                    .trim_end()
                    .to_string(),
            );
            if let Some(excerpt) = section.excerpt.as_deref().filter(|e| !e.trim().is_empty()) {
                lines.push(format!("    {}", excerpt.trim()));
            }
        }
    }

    for group in &view.groups {
        lines.push(String::new());
        lines.push(format!("== {} ==", group.title()));
        for entry in &group.entries {
            lines.push(format!("{}:", entry.label));
            push_body(&mut lines, &entry.body);
        }
    }
    lines
}
