//! Right-hand pane: the open idea, literature query or review, or the run
//! under the cursor.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::model::Memo;
use crate::sync::reconcile::{IdeaView, LiteratureView, PdfAction, ReviewView};
use crate::sync::{EntityKind, Pane};
use crate::tui::app::{App, Focus, View};
use crate::tui::surface::{AssessmentField, EditTarget};

use super::helpers::{body_lines, field_line, gutter, heading};

pub fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let border = if app.focus == Focus::Detail {
        app.theme.highlight
    } else {
        app.theme.dim
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = detail_lines(app);
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.surface.scroll, 0));
    frame.render_widget(paragraph, inner);
}

fn detail_lines(app: &App) -> Vec<Line<'static>> {
    match app.view {
        View::Runs => run_lines(app),
        View::Ideas => pane_lines(app, EntityKind::Idea, &app.state.idea, idea_lines),
        View::Literature => pane_lines(
            app,
            EntityKind::Literature,
            &app.state.literature,
            literature_lines,
        ),
        View::Reviews => pane_lines(app, EntityKind::Review, &app.state.review, review_lines),
    }
}

fn pane_lines<T>(
    app: &App,
    kind: EntityKind,
    pane: &Pane<T>,
    ready: fn(&App, &T) -> Vec<Line<'static>>,
) -> Vec<Line<'static>> {
    let dim = Style::default().fg(app.theme.dim);
    match pane {
        Pane::Empty => vec![Line::from(Span::styled(kind.placeholder(), dim))],
        Pane::Loading(id) => vec![Line::from(Span::styled(
            format!("Loading {} #{id}\u{2026}", kind.label()),
            dim,
        ))],
        Pane::Failed(message) => vec![Line::from(Span::styled(
            message.clone(),
            Style::default().fg(app.theme.red),
        ))],
        Pane::Ready(view) => ready(app, view),
    }
}

// ---------------------------------------------------------------------------
// Runs

fn run_lines(app: &App) -> Vec<Line<'static>> {
    let Some(row) = app.cursor_row() else {
        return vec![Line::from(Span::styled(
            "No runs yet. Press e to start one.",
            Style::default().fg(app.theme.dim),
        ))];
    };
    let Some(run) = app.state.collections.runs.iter().find(|r| r.id == row.id) else {
        return Vec::new();
    };
    let mut lines = vec![
        heading(app, format!("Run #{}", run.id)),
        Line::from(vec![
            Span::styled("Status: ", Style::default().fg(app.theme.dim)),
            Span::styled(
                run.status.clone(),
                Style::default().fg(app.theme.state_color(&run.status)),
            ),
        ]),
        field_line(app, "Provider", run.provider.clone()),
        field_line(app, "Model", run.model.clone()),
    ];
    if let Some(n) = run.idea_count {
        lines.push(field_line(app, "Ideas", n.to_string()));
    }
    lines.push(field_line(app, "Created", run.created_at.clone()));
    let included = run.included_topics();
    let excluded = run.excluded_topics();
    if !included.is_empty() {
        lines.push(Line::from(""));
        lines.push(heading(app, "Focus"));
        lines.extend(included.into_iter().map(|t| Line::from(format!("  {t}"))));
    }
    if !excluded.is_empty() {
        lines.push(Line::from(""));
        lines.push(heading(app, "Excluding"));
        lines.extend(excluded.into_iter().map(|t| Line::from(format!("  {t}"))));
    }
    lines
}

// ---------------------------------------------------------------------------
// Ideas

fn idea_lines(app: &App, view: &IdeaView) -> Vec<Line<'static>> {
    let idea = &view.idea;
    let mut lines = vec![heading(app, format!("#{} {}", idea.id, idea.display_title()))];
    let status = idea.status.clone().unwrap_or_else(|| "none".into());
    lines.push(Line::from(vec![
        Span::styled("Status: ", Style::default().fg(app.theme.dim)),
        Span::styled(
            status.clone(),
            Style::default().fg(app.theme.state_color(&status)),
        ),
    ]));
    if let Some(lane) = idea.lane_primary.as_deref().filter(|s| !s.is_empty()) {
        lines.push(field_line(app, "Lane", lane.to_string()));
    }
    if let Some(kind) = idea.breakthrough_type.as_deref().filter(|s| !s.is_empty()) {
        lines.push(field_line(app, "Breakthrough", kind.to_string()));
    }
    if let Some(at) = view.last_resubmitted() {
        lines.push(field_line(app, "Last resubmitted", at.to_string()));
    }
    if let Some(claim) = idea.big_claim.as_deref().filter(|s| !s.is_empty()) {
        lines.push(Line::from(""));
        lines.extend(body_lines(app, claim));
    }

    // Gates
    lines.push(Line::from(""));
    lines.push(heading(app, "Gates  (g/G move, s status, n notes, w save)"));
    if view.gates.is_empty() {
        lines.push(dim_line(app, "  No gates recorded."));
    }
    for (i, card) in view.gates.iter().enumerate() {
        let editing = app.surface.editing == Some(EditTarget::GateNotes { gate: card.gate() });
        let mut spans = vec![
            gutter(app, i == app.gate_cursor),
            Span::styled(
                format!("Gate {} ", card.gate()),
                Style::default().fg(app.theme.text_bright),
            ),
            Span::styled(
                format!("[{}]", card.status.as_str()),
                Style::default().fg(app.theme.state_color(card.status.as_str())),
            ),
        ];
        if card.is_dirty() {
            spans.push(Span::styled(" *", Style::default().fg(app.theme.yellow)));
        }
        if !card.notes.is_empty() || editing {
            spans.push(Span::styled(
                format!("  {}", card.notes),
                Style::default().fg(app.theme.text),
            ));
        }
        if editing {
            spans.push(Span::styled("\u{258C}", Style::default().fg(app.theme.highlight)));
        }
        lines.push(Line::from(spans));
    }

    // Dossier
    if !view.dossier.is_empty() {
        lines.push(Line::from(""));
        lines.push(heading(app, "Dossier  (o/O move, z fold)"));
        for (i, part) in view.dossier.iter().enumerate() {
            let arrow = if part.collapsed { "\u{25B8}" } else { "\u{25BE}" };
            lines.push(Line::from(vec![
                gutter(app, i == app.dossier_cursor),
                Span::styled(
                    format!("{arrow} {}", crate::sync::artifacts::kind_label(&part.kind)),
                    Style::default().fg(app.theme.cyan),
                ),
            ]));
            if !part.collapsed {
                lines.extend(body_lines(app, &part.content));
            }
        }
    }

    // Council rounds
    lines.push(Line::from(""));
    lines.push(heading(app, "Council  ([ ] rounds, R resubmit, A apply revisions, S no review)"));
    for round in &view.rounds {
        let chosen = view.round == Some(round.id);
        let mut text = format!("Round {}", round.round_number);
        if let Some(status) = round.status.as_deref().filter(|s| !s.is_empty()) {
            text.push_str(&format!(" ({status})"));
        }
        if !round.created_at.is_empty() {
            text.push_str(&format!("  {}", round.created_at));
        }
        let style = if chosen {
            Style::default()
                .fg(app.theme.text_bright)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.dim)
        };
        lines.push(Line::from(vec![gutter(app, chosen), Span::styled(text, style)]));
    }
    if view.memos_loading {
        lines.push(dim_line(app, "  Loading memos\u{2026}"));
    } else {
        let memos = view.shown_memos();
        if memos.is_empty() {
            lines.push(dim_line(app, "  No council memos."));
        }
        push_memos(app, &mut lines, memos);
    }

    // Versions
    if !view.versions.is_empty() {
        lines.push(Line::from(""));
        lines.push(heading(app, "Versions  (v cycle)"));
        for version in &view.versions {
            let open = view.version.as_deref() == Some(version.id.as_str());
            lines.push(Line::from(vec![
                gutter(app, open),
                Span::styled(version.display(), Style::default().fg(app.theme.text)),
            ]));
        }
        if view.version.is_some() {
            match &view.version_detail {
                None => lines.push(dim_line(app, "  Loading version\u{2026}")),
                Some(detail) => {
                    lines.push(Line::from(""));
                    lines.push(heading(app, format!("Version {}", detail.id)));
                    if let Some(meta) = detail.metadata.as_deref().filter(|s| !s.is_empty()) {
                        lines.extend(body_lines(app, meta));
                    }
                    for part in &detail.dossier_parts {
                        lines.push(Line::from(Span::styled(
                            crate::sync::artifacts::kind_label(&part.kind),
                            Style::default().fg(app.theme.cyan),
                        )));
                        lines.extend(body_lines(app, &part.content));
                    }
                    push_memos(app, &mut lines, &detail.council_memos);
                }
            }
        }
    }
    lines
}

fn push_memos(app: &App, lines: &mut Vec<Line<'static>>, memos: &[Memo]) {
    for memo in memos {
        lines.push(Line::from(Span::styled(
            format!("{}:", memo.referee),
            Style::default().fg(app.theme.purple),
        )));
        lines.extend(body_lines(app, &memo.content));
    }
}

fn dim_line(app: &App, text: &str) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), Style::default().fg(app.theme.dim)))
}

// ---------------------------------------------------------------------------
// Literature

fn literature_lines(app: &App, view: &LiteratureView) -> Vec<Line<'static>> {
    let query = &view.query;
    let mut lines = vec![
        heading(app, format!("#{} {}", query.id, query.query)),
        Line::from(vec![
            Span::styled("Status: ", Style::default().fg(app.theme.dim)),
            Span::styled(
                query.status.clone(),
                Style::default().fg(app.theme.state_color(&query.status)),
            ),
        ]),
        field_line(app, "Sources", query.source_list().join(", ")),
    ];
    if let Some(limit) = query.per_source_limit {
        lines.push(field_line(app, "Per-source limit", limit.to_string()));
    }

    lines.push(Line::from(""));
    lines.push(heading(app, "Synthesis  (b rebuild)"));
    match view.synthesis.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(text) => lines.extend(body_lines(app, text)),
        None => lines.push(dim_line(app, "  No synthesis yet.")),
    }

    lines.push(Line::from(""));
    lines.push(heading(
        app,
        format!(
            "Works ({})  (J/K move, a attach, x detach, D remove, c cleanup, X delete query)",
            view.works.len()
        ),
    ));
    for (i, work) in view.works.iter().enumerate() {
        lines.push(Line::from(vec![
            gutter(app, i == app.work_cursor),
            Span::styled(work.work.title.clone(), Style::default().fg(app.theme.text_bright)),
        ]));
        let byline = work.byline();
        let mut detail = vec![
            Span::raw("    "),
            Span::styled(
                format!("[{}]", work.pdf.label()),
                Style::default().fg(pdf_color(app, work.pdf_action)),
            ),
        ];
        if !byline.is_empty() {
            detail.push(Span::styled(format!(" {byline}"), Style::default().fg(app.theme.dim)));
        }
        lines.push(Line::from(detail));
    }

    if !view.local_pdfs.is_empty() {
        lines.push(Line::from(""));
        lines.push(heading(app, "Local PDFs  (p choose)"));
        for (i, name) in view.local_pdfs.iter().enumerate() {
            lines.push(Line::from(vec![
                gutter(app, i == app.pdf_choice),
                Span::styled(name.clone(), Style::default().fg(app.theme.text)),
            ]));
        }
    }

    lines.push(Line::from(""));
    lines.push(heading(app, "LLM assessment  (m edit, L run)"));
    let settings = app.state.assessment.get(&query.id);
    let (provider, model, docs, budget) = match settings {
        Some(s) => (
            s.provider.clone(),
            s.model.clone(),
            s.max_docs.to_string(),
            s.max_tokens_budget.to_string(),
        ),
        None => {
            let pref = &app.state.llm_preference;
            (
                pref.provider.clone(),
                pref.model.clone(),
                crate::sync::reconcile::DEFAULT_MAX_DOCS.to_string(),
                crate::sync::reconcile::DEFAULT_MAX_TOKENS_BUDGET.to_string(),
            )
        }
    };
    for (field, value) in [
        (AssessmentField::Provider, provider),
        (AssessmentField::Model, model),
        (AssessmentField::MaxDocs, docs),
        (AssessmentField::MaxTokens, budget),
    ] {
        let editing = app.surface.editing == Some(EditTarget::Assessment { field });
        let mut spans = vec![
            gutter(app, editing),
            Span::styled(format!("{}: ", field.label()), Style::default().fg(app.theme.dim)),
            Span::styled(value, Style::default().fg(app.theme.text)),
        ];
        if editing {
            spans.push(Span::styled("\u{258C}", Style::default().fg(app.theme.highlight)));
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn pdf_color(app: &App, action: Option<PdfAction>) -> ratatui::style::Color {
    match action {
        Some(PdfAction::Detach) => app.theme.green,
        Some(PdfAction::Attach) => app.theme.yellow,
        None => app.theme.dim,
    }
}

// ---------------------------------------------------------------------------
// Reviews

fn review_lines(app: &App, view: &ReviewView) -> Vec<Line<'static>> {
    let review = &view.review;
    let status = review.status.clone().unwrap_or_else(|| "new".into());
    let mut lines = vec![
        heading(app, format!("#{} {}", review.id, review.display_title())),
        field_line(app, "Type", review.type_label()),
        Line::from(vec![
            Span::styled("Status: ", Style::default().fg(app.theme.dim)),
            Span::styled(
                status.clone(),
                Style::default().fg(app.theme.state_color(&status)),
            ),
        ]),
    ];
    for (label, value) in [
        ("Language", &review.language),
        ("Domain", &review.domain),
        ("Method family", &review.method_family),
    ] {
        if let Some(v) = value.as_deref().filter(|s| !s.is_empty()) {
            lines.push(field_line(app, label, v.to_string()));
        }
    }

    if !view.gates.is_empty() {
        lines.push(Line::from(""));
        lines.push(heading(app, "Gates"));
        for gate in &view.gates {
            let status = gate.status.as_str();
            let mut spans = vec![
                Span::styled(
                    format!("  Gate {} ", gate.gate),
                    Style::default().fg(app.theme.text_bright),
                ),
                Span::styled(
                    format!("[{status}]"),
                    Style::default().fg(app.theme.state_color(status)),
                ),
            ];
            if let Some(notes) = gate.notes.as_deref().filter(|n| !n.is_empty()) {
                spans.push(Span::styled(
                    format!("  {notes}"),
                    Style::default().fg(app.theme.text),
                ));
            }
            lines.push(Line::from(spans));
        }
    }

    if !view.sections.is_empty() {
        lines.push(Line::from(""));
        lines.push(heading(app, "Sections"));
        for section in &view.sections {
            let mut text = format!("  {}", section.section_id);
            if let Some(title) = section.title.as_deref().filter(|s| !s.is_empty()) {
                text.push_str(&format!(" {title}"));
            }
            let pages = section.page_range();
            if !pages.is_empty() {
                text.push_str(&format!("  {pages}"));
            }
            lines.push(Line::from(Span::styled(text, Style::default().fg(app.theme.text))));
            if let Some(excerpt) = section.excerpt.as_deref().filter(|e| !e.trim().is_empty()) {
                lines.push(dim_line(app, &format!("    {}", excerpt.trim())));
            }
        }
    }

    lines.push(Line::from(""));
    if view.groups.is_empty() {
        lines.push(dim_line(app, "No review output yet. Press R to run the review."));
    }
    for group in &view.groups {
        lines.push(heading(app, group.title()));
        for entry in &group.entries {
            lines.push(Line::from(Span::styled(
                entry.label.clone(),
                Style::default().fg(app.theme.cyan),
            )));
            lines.extend(body_lines(app, &entry.body));
        }
        lines.push(Line::from(""));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Artifact, Gate, GateStatus, IdeaEnvelope, LiteratureEnvelope, Memo, ReviewEnvelope,
        Section, Work,
    };
    use crate::sync::reconcile::{IdeaSnapshot, LiteratureSnapshot};
    use crate::tui::render::test_helpers::*;

    fn render(app: &App) -> String {
        render_to_string(80, 40, |frame, area| render_detail(frame, app, area))
    }

    #[test]
    fn empty_panes_show_placeholders() {
        let mut app = app_with_lists();
        app.view = View::Literature;
        assert!(render(&app).contains("No query selected."));
        app.view = View::Reviews;
        assert!(render(&app).contains("No review selected."));
    }

    #[test]
    fn loading_and_failed_panes() {
        let mut app = app_with_lists();
        app.view = View::Ideas;
        app.state.idea = Pane::Loading(5);
        assert!(render(&app).contains("Loading idea #5"));
        app.state.idea = Pane::Failed("Could not load idea #5: HTTP 500".into());
        assert!(render(&app).contains("HTTP 500"));
    }

    #[test]
    fn runs_view_describes_cursor_run() {
        let mut app = app_with_lists();
        app.view = View::Runs;
        let out = render(&app);
        assert!(out.contains("Run #1"));
        assert!(out.contains("Ideas: 3"));
        assert!(out.contains("  tides"));
    }

    #[test]
    fn idea_shows_gates_and_memos() {
        let mut app = app_with_lists();
        app.view = View::Ideas;
        let snapshot = IdeaSnapshot {
            envelope: IdeaEnvelope {
                idea: idea(5, "Tidal memory"),
                gates: vec![Gate {
                    gate: 1,
                    status: GateStatus::NeedsRevision,
                    notes: Some("tighten scope".into()),
                }],
                dossier_parts: Vec::new(),
                council_memos: vec![Memo {
                    referee: "skeptic".into(),
                    content: "Where is the control group?".into(),
                }],
            },
            rounds: Vec::new(),
            versions: Vec::new(),
            latest_round: None,
        };
        app.state.idea = Pane::Ready(IdeaView::build(snapshot, None));
        let out = render(&app);
        assert!(out.contains("#5 Tidal memory"));
        assert!(out.contains("Gate 1 [needs_revision]  tighten scope"));
        assert!(out.contains("skeptic:"));
        assert!(out.contains("Where is the control group?"));
    }

    #[test]
    fn literature_shows_works_and_assessment() {
        let mut app = app_with_lists();
        app.view = View::Literature;
        let view = LiteratureView::build(LiteratureSnapshot {
            envelope: LiteratureEnvelope {
                query: query(3, "memory consolidation"),
                works: vec![Work {
                    id: 30,
                    title: "Sleep spindles".into(),
                    authors: Some("Ng, Ode".into()),
                    year: Some(2021),
                    venue: None,
                    source: None,
                    work_type: None,
                    doi: None,
                    pdf_path: None,
                    open_access_url: None,
                }],
                synthesis: None,
            },
            local_pdfs: vec!["spindles.pdf".into()],
        });
        app.state.literature = Pane::Ready(view);
        let out = render(&app);
        assert!(out.contains("Sleep spindles"));
        assert!(out.contains("Ng, Ode"));
        assert!(out.contains("spindles.pdf"));
        assert!(out.contains("No synthesis yet."));
        assert!(out.contains("Max docs: 8"));
    }

    #[test]
    fn review_groups_artifacts() {
        let mut app = app_with_lists();
        app.view = View::Reviews;
        app.state.review = Pane::Ready(ReviewView::build(ReviewEnvelope {
            review: review(9, "Sleep and recall"),
            sections: vec![Section {
                section_id: "s1".into(),
                title: Some("Intro".into()),
                page_start: Some(1),
                page_end: Some(1),
                excerpt: Some("Sleep consolidates recall.".into()),
            }],
            artifacts: vec![Artifact {
                kind: "summary".into(),
                content: "Solid paper.".into(),
                slot: None,
                persona: None,
            }],
            gates: vec![Gate {
                gate: 1,
                status: GateStatus::Failed,
                notes: Some("no control group".into()),
            }],
        }));
        let out = render(&app);
        assert!(out.contains("General"));
        assert!(out.contains("Solid paper."));
        assert!(out.contains("Gate 1 [failed]  no control group"));
        assert!(out.contains("Sleep consolidates recall."));
    }
}
