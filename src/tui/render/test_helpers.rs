use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::io::state::MemoryKvStore;
use crate::model::{Idea, LiteratureQuery, Review, ReviewType, Run};
use crate::sync::AppState;
use crate::tui::app::App;
use crate::tui::theme::Theme;

pub const TERM_W: u16 = 100;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

pub fn run(id: i64) -> Run {
    Run {
        id,
        status: "done".into(),
        provider: "openai".into(),
        model: "gpt-4o".into(),
        idea_count: Some(3),
        topic_focus: Some("tides; memory".into()),
        topic_exclude: None,
        created_at: "2026-03-01T10:00:00".into(),
    }
}

pub fn idea(id: i64, title: &str) -> Idea {
    Idea {
        id,
        run_id: 1,
        title: Some(title.into()),
        status: None,
        lane_primary: Some("methods".into()),
        breakthrough_type: None,
        big_claim: None,
        updated_at: "2026-03-02T09:00:00".into(),
    }
}

pub fn query(id: i64, text: &str) -> LiteratureQuery {
    LiteratureQuery {
        id,
        query: text.into(),
        sources: "openalex,crossref".into(),
        status: "complete".into(),
        per_source_limit: Some(20),
        include_non_article: Some(false),
    }
}

pub fn review(id: i64, title: &str) -> Review {
    Review {
        id,
        review_type: ReviewType::Paper,
        level: None,
        status: Some("complete".into()),
        title: Some(title.into()),
        language: None,
        domain: None,
        method_family: None,
    }
}

/// An app over an in-memory store with one item in every collection
pub fn app_with_lists() -> App {
    let mut state = AppState::new(Box::new(MemoryKvStore::new()));
    state.collections.runs = vec![run(1)];
    state.collections.ideas = vec![idea(5, "Tidal memory")];
    state.collections.queries = vec![query(3, "memory consolidation")];
    state.collections.reviews = vec![review(9, "Sleep and recall")];
    state.rerender_lists();
    App::new(state, Theme::default(), "http://127.0.0.1:8000")
}
