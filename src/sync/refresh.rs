//! Fixed-cadence refresh of the top-level collections.
//!
//! A tick is three phases so the caller can keep handling input while the
//! fetch is in flight:
//!
//! 1. [`begin_tick`] checks form focus, captures drafts and the scroll offset
//! 2. [`fetch_collections`] is the only suspending phase
//! 3. [`finish_tick`] swaps in the new collections, re-renders the lists,
//!    restores drafts and scroll, and hands back detail reload tickets
//!
//! [`run_tick`] runs all three back to back.

use std::time::Duration;

use serde::Serialize;
use tokio::time::{Interval, MissedTickBehavior};

use super::forms::{ScrollPosition, ViewSurface};
use super::selection::{LoadTicket, SelectionTracker};
use super::status::StatusScope;
use super::{AppState, EntityKind};
use crate::api::{ApiError, Gateway};
use crate::model::{Idea, IdeaFilter, LiteratureQuery, Review, Run};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Runs,
    Ideas,
    LiteratureQueries,
    Reviews,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 4] = [
        CollectionKind::Runs,
        CollectionKind::Ideas,
        CollectionKind::LiteratureQueries,
        CollectionKind::Reviews,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CollectionKind::Runs => "runs",
            CollectionKind::Ideas => "ideas",
            CollectionKind::LiteratureQueries => "literature queries",
            CollectionKind::Reviews => "reviews",
        }
    }
}

/// Last successfully fetched copy of every collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Collections {
    pub runs: Vec<Run>,
    pub ideas: Vec<Idea>,
    pub queries: Vec<LiteratureQuery>,
    pub reviews: Vec<Review>,
}

/// One round of collection fetches; each may fail on its own
#[derive(Debug)]
pub struct FetchedCollections {
    pub runs: Result<Vec<Run>, ApiError>,
    pub ideas: Result<Vec<Idea>, ApiError>,
    pub queries: Result<Vec<LiteratureQuery>, ApiError>,
    pub reviews: Result<Vec<Review>, ApiError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRow {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub selected: bool,
}

/// Rendered list content. Two ticks with no server change compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListViews {
    pub runs: Vec<ListRow>,
    pub ideas: Vec<ListRow>,
    pub queries: Vec<ListRow>,
    pub reviews: Vec<ListRow>,
}

impl ListViews {
    pub fn get(&self, kind: CollectionKind) -> &[ListRow] {
        match kind {
            CollectionKind::Runs => &self.runs,
            CollectionKind::Ideas => &self.ideas,
            CollectionKind::LiteratureQueries => &self.queries,
            CollectionKind::Reviews => &self.reviews,
        }
    }
}

fn run_row(run: &Run) -> ListRow {
    let model = if run.model.is_empty() {
        run.provider.clone()
    } else {
        format!("{}/{}", run.provider, run.model)
    };
    ListRow {
        id: run.id,
        title: format!("Run #{} [{}] {}", run.id, run.status, model),
        subtitle: run.topic_summary(),
        selected: false,
    }
}

fn idea_row(idea: &Idea, selection: &SelectionTracker) -> ListRow {
    let mut subtitle = format!("run #{}", idea.run_id);
    if let Some(status) = idea.status.as_deref().filter(|s| !s.is_empty()) {
        subtitle.push_str(&format!(" | {status}"));
    }
    if let Some(lane) = idea.lane_primary.as_deref().filter(|s| !s.is_empty()) {
        subtitle.push_str(&format!(" | {lane}"));
    }
    ListRow {
        id: idea.id,
        title: idea.display_title().to_string(),
        subtitle,
        selected: selection.is_selected(EntityKind::Idea, idea.id),
    }
}

fn query_row(query: &LiteratureQuery, selection: &SelectionTracker) -> ListRow {
    ListRow {
        id: query.id,
        title: query.query.clone(),
        subtitle: format!("[{}] {}", query.status, query.source_list().join(", ")),
        selected: selection.is_selected(EntityKind::Literature, query.id),
    }
}

fn review_row(review: &Review, selection: &SelectionTracker) -> ListRow {
    let status = review.status.as_deref().unwrap_or("new");
    ListRow {
        id: review.id,
        title: review.display_title().to_string(),
        subtitle: format!("{} [{}]", review.type_label(), status),
        selected: selection.is_selected(EntityKind::Review, review.id),
    }
}

/// Build every list from the collections. Pure; the selected marker
/// follows the tracker and the idea list honours `filter`.
pub fn render_lists(
    collections: &Collections,
    selection: &SelectionTracker,
    filter: IdeaFilter,
) -> ListViews {
    ListViews {
        runs: collections.runs.iter().map(run_row).collect(),
        ideas: collections
            .ideas
            .iter()
            .filter(|i| filter.matches(i))
            .map(|i| idea_row(i, selection))
            .collect(),
        queries: collections
            .queries
            .iter()
            .map(|q| query_row(q, selection))
            .collect(),
        reviews: collections
            .reviews
            .iter()
            .map(|r| review_row(r, selection))
            .collect(),
    }
}

/// What [`begin_tick`] captured, needed by [`finish_tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickStart {
    pub scroll: ScrollPosition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A form had focus; nothing was fetched or touched
    Skipped,
    Completed {
        /// Stamped reloads for the open literature query and review
        detail_loads: Vec<LoadTicket>,
        failed: Vec<CollectionKind>,
    },
}

/// Focus check, draft capture and scroll snapshot. `None` skips the tick.
pub fn begin_tick(state: &mut AppState, surface: &dyn ViewSurface) -> Option<TickStart> {
    if surface.has_form_focus() {
        tracing::debug!("form has focus, skipping refresh");
        return None;
    }
    state.forms.capture_all(surface, state.store.as_mut());
    Some(TickStart {
        scroll: surface.scroll_position(),
    })
}

/// Fetch all four collections concurrently
pub async fn fetch_collections(gateway: &dyn Gateway) -> FetchedCollections {
    let (runs, ideas, queries, reviews) = tokio::join!(
        gateway.runs(),
        gateway.ideas(),
        gateway.literature_queries(),
        gateway.reviews(),
    );
    FetchedCollections {
        runs,
        ideas,
        queries,
        reviews,
    }
}

fn replace<T>(
    state_slot: &mut Vec<T>,
    fetched: Result<Vec<T>, ApiError>,
    kind: CollectionKind,
    status: &mut super::status::StatusBoard,
    failed: &mut Vec<CollectionKind>,
) {
    let scope = StatusScope::Refresh(kind);
    match fetched {
        Ok(items) => {
            *state_slot = items;
            status.clear(scope);
        }
        Err(e) => {
            tracing::warn!(collection = kind.label(), error = %e, "refresh failed");
            status.error(scope, format!("Could not refresh {}: {e}", kind.label()));
            failed.push(kind);
        }
    }
}

/// Apply fetched collections and restore what [`begin_tick`] captured.
///
/// A failed fetch keeps the previous copy of that collection.
pub fn finish_tick(
    state: &mut AppState,
    surface: &mut dyn ViewSurface,
    start: TickStart,
    fetched: FetchedCollections,
) -> TickOutcome {
    let mut failed = Vec::new();
    replace(
        &mut state.collections.runs,
        fetched.runs,
        CollectionKind::Runs,
        &mut state.status,
        &mut failed,
    );
    replace(
        &mut state.collections.ideas,
        fetched.ideas,
        CollectionKind::Ideas,
        &mut state.status,
        &mut failed,
    );
    replace(
        &mut state.collections.queries,
        fetched.queries,
        CollectionKind::LiteratureQueries,
        &mut state.status,
        &mut failed,
    );
    replace(
        &mut state.collections.reviews,
        fetched.reviews,
        CollectionKind::Reviews,
        &mut state.status,
        &mut failed,
    );

    state.rerender_lists();

    // The user may have focused a form while the fetch was in flight; its
    // live values are already in the store.
    if !surface.has_form_focus() {
        state.forms.restore_all(surface);
    }
    surface.set_scroll_position(start.scroll);

    let detail_loads = [EntityKind::Literature, EntityKind::Review]
        .into_iter()
        .filter_map(|kind| state.selection.ticket(kind))
        .collect();
    TickOutcome::Completed {
        detail_loads,
        failed,
    }
}

/// One full tick
pub async fn run_tick(
    state: &mut AppState,
    surface: &mut dyn ViewSurface,
    gateway: &dyn Gateway,
) -> TickOutcome {
    let Some(start) = begin_tick(state, surface) else {
        return TickOutcome::Skipped;
    };
    let fetched = fetch_collections(gateway).await;
    finish_tick(state, surface, start, fetched)
}

/// Owns the refresh cadence
#[derive(Debug, Clone, Copy)]
pub struct CollectionRefresher {
    period: Duration,
}

impl CollectionRefresher {
    pub fn new(period: Duration) -> Self {
        CollectionRefresher { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Interval whose first tick fires immediately. A slow tick delays the
    /// next one instead of bunching missed ticks together.
    pub fn interval(&self) -> Interval {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }
}
