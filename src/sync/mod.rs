//! Selection-aware polling and reconciliation.
//!
//! [`AppState`] is owned by whoever drives the surface (the TUI loop or a
//! one-shot CLI command) and passed by reference into the refresher, the
//! reconciler and the actions. Background work never holds it; async
//! loads hand back values that are applied through the selection stamp.

pub mod actions;
pub mod artifacts;
pub mod forms;
pub mod reconcile;
pub mod refresh;
pub mod selection;
pub mod status;

use std::collections::HashMap;

use serde::Serialize;

use crate::io::state::{KvStore, LlmPreference};
use crate::model::{IdeaFilter, ProviderInfo};

use forms::{FormId, FormStateStore};
use reconcile::{AssessmentSettings, IdeaView, LiteratureView, ReviewView};
use refresh::{Collections, ListViews};
use selection::SelectionTracker;
use status::StatusBoard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Idea,
    Literature,
    Review,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Idea => "idea",
            EntityKind::Literature => "literature query",
            EntityKind::Review => "review",
        }
    }

    /// Text shown in a detail pane with nothing open
    pub fn placeholder(self) -> &'static str {
        match self {
            EntityKind::Idea => "No idea selected.",
            EntityKind::Literature => "No query selected.",
            EntityKind::Review => "No review selected.",
        }
    }
}

/// Content of one detail pane
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Pane<T> {
    #[default]
    Empty,
    Loading(i64),
    Ready(T),
    Failed(String),
}

impl<T> Pane<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Pane::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            Pane::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Pane::Empty)
    }
}

pub struct AppState {
    pub collections: Collections,
    pub lists: ListViews,
    pub selection: SelectionTracker,
    pub forms: FormStateStore,
    pub idea_filter: IdeaFilter,
    pub idea: Pane<IdeaView>,
    pub literature: Pane<LiteratureView>,
    pub review: Pane<ReviewView>,
    pub status: StatusBoard,
    pub providers: Vec<ProviderInfo>,
    pub llm_preference: LlmPreference,
    /// LLM assessment settings per literature query id
    pub assessment: HashMap<i64, AssessmentSettings>,
    pub store: Box<dyn KvStore>,
}

impl AppState {
    /// Load drafts and the provider preference from `store`
    pub fn new(store: Box<dyn KvStore>) -> Self {
        let mut forms = FormStateStore::load(store.as_ref());
        let llm_preference = LlmPreference::load(store.as_ref());
        for form in [FormId::RunCreate, FormId::ReviewRun] {
            forms.prefill(form, "provider", &llm_preference.provider);
            forms.prefill(form, "model", &llm_preference.model);
        }
        AppState {
            collections: Collections::default(),
            lists: ListViews::default(),
            selection: SelectionTracker::new(),
            forms,
            idea_filter: IdeaFilter::default(),
            idea: Pane::Empty,
            literature: Pane::Empty,
            review: Pane::Empty,
            status: StatusBoard::new(),
            providers: Vec::new(),
            llm_preference,
            assessment: HashMap::new(),
            store,
        }
    }

    /// Record one form input event and persist it
    pub fn record_edit(&mut self, form: FormId, field: &str, value: &str) {
        self.forms
            .record_edit(form, field, value, self.store.as_mut());
    }

    /// Remember the provider/model pair last used for an LLM action
    pub fn remember_llm(&mut self, provider: &str, model: &str) {
        let pref = LlmPreference {
            provider: provider.to_string(),
            model: model.to_string(),
        };
        if pref != self.llm_preference {
            pref.save(self.store.as_mut());
            self.llm_preference = pref;
        }
    }

    /// Close the detail pane of `kind` and clear its selection
    pub fn close(&mut self, kind: EntityKind) {
        self.selection.clear(kind);
        match kind {
            EntityKind::Idea => self.idea = Pane::Empty,
            EntityKind::Literature => self.literature = Pane::Empty,
            EntityKind::Review => self.review = Pane::Empty,
        }
        self.rerender_lists();
    }

    /// Rebuild the list views from the cached collections
    pub fn rerender_lists(&mut self) {
        self.lists = refresh::render_lists(&self.collections, &self.selection, self.idea_filter);
    }

    pub fn set_idea_filter(&mut self, filter: IdeaFilter) {
        self.idea_filter = filter;
        self.rerender_lists();
    }

    /// Assessment settings for a query, seeded from the provider preference
    pub fn assessment_settings(&mut self, query_id: i64) -> &mut AssessmentSettings {
        let pref = &self.llm_preference;
        self.assessment
            .entry(query_id)
            .or_insert_with(|| AssessmentSettings::seeded(&pref.provider, &pref.model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::state::{LLM_PREFERENCE_KEY, MemoryKvStore};

    #[test]
    fn preference_prefills_llm_forms() {
        let store = MemoryKvStore::new().with_entry(
            LLM_PREFERENCE_KEY,
            r#"{"provider":"anthropic","model":"sonnet"}"#,
        );
        let state = AppState::new(Box::new(store));
        assert_eq!(state.forms.value(FormId::RunCreate, "provider"), "anthropic");
        assert_eq!(state.forms.value(FormId::ReviewRun, "model"), "sonnet");
    }

    #[test]
    fn close_clears_selection_and_pane() {
        let mut state = AppState::new(Box::new(MemoryKvStore::new()));
        state.selection.select(EntityKind::Literature, 3);
        state.literature = Pane::Loading(3);
        state.close(EntityKind::Literature);
        assert_eq!(state.selection.current(EntityKind::Literature), None);
        assert!(state.literature.is_empty());
    }

    #[test]
    fn assessment_settings_are_kept_per_query() {
        let mut state = AppState::new(Box::new(MemoryKvStore::new()));
        state.assessment_settings(1).max_docs = 5;
        assert_eq!(state.assessment_settings(1).max_docs, 5);
        assert_ne!(state.assessment_settings(2).max_docs, 5);
    }
}
