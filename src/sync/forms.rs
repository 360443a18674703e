//! Not-yet-submitted form input, kept across refresh cycles and restarts.
//!
//! The store holds one [`FormDraft`] per form. A draft is captured from the
//! view before lists are re-rendered and written back afterwards, and every
//! edit is persisted as it happens so a restart picks up where the user was.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::io::state::{KvStore, read_record, write_record};

/// A tracked field and its built-in default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub default: &'static str,
}

const fn field(name: &'static str, label: &'static str, default: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        label,
        default,
    }
}

const RUN_CREATE_FIELDS: &[FieldSpec] = &[
    field("provider", "Provider", ""),
    field("model", "Model", ""),
    field("idea_count", "Ideas", "1"),
    field("topic_focus", "Topic focus", ""),
    field("topic_exclude", "Exclude topics", ""),
    field("literature_query_id", "Literature query #", ""),
    field("use_assessment_seeds", "Use assessment seeds", "no"),
];

const LITERATURE_QUERY_FIELDS: &[FieldSpec] = &[
    field("query", "Query", ""),
    field("sources", "Sources", "openalex,crossref"),
    field("per_source_limit", "Per-source limit", "20"),
    field("include_non_article", "Include non-articles", "no"),
    field("openalex_email", "OpenAlex email", ""),
];

const REVIEW_CREATE_FIELDS: &[FieldSpec] = &[
    field("review_type", "Type (paper/project)", "paper"),
    field("level", "Level", ""),
    field("title", "Title", ""),
    field("domain", "Domain", ""),
    field("method_family", "Method family", ""),
];

const REVIEW_RUN_FIELDS: &[FieldSpec] = &[
    field("provider", "Provider", ""),
    field("model", "Model", ""),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormId {
    RunCreate,
    LiteratureQuery,
    ReviewCreate,
    ReviewRun,
}

impl FormId {
    pub const ALL: [FormId; 4] = [
        FormId::RunCreate,
        FormId::LiteratureQuery,
        FormId::ReviewCreate,
        FormId::ReviewRun,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FormId::RunCreate => "run_create",
            FormId::LiteratureQuery => "literature_query",
            FormId::ReviewCreate => "review_create",
            FormId::ReviewRun => "review_run",
        }
    }

    /// Persistence Bridge key of this form's draft
    pub fn storage_key(self) -> String {
        format!("draft.{}", self.key())
    }

    pub fn title(self) -> &'static str {
        match self {
            FormId::RunCreate => "New run",
            FormId::LiteratureQuery => "New literature query",
            FormId::ReviewCreate => "New review",
            FormId::ReviewRun => "Run review",
        }
    }

    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            FormId::RunCreate => RUN_CREATE_FIELDS,
            FormId::LiteratureQuery => LITERATURE_QUERY_FIELDS,
            FormId::ReviewCreate => REVIEW_CREATE_FIELDS,
            FormId::ReviewRun => REVIEW_RUN_FIELDS,
        }
    }

    pub fn field_spec(self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.name == name)
    }
}

/// Field values of one form, keyed by field name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormDraft {
    values: BTreeMap<String, String>,
}

impl FormDraft {
    pub fn defaults(form: FormId) -> Self {
        FormDraft {
            values: form
                .fields()
                .iter()
                .map(|f| (f.name.to_string(), f.default.to_string()))
                .collect(),
        }
    }

    /// Overlay stored values on the defaults. Unknown fields are dropped.
    fn merged(form: FormId, stored: BTreeMap<String, String>) -> Self {
        let mut draft = FormDraft::defaults(form);
        for (name, value) in stored {
            if let Some(slot) = draft.values.get_mut(&name) {
                *slot = value;
            }
        }
        draft
    }

    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or_default()
    }

    /// Trimmed value, `None` when blank
    pub fn non_empty(&self, field: &str) -> Option<&str> {
        Some(self.get(field).trim()).filter(|v| !v.is_empty())
    }

    pub fn is_yes(&self, field: &str) -> bool {
        matches!(
            self.get(field).trim().to_ascii_lowercase().as_str(),
            "yes" | "y" | "true" | "1"
        )
    }

    fn set(&mut self, field: &str, value: &str) -> bool {
        match self.values.get_mut(field) {
            Some(slot) if slot != value => {
                *slot = value.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Scroll offset of the surface's main view
pub type ScrollPosition = u16;

/// What the reconciliation core needs from a view.
///
/// Field accessors return `None` / `false` when the field is not currently
/// built, which is how partially rendered forms are detected.
pub trait ViewSurface {
    fn has_form_focus(&self) -> bool;
    fn field_value(&self, form: FormId, field: &str) -> Option<String>;
    fn set_field_value(&mut self, form: FormId, field: &str, value: &str) -> bool;
    fn scroll_position(&self) -> ScrollPosition;
    fn set_scroll_position(&mut self, position: ScrollPosition);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormStateStore {
    drafts: BTreeMap<FormId, FormDraft>,
}

impl Default for FormStateStore {
    fn default() -> Self {
        FormStateStore {
            drafts: FormId::ALL
                .iter()
                .map(|&f| (f, FormDraft::defaults(f)))
                .collect(),
        }
    }
}

impl FormStateStore {
    /// Read every draft from durable storage. Missing or corrupt records
    /// fall back to the form's defaults.
    pub fn load(store: &dyn KvStore) -> Self {
        let mut forms = FormStateStore::default();
        for form in FormId::ALL {
            let key = form.storage_key();
            if let Some(stored) = read_record::<BTreeMap<String, String>>(store, &key) {
                forms.drafts.insert(form, FormDraft::merged(form, stored));
            }
        }
        forms
    }

    pub fn draft(&self, form: FormId) -> FormDraft {
        self.drafts
            .get(&form)
            .cloned()
            .unwrap_or_else(|| FormDraft::defaults(form))
    }

    pub fn value(&self, form: FormId, field: &str) -> &str {
        self.drafts
            .get(&form)
            .map(|d| d.get(field))
            .unwrap_or_default()
    }

    /// Copy the view's values into the record. Nothing is captured unless
    /// every tracked field of the form exists in the view.
    /// Returns whether the record changed.
    pub fn capture(&mut self, form: FormId, surface: &dyn ViewSurface) -> bool {
        let mut values = Vec::with_capacity(form.fields().len());
        for spec in form.fields() {
            match surface.field_value(form, spec.name) {
                Some(v) => values.push((spec.name, v)),
                None => return false,
            }
        }
        let draft = self
            .drafts
            .entry(form)
            .or_insert_with(|| FormDraft::defaults(form));
        let mut changed = false;
        for (name, value) in values {
            changed |= draft.set(name, &value);
        }
        changed
    }

    /// Capture every form, persisting those that changed
    pub fn capture_all(&mut self, surface: &dyn ViewSurface, store: &mut dyn KvStore) {
        for form in FormId::ALL {
            if self.capture(form, surface) {
                self.persist(form, store);
            }
        }
    }

    /// Apply a single input event and persist it immediately
    pub fn record_edit(&mut self, form: FormId, field: &str, value: &str, store: &mut dyn KvStore) {
        let draft = self
            .drafts
            .entry(form)
            .or_insert_with(|| FormDraft::defaults(form));
        if draft.set(field, value) {
            self.persist(form, store);
        }
    }

    /// Write the record out. Failures are logged and dropped.
    pub fn persist(&self, form: FormId, store: &mut dyn KvStore) {
        let draft = self.draft(form);
        if let Err(e) = write_record(store, &form.storage_key(), &draft) {
            tracing::warn!(form = form.key(), error = %e, "could not persist form draft");
        }
    }

    /// Write stored values back into whichever fields the view has built
    pub fn restore(&self, form: FormId, surface: &mut dyn ViewSurface) {
        let Some(draft) = self.drafts.get(&form) else {
            return;
        };
        for (name, value) in draft.iter() {
            if surface.field_value(form, name).is_some() {
                surface.set_field_value(form, name, value);
            }
        }
    }

    pub fn restore_all(&self, surface: &mut dyn ViewSurface) {
        for form in FormId::ALL {
            self.restore(form, surface);
        }
    }

    /// Fill blank fields from a fallback, e.g. the saved provider preference
    pub fn prefill(&mut self, form: FormId, field: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        if let Some(draft) = self.drafts.get_mut(&form) {
            if draft.get(field).trim().is_empty() {
                draft.set(field, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::state::MemoryKvStore;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeSurface {
        fields: HashMap<(FormId, String), String>,
        writes: usize,
    }

    impl FakeSurface {
        fn with_form(form: FormId) -> Self {
            let mut s = FakeSurface::default();
            for spec in form.fields() {
                s.fields
                    .insert((form, spec.name.to_string()), spec.default.to_string());
            }
            s
        }
    }

    impl ViewSurface for FakeSurface {
        fn has_form_focus(&self) -> bool {
            false
        }
        fn field_value(&self, form: FormId, field: &str) -> Option<String> {
            self.fields.get(&(form, field.to_string())).cloned()
        }
        fn set_field_value(&mut self, form: FormId, field: &str, value: &str) -> bool {
            match self.fields.get_mut(&(form, field.to_string())) {
                Some(slot) => {
                    *slot = value.to_string();
                    self.writes += 1;
                    true
                }
                None => false,
            }
        }
        fn scroll_position(&self) -> ScrollPosition {
            0
        }
        fn set_scroll_position(&mut self, _position: ScrollPosition) {}
    }

    #[test]
    fn defaults_match_form_definitions() {
        let forms = FormStateStore::default();
        assert_eq!(forms.value(FormId::RunCreate, "idea_count"), "1");
        assert_eq!(forms.value(FormId::RunCreate, "use_assessment_seeds"), "no");
        assert_eq!(forms.value(FormId::LiteratureQuery, "sources"), "openalex,crossref");
        assert_eq!(forms.value(FormId::LiteratureQuery, "per_source_limit"), "20");
        assert_eq!(forms.value(FormId::ReviewRun, "provider"), "");
    }

    #[test]
    fn capture_then_restore_round_trips() {
        let mut surface = FakeSurface::with_form(FormId::LiteratureQuery);
        surface.set_field_value(FormId::LiteratureQuery, "query", "minimum wage");
        let mut forms = FormStateStore::default();
        assert!(forms.capture(FormId::LiteratureQuery, &surface));

        let mut fresh = FakeSurface::with_form(FormId::LiteratureQuery);
        forms.restore(FormId::LiteratureQuery, &mut fresh);
        assert_eq!(
            fresh.field_value(FormId::LiteratureQuery, "query").as_deref(),
            Some("minimum wage")
        );
    }

    #[test]
    fn partial_form_is_not_captured() {
        let mut surface = FakeSurface::with_form(FormId::ReviewRun);
        surface.set_field_value(FormId::ReviewRun, "provider", "openai");
        surface.fields.remove(&(FormId::ReviewRun, "model".to_string()));
        let mut forms = FormStateStore::default();
        assert!(!forms.capture(FormId::ReviewRun, &surface));
        assert_eq!(forms.value(FormId::ReviewRun, "provider"), "");
    }

    #[test]
    fn restore_skips_missing_fields() {
        let mut forms = FormStateStore::default();
        let mut store = MemoryKvStore::new();
        forms.record_edit(FormId::RunCreate, "model", "gpt-x", &mut store);
        let mut surface = FakeSurface::default();
        surface
            .fields
            .insert((FormId::RunCreate, "model".into()), String::new());
        forms.restore(FormId::RunCreate, &mut surface);
        assert_eq!(surface.writes, 1);
        assert_eq!(surface.field_value(FormId::RunCreate, "model").as_deref(), Some("gpt-x"));
    }

    #[test]
    fn edits_persist_and_reload() {
        let mut store = MemoryKvStore::new();
        let mut forms = FormStateStore::default();
        forms.record_edit(FormId::LiteratureQuery, "query", "housing supply", &mut store);
        assert!(store.get("draft.literature_query").is_some());

        let reloaded = FormStateStore::load(&store);
        assert_eq!(reloaded.value(FormId::LiteratureQuery, "query"), "housing supply");
        assert_eq!(reloaded.value(FormId::LiteratureQuery, "sources"), "openalex,crossref");
    }

    #[test]
    fn corrupt_storage_yields_defaults() {
        let store = MemoryKvStore::new()
            .with_entry("draft.run_create", "{ this is not json")
            .with_entry("draft.review_run", "[1, 2, 3]");
        let forms = FormStateStore::load(&store);
        assert_eq!(forms, FormStateStore::default());
    }

    #[test]
    fn unknown_stored_fields_are_dropped() {
        let store = MemoryKvStore::new()
            .with_entry("draft.review_run", r#"{"provider":"gemini","legacy":"x"}"#);
        let forms = FormStateStore::load(&store);
        let draft = forms.draft(FormId::ReviewRun);
        assert_eq!(draft.get("provider"), "gemini");
        assert_eq!(draft.iter().count(), 2);
    }

    #[test]
    fn persist_failure_is_swallowed() {
        let mut store = MemoryKvStore::read_only();
        let mut forms = FormStateStore::default();
        forms.record_edit(FormId::RunCreate, "provider", "openai", &mut store);
        assert_eq!(forms.value(FormId::RunCreate, "provider"), "openai");
    }

    #[test]
    fn prefill_only_touches_blank_fields() {
        let mut forms = FormStateStore::default();
        let mut store = MemoryKvStore::new();
        forms.record_edit(FormId::ReviewRun, "model", "kept", &mut store);
        forms.prefill(FormId::ReviewRun, "provider", "anthropic");
        forms.prefill(FormId::ReviewRun, "model", "other");
        assert_eq!(forms.value(FormId::ReviewRun, "provider"), "anthropic");
        assert_eq!(forms.value(FormId::ReviewRun, "model"), "kept");
    }
}
