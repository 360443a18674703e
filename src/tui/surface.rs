use std::collections::BTreeMap;

use crate::sync::forms::{FormId, FormStateStore, ScrollPosition, ViewSurface};

/// What the line editor is currently writing into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// The field at `field` (index into `FormId::fields`) of a form
    Form { form: FormId, field: usize },
    /// Notes of a gate card on the open idea
    GateNotes { gate: u32 },
    /// One of the LLM assessment settings of the open query
    Assessment { field: AssessmentField },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentField {
    Provider,
    Model,
    MaxDocs,
    MaxTokens,
}

impl AssessmentField {
    pub fn next(self) -> AssessmentField {
        match self {
            AssessmentField::Provider => AssessmentField::Model,
            AssessmentField::Model => AssessmentField::MaxDocs,
            AssessmentField::MaxDocs => AssessmentField::MaxTokens,
            AssessmentField::MaxTokens => AssessmentField::Provider,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AssessmentField::Provider => "Provider",
            AssessmentField::Model => "Model",
            AssessmentField::MaxDocs => "Max docs",
            AssessmentField::MaxTokens => "Token budget",
        }
    }
}

/// The terminal's form widgets: one text buffer per field, the edit focus
/// and the detail scroll offset.
#[derive(Debug, Clone, Default)]
pub struct FormSurface {
    values: BTreeMap<(FormId, &'static str), String>,
    pub editing: Option<EditTarget>,
    pub scroll: ScrollPosition,
}

impl FormSurface {
    /// Build every form's fields, filled from the draft store
    pub fn build(forms: &FormStateStore) -> Self {
        let mut surface = FormSurface::default();
        for form in FormId::ALL {
            for spec in form.fields() {
                surface
                    .values
                    .insert((form, spec.name), forms.value(form, spec.name).to_string());
            }
        }
        surface
    }

    pub fn value(&self, form: FormId, field: &str) -> &str {
        form.field_spec(field)
            .and_then(|spec| self.values.get(&(form, spec.name)))
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Field being edited, if the editor is on a form
    pub fn form_field(&self) -> Option<(FormId, &'static str)> {
        match self.editing {
            Some(EditTarget::Form { form, field }) => {
                form.fields().get(field).map(|spec| (form, spec.name))
            }
            _ => None,
        }
    }

    fn slot(&mut self, form: FormId, field: &str) -> Option<&mut String> {
        let name = form.field_spec(field)?.name;
        self.values.get_mut(&(form, name))
    }
}

impl ViewSurface for FormSurface {
    fn has_form_focus(&self) -> bool {
        self.editing.is_some()
    }

    fn field_value(&self, form: FormId, field: &str) -> Option<String> {
        let name = form.field_spec(field)?.name;
        self.values.get(&(form, name)).cloned()
    }

    fn set_field_value(&mut self, form: FormId, field: &str, value: &str) -> bool {
        match self.slot(form, field) {
            Some(slot) => {
                *slot = value.to_string();
                true
            }
            None => false,
        }
    }

    fn scroll_position(&self) -> ScrollPosition {
        self.scroll
    }

    fn set_scroll_position(&mut self, position: ScrollPosition) {
        self.scroll = position;
    }
}
