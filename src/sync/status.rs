use chrono::{DateTime, Local};
use indexmap::IndexMap;

use super::refresh::CollectionKind;

/// What a status message is about. Each scope holds at most one message;
/// a newer message for the same scope replaces the older one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusScope {
    Refresh(CollectionKind),
    RunCreate,
    LiteratureCreate,
    ReviewCreate,
    ReviewRun,
    Gate(u32),
    Resubmit,
    Literature,
    Work(i64),
    Assessment,
    Detail(super::EntityKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
    pub at: DateTime<Local>,
}

/// Inline, scoped feedback for ticks and actions
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    messages: IndexMap<StatusScope, StatusMessage>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, scope: StatusScope, level: StatusLevel, text: impl Into<String>) {
        // Re-inserting moves the scope to the end so `latest` stays ordered
        self.messages.shift_remove(&scope);
        self.messages.insert(
            scope,
            StatusMessage {
                level,
                text: text.into(),
                at: Local::now(),
            },
        );
    }

    pub fn info(&mut self, scope: StatusScope, text: impl Into<String>) {
        self.set(scope, StatusLevel::Info, text);
    }

    pub fn error(&mut self, scope: StatusScope, text: impl Into<String>) {
        self.set(scope, StatusLevel::Error, text);
    }

    pub fn clear(&mut self, scope: StatusScope) {
        self.messages.shift_remove(&scope);
    }

    pub fn get(&self, scope: StatusScope) -> Option<&StatusMessage> {
        self.messages.get(&scope)
    }

    pub fn text(&self, scope: StatusScope) -> Option<&str> {
        self.get(scope).map(|m| m.text.as_str())
    }

    /// Most recently set message, for the status row
    pub fn latest(&self) -> Option<(&StatusScope, &StatusMessage)> {
        self.messages.last()
    }

    /// Refresh errors still standing from the last tick
    pub fn refresh_errors(&self) -> impl Iterator<Item = &StatusMessage> {
        self.messages
            .iter()
            .filter(|(scope, m)| matches!(scope, StatusScope::Refresh(_)) && m.level == StatusLevel::Error)
            .map(|(_, m)| m)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
