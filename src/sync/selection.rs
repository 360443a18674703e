use serde::Serialize;

use super::EntityKind;

/// Identity of a detail load, stamped when the load is dispatched.
///
/// A result is only applied if the tracker still [`accepts`] its ticket.
///
/// [`accepts`]: SelectionTracker::accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LoadTicket {
    pub kind: EntityKind,
    pub id: i64,
}

impl LoadTicket {
    pub fn new(kind: EntityKind, id: i64) -> Self {
        LoadTicket { kind, id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// A new entity is open; load its detail with this ticket
    Opened(LoadTicket),
    /// The open entity was selected again and is now closed
    Closed,
}

/// At most one open entity per kind. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    idea: Option<i64>,
    literature: Option<i64>,
    review: Option<i64>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, kind: EntityKind) -> &mut Option<i64> {
        match kind {
            EntityKind::Idea => &mut self.idea,
            EntityKind::Literature => &mut self.literature,
            EntityKind::Review => &mut self.review,
        }
    }

    pub fn select(&mut self, kind: EntityKind, id: i64) -> SelectOutcome {
        let slot = self.slot(kind);
        if *slot == Some(id) {
            *slot = None;
            tracing::debug!(?kind, id, "selection closed");
            SelectOutcome::Closed
        } else {
            *slot = Some(id);
            tracing::debug!(?kind, id, "selection opened");
            SelectOutcome::Opened(LoadTicket::new(kind, id))
        }
    }

    pub fn current(&self, kind: EntityKind) -> Option<i64> {
        match kind {
            EntityKind::Idea => self.idea,
            EntityKind::Literature => self.literature,
            EntityKind::Review => self.review,
        }
    }

    /// Ticket for a refresh-driven reload of the open entity
    pub fn ticket(&self, kind: EntityKind) -> Option<LoadTicket> {
        self.current(kind).map(|id| LoadTicket::new(kind, id))
    }

    pub fn clear(&mut self, kind: EntityKind) {
        *self.slot(kind) = None;
    }

    pub fn is_selected(&self, kind: EntityKind, id: i64) -> bool {
        self.current(kind) == Some(id)
    }

    /// Whether a result stamped with `ticket` may still be applied
    pub fn accepts(&self, ticket: &LoadTicket) -> bool {
        self.current(ticket.kind) == Some(ticket.id)
    }
}
