use crate::model::RowId;
use std::fmt;
use tracing::warn;

/// A destructive statement held back until the learner confirms it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Delete {
        sql: String,
        table: String,
        row_ids: Vec<RowId>,
    },
    Drop {
        sql: String,
        table: String,
    },
}

impl PendingAction {
    pub fn sql(&self) -> &str {
        match self {
            PendingAction::Delete { sql, .. } | PendingAction::Drop { sql, .. } => sql,
        }
    }

    pub fn table(&self) -> &str {
        match self {
            PendingAction::Delete { table, .. } | PendingAction::Drop { table, .. } => table,
        }
    }
}

/// What a confirm or cancel did, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Deleted { table: String, row_ids: Vec<RowId> },
    DeleteCancelled,
    Dropped { table: String },
    DropCancelled,
}

impl fmt::Display for GuardOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardOutcome::Deleted { table, row_ids } => {
                let ids: Vec<String> = row_ids.iter().map(|id| id.to_string()).collect();
                write!(
                    f,
                    "Deleted {} rows from {table}\nDeleted row IDs: {}",
                    row_ids.len(),
                    ids.join(", ")
                )
            }
            GuardOutcome::DeleteCancelled => f.write_str("Delete cancelled"),
            GuardOutcome::Dropped { table } => write!(f, "Table {table} dropped"),
            GuardOutcome::DropCancelled => f.write_str("Drop cancelled"),
        }
    }
}

/// Single slot holding at most one staged destructive action.
///
/// Staging replaces whatever was there. Taking a delete while a drop is
/// staged (or vice versa) leaves the slot untouched.
#[derive(Debug, Default)]
pub struct PendingActionGuard {
    slot: Option<PendingAction>,
}

impl PendingActionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&mut self, action: PendingAction) {
        if let Some(previous) = self.slot.replace(action) {
            warn!(
                table = previous.table(),
                sql = previous.sql(),
                "discarding unconfirmed pending action"
            );
        }
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.slot.as_ref()
    }

    pub fn pending_delete(&self) -> Option<&PendingAction> {
        self.slot
            .as_ref()
            .filter(|a| matches!(a, PendingAction::Delete { .. }))
    }

    pub fn pending_drop(&self) -> Option<&PendingAction> {
        self.slot
            .as_ref()
            .filter(|a| matches!(a, PendingAction::Drop { .. }))
    }

    /// Empties the slot if it holds a delete.
    pub fn take_delete(&mut self) -> Option<PendingAction> {
        self.pending_delete()?;
        self.slot.take()
    }

    /// Empties the slot if it holds a drop.
    pub fn take_drop(&mut self) -> Option<PendingAction> {
        self.pending_drop()?;
        self.slot.take()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}
