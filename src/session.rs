use crate::engine::{quote_ident, Database, SqliteDatabase};
use crate::error::PlaygroundError;
use crate::model::{Cell, ColumnInfo, HighlightKind, RowImpactMap, TableView};
use crate::pending::{GuardOutcome, PendingAction, PendingActionGuard};
use crate::store::StateStore;
use tracing::{debug, info, warn};

/// Everything one learner's workspace owns: the engine handle, where its
/// state is saved, the pending destructive action and the last highlight.
pub struct Session<D: Database = SqliteDatabase> {
    db: D,
    store: Box<dyn StateStore>,
    guard: PendingActionGuard,
    last_impact: RowImpactMap,
    highlight: HighlightKind,
    /// Set when the saved payload could not be loaded; it is left untouched.
    keep_saved: bool,
}

impl Session<SqliteDatabase> {
    /// Opens a fresh in-memory SQLite engine and restores any saved state into it.
    pub fn open(store: Box<dyn StateStore>) -> Result<Self, PlaygroundError> {
        let db = SqliteDatabase::open_in_memory()?;
        let mut session = Self::with_database(db, store);
        session.restore();
        Ok(session)
    }
}

impl<D: Database> Session<D> {
    pub fn with_database(db: D, store: Box<dyn StateStore>) -> Self {
        Self {
            db,
            store,
            guard: PendingActionGuard::new(),
            last_impact: RowImpactMap::new(),
            highlight: HighlightKind::Normal,
            keep_saved: false,
        }
    }

    fn restore(&mut self) {
        match self.store.load() {
            Ok(Some(payload)) => match self.db.import(&payload) {
                Ok(()) => debug!(bytes = payload.len(), "restored saved database"),
                Err(e) => {
                    warn!(error = %e, "ignoring unreadable saved database; changes will not be saved");
                    self.keep_saved = true;
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "could not read saved database; changes will not be saved");
                self.keep_saved = true;
            }
        }
    }

    pub fn database(&mut self) -> &mut D {
        &mut self.db
    }

    /// Exports the database to the state store. Failures are logged only.
    pub fn persist(&mut self) {
        if self.keep_saved {
            debug!("saved database was not restored, skipping save");
            return;
        }
        let saved = self
            .db
            .export()
            .and_then(|payload| self.store.save(&payload));
        if let Err(e) = saved {
            warn!(error = %e, "failed to persist database state");
        }
    }

    /// Runs a setup script (lesson base SQL) outside the statement router.
    pub fn seed(&mut self, script: &str) -> Result<(), PlaygroundError> {
        self.db.execute_batch(script)?;
        self.persist();
        Ok(())
    }

    pub fn last_impact(&self) -> &RowImpactMap {
        &self.last_impact
    }

    pub fn highlight(&self) -> HighlightKind {
        self.highlight
    }

    pub(crate) fn set_highlight(&mut self, impact: RowImpactMap, highlight: HighlightKind) {
        self.last_impact = impact;
        self.highlight = highlight;
    }

    fn clear_highlight(&mut self) {
        self.last_impact.clear();
        self.highlight = HighlightKind::Normal;
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.guard.pending()
    }

    pub(crate) fn stage(&mut self, action: PendingAction) {
        self.guard.stage(action);
    }

    /// Commits a staged DELETE. Returns `Ok(None)` when no delete is staged.
    ///
    /// If the engine rejects the statement the action stays staged.
    pub fn confirm_delete(&mut self) -> Result<Option<GuardOutcome>, PlaygroundError> {
        let Some(PendingAction::Delete { sql, table, row_ids }) =
            self.guard.pending_delete().cloned()
        else {
            return Ok(None);
        };
        self.db.execute(&sql)?;
        self.guard.take_delete();
        self.persist();
        self.clear_highlight();
        info!(table = %table, rows = row_ids.len(), "confirmed delete");
        Ok(Some(GuardOutcome::Deleted { table, row_ids }))
    }

    pub fn cancel_delete(&mut self) -> Option<GuardOutcome> {
        let action = self.guard.take_delete()?;
        self.clear_highlight();
        debug!(table = action.table(), "cancelled delete");
        Some(GuardOutcome::DeleteCancelled)
    }

    /// Commits a staged DROP. Returns `Ok(None)` when no drop is staged.
    pub fn confirm_drop(&mut self) -> Result<Option<GuardOutcome>, PlaygroundError> {
        let Some(PendingAction::Drop { sql, table }) = self.guard.pending_drop().cloned() else {
            return Ok(None);
        };
        self.db.execute(&sql)?;
        self.guard.take_drop();
        self.persist();
        self.clear_highlight();
        info!(table = %table, "confirmed drop");
        Ok(Some(GuardOutcome::Dropped { table }))
    }

    pub fn cancel_drop(&mut self) -> Option<GuardOutcome> {
        let action = self.guard.take_drop()?;
        self.clear_highlight();
        debug!(table = action.table(), "cancelled drop");
        Some(GuardOutcome::DropCancelled)
    }

    /// Confirms whichever action is staged.
    pub fn confirm(&mut self) -> Result<Option<GuardOutcome>, PlaygroundError> {
        match self.guard.pending() {
            Some(PendingAction::Delete { .. }) => self.confirm_delete(),
            Some(PendingAction::Drop { .. }) => self.confirm_drop(),
            None => Ok(None),
        }
    }

    /// Cancels whichever action is staged.
    pub fn cancel(&mut self) -> Option<GuardOutcome> {
        match self.guard.pending()? {
            PendingAction::Delete { .. } => self.cancel_delete(),
            PendingAction::Drop { .. } => self.cancel_drop(),
        }
    }

    /// Current user tables with their columns and rows, read fresh from the engine.
    pub fn tables(&mut self) -> Result<Vec<TableView>, PlaygroundError> {
        let names = self.db.query(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        )?;

        let mut out = Vec::with_capacity(names.rows.len());
        for row in names.rows {
            let Some(name) = row.values.first().and_then(Cell::as_str) else {
                continue;
            };
            out.push(self.table_view(name)?);
        }
        Ok(out)
    }

    fn table_view(&mut self, name: &str) -> Result<TableView, PlaygroundError> {
        let quoted = quote_ident(name);

        // table_info: cid, name, type, notnull, dflt_value, pk
        let info = self.db.query(&format!("PRAGMA table_info({quoted})"))?;
        let columns = info
            .rows
            .iter()
            .map(|r| ColumnInfo {
                name: r.values.get(1).map(|c| c.to_string()).unwrap_or_default(),
                declared_type: r.values.get(2).map(|c| c.to_string()).unwrap_or_default(),
            })
            .collect();

        let rows = match self.db.query(&format!("SELECT rowid, * FROM {quoted}")) {
            Ok(rs) => rs
                .rows
                .into_iter()
                .map(|mut row| {
                    let id = row.values.remove(0).as_i64();
                    (id, row)
                })
                .collect(),
            Err(_) => self
                .db
                .query(&format!("SELECT * FROM {quoted}"))?
                .rows
                .into_iter()
                .map(|row| (None, row))
                .collect(),
        };

        Ok(TableView {
            name: name.to_string(),
            columns,
            rows,
        })
    }
}
