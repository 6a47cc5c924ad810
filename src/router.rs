use crate::classify::{
    classify, delete_table, drop_table, from_table, insert_table, is_multi_statement,
    rowid_probe, update_table, where_clause, with_returning_rowid, with_rowid_projection,
    StatementKind,
};
use crate::engine::Database;
use crate::error::PlaygroundError;
use crate::model::{Cell, ExecutionResult, HighlightKind, ResultSet, RowId, RowImpact, RowImpactMap};
use crate::pending::PendingAction;
use crate::session::Session;
use tracing::debug;

/// Classifies `raw_sql` by its leading keyword and runs it against the session.
///
/// Never fails: engine errors come back as an `Error: ...` message with no
/// affected rows. DELETE and DROP are only previewed and staged; they run
/// when the session's confirm is called.
pub fn execute<D: Database>(raw_sql: &str, session: &mut Session<D>) -> ExecutionResult {
    session.set_highlight(RowImpactMap::new(), HighlightKind::Normal);

    let sql = raw_sql.trim();
    if sql.is_empty() {
        return ExecutionResult::notice("Nothing to execute");
    }
    if is_multi_statement(sql) {
        return ExecutionResult::failed(PlaygroundError::MultipleStatements);
    }

    let kind = classify(sql);
    debug!(?kind, sql, "routing statement");
    let outcome = match kind {
        StatementKind::Select => handle_select(sql, session),
        StatementKind::Insert => handle_insert(sql, session),
        StatementKind::Update => handle_update(sql, session),
        StatementKind::Delete => handle_delete(sql, session),
        StatementKind::Drop => handle_drop(sql, session),
        StatementKind::Other => handle_other(sql, session),
    };

    match outcome {
        Ok(result) => {
            session.set_highlight(result.impact.clone(), result.highlight);
            session.persist();
            result
        }
        Err(err @ PlaygroundError::MalformedTarget(_)) => ExecutionResult::notice(err.to_string()),
        Err(err) => {
            debug!(error = %err, "statement failed");
            ExecutionResult::failed(err)
        }
    }
}

fn handle_select<D: Database>(
    sql: &str,
    session: &mut Session<D>,
) -> Result<ExecutionResult, PlaygroundError> {
    let db = session.database();
    let (result_set, impact) = match db.query(&with_rowid_projection(sql)) {
        Ok(projected) => {
            let (result_set, ids) = split_rowid_column(projected);
            let mut impact = RowImpactMap::new();
            if let Some(table) = from_table(sql) {
                impact.insert(table.to_string(), RowImpact::Rows(ids));
            }
            (result_set, impact)
        }
        Err(e) => {
            // Joins, DISTINCT, views and FROM-less selects reject the extra column.
            debug!(error = %e, "rowid projection rejected, running query as written");
            (db.query(sql)?, RowImpactMap::new())
        }
    };

    let count = result_set.rows.len() as u64;
    Ok(ExecutionResult {
        message: format!("Returned {count} rows"),
        affected_count: count,
        impact,
        highlight: HighlightKind::Normal,
        result_set: Some(result_set),
    })
}

/// Removes the leading rowid column, returning the ids in row order.
fn split_rowid_column(mut rs: ResultSet) -> (ResultSet, Vec<RowId>) {
    if !rs.columns.is_empty() {
        rs.columns.remove(0);
    }
    let mut ids = Vec::with_capacity(rs.rows.len());
    for row in &mut rs.rows {
        if row.values.is_empty() {
            continue;
        }
        if let Some(id) = row.values.remove(0).as_i64() {
            ids.push(id);
        }
    }
    (rs, ids)
}

fn first_column_ids(rs: &ResultSet) -> Vec<RowId> {
    rs.rows
        .iter()
        .filter_map(|r| r.values.first().and_then(Cell::as_i64))
        .collect()
}

fn handle_insert<D: Database>(
    sql: &str,
    session: &mut Session<D>,
) -> Result<ExecutionResult, PlaygroundError> {
    let db = session.database();
    let row_ids = match db.query(&with_returning_rowid(sql)) {
        Ok(returned) => first_column_ids(&returned),
        Err(e) => {
            debug!(error = %e, "RETURNING unavailable, reconstructing ids from last_insert_rowid");
            let affected = db.execute(sql)?;
            let last = db
                .query("SELECT last_insert_rowid()")?
                .rows
                .first()
                .and_then(|r| r.values.first())
                .and_then(Cell::as_i64)
                .unwrap_or(0);
            contiguous_row_ids(last, affected)
        }
    };

    let mut result = ExecutionResult::executed(row_ids.len() as u64);
    if let Some(table) = insert_table(sql) {
        result
            .impact
            .insert(table.to_string(), RowImpact::Rows(row_ids));
    }
    Ok(result)
}

/// The `affected` ids ending at `last`, assuming the engine handed them out
/// consecutively with no concurrent writer and no reuse.
pub fn contiguous_row_ids(last: RowId, affected: u64) -> Vec<RowId> {
    if affected == 0 {
        return Vec::new();
    }
    let start = last.saturating_sub(affected as i64 - 1);
    (start..=last).collect()
}

fn handle_update<D: Database>(
    sql: &str,
    session: &mut Session<D>,
) -> Result<ExecutionResult, PlaygroundError> {
    let db = session.database();
    let Some(table) = update_table(sql) else {
        return Ok(ExecutionResult::executed(db.execute(sql)?));
    };

    // Captured before the update; predicates on updated columns may drift.
    let row_ids = match db.query(&rowid_probe(table, where_clause(sql))) {
        Ok(rs) => Some(first_column_ids(&rs)),
        Err(e) => {
            debug!(error = %e, "could not probe rows touched by update");
            None
        }
    };

    let mut result = ExecutionResult::executed(db.execute(sql)?);
    if let Some(row_ids) = row_ids {
        result
            .impact
            .insert(table.to_string(), RowImpact::Rows(row_ids));
    }
    Ok(result)
}

fn handle_delete<D: Database>(
    sql: &str,
    session: &mut Session<D>,
) -> Result<ExecutionResult, PlaygroundError> {
    let table = delete_table(sql).ok_or(PlaygroundError::MalformedTarget("DELETE"))?;
    let probe = rowid_probe(table, where_clause(sql));
    let row_ids = first_column_ids(&session.database().query(&probe)?);
    let count = row_ids.len();

    session.stage(PendingAction::Delete {
        sql: sql.to_string(),
        table: table.to_string(),
        row_ids: row_ids.clone(),
    });

    let mut impact = RowImpactMap::new();
    impact.insert(table.to_string(), RowImpact::Rows(row_ids));
    Ok(ExecutionResult {
        message: format!("Preview: {count} rows will be deleted. Confirm?"),
        affected_count: count as u64,
        impact,
        highlight: HighlightKind::Delete,
        result_set: None,
    })
}

fn handle_drop<D: Database>(
    sql: &str,
    session: &mut Session<D>,
) -> Result<ExecutionResult, PlaygroundError> {
    let table = drop_table(sql).ok_or(PlaygroundError::MalformedTarget("DROP"))?;

    session.stage(PendingAction::Drop {
        sql: sql.to_string(),
        table: table.to_string(),
    });

    let mut impact = RowImpactMap::new();
    impact.insert(table.to_string(), RowImpact::All);
    Ok(ExecutionResult {
        message: format!("Preview: Table {table} will be dropped. Confirm?"),
        affected_count: 1,
        impact,
        highlight: HighlightKind::Drop,
        result_set: None,
    })
}

fn handle_other<D: Database>(
    sql: &str,
    session: &mut Session<D>,
) -> Result<ExecutionResult, PlaygroundError> {
    let affected = session.database().execute(sql)?;
    Ok(ExecutionResult::executed(affected))
}
