use crate::error::PlaygroundError;
use crate::model::{Cell, ResultSet, Row};
use rusqlite::backup::Progress;
use rusqlite::{Connection, DatabaseName};
use std::io::Write;
use tempfile::NamedTempFile;
use tracing::debug;

/// The embedded SQL engine as seen by the playground.
///
/// Parsing, planning and storage all live behind this trait; the playground
/// only issues statements and reads rows back.
pub trait Database {
    /// Runs a single statement and returns the number of rows it modified.
    fn execute(&mut self, sql: &str) -> Result<u64, PlaygroundError>;

    /// Runs a single statement and collects every row it produces.
    fn query(&mut self, sql: &str) -> Result<ResultSet, PlaygroundError>;

    /// Runs a semicolon-separated script, discarding any rows.
    fn execute_batch(&mut self, sql: &str) -> Result<(), PlaygroundError>;

    /// Serializes the whole database into an opaque payload, byte for byte.
    fn export(&mut self) -> Result<Vec<u8>, PlaygroundError>;

    /// Replaces the database with a payload produced by [`Database::export`].
    fn import(&mut self, payload: &[u8]) -> Result<(), PlaygroundError>;
}

pub struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    pub fn open_in_memory() -> Result<Self, PlaygroundError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }
}

impl Database for SqliteDatabase {
    fn execute(&mut self, sql: &str) -> Result<u64, PlaygroundError> {
        let mut stmt = self.conn.prepare(sql)?;
        if stmt.column_count() == 0 {
            return Ok(stmt.execute([])? as u64);
        }

        // PRAGMA and friends produce rows even when run for their side effect.
        let readonly = stmt.readonly();
        let mut rows = stmt.query([])?;
        while rows.next()?.is_some() {}
        drop(rows);
        drop(stmt);
        if readonly {
            Ok(0)
        } else {
            Ok(self.conn.changes() as u64)
        }
    }

    fn query(&mut self, sql: &str) -> Result<ResultSet, PlaygroundError> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let column_count = columns.len();

        let mut out = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let values = (0..column_count)
                .map(|i| row.get_ref(i).map(Cell::from))
                .collect::<Result<Vec<_>, _>>()?;
            out.push(Row { values });
        }
        Ok(ResultSet { columns, rows: out })
    }

    fn execute_batch(&mut self, sql: &str) -> Result<(), PlaygroundError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn export(&mut self) -> Result<Vec<u8>, PlaygroundError> {
        let image = self.conn.serialize(DatabaseName::Main)?;
        Ok(image.to_vec())
    }

    fn import(&mut self, payload: &[u8]) -> Result<(), PlaygroundError> {
        // The backup API reads from a file, so the image is staged on disk.
        let mut file = NamedTempFile::new()?;
        file.write_all(payload)?;
        file.flush()?;
        self.conn
            .restore(DatabaseName::Main, file.path(), None::<fn(Progress)>)?;
        debug!(bytes = payload.len(), "restored database image");
        Ok(())
    }
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
