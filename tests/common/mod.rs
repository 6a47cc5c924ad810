#![allow(dead_code)]

use sql_playground::{
    Database, MemoryStateStore, PlaygroundError, ResultSet, Session, SqliteDatabase,
};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

pub const USERS_SCHEMA: &str = "
CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    username VARCHAR(50) NOT NULL,
    email VARCHAR(100) NOT NULL UNIQUE);
INSERT INTO users (username, email) VALUES
    ('alice', 'alice@example.com'),
    ('bob', 'bob@example.com'),
    ('charlie', 'charlie@example.com');";

pub fn users_session() -> anyhow::Result<(Session, MemoryStateStore)> {
    let store = MemoryStateStore::new();
    let mut session = Session::open(Box::new(store.clone()))?;
    session.seed(USERS_SCHEMA)?;
    Ok((session, store))
}

pub fn scalar<D: Database>(session: &mut Session<D>, sql: &str) -> anyhow::Result<i64> {
    let rs = session.database().query(sql)?;
    rs.rows
        .first()
        .and_then(|r| r.values.first())
        .and_then(|c| c.as_i64())
        .ok_or_else(|| anyhow::anyhow!("no scalar from {sql}"))
}

pub fn table_exists<D: Database>(session: &mut Session<D>, name: &str) -> anyhow::Result<bool> {
    let n = scalar(
        session,
        &format!("SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = '{name}'"),
    )?;
    Ok(n == 1)
}

/// SQLite as shipped before RETURNING existed.
pub struct NoReturning(pub SqliteDatabase);

impl Database for NoReturning {
    fn execute(&mut self, sql: &str) -> Result<u64, PlaygroundError> {
        self.0.execute(sql)
    }

    fn query(&mut self, sql: &str) -> Result<ResultSet, PlaygroundError> {
        if sql.to_ascii_uppercase().contains("RETURNING") {
            let err = rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some("near \"RETURNING\": syntax error".into()),
            );
            return Err(err.into());
        }
        self.0.query(sql)
    }

    fn execute_batch(&mut self, sql: &str) -> Result<(), PlaygroundError> {
        self.0.execute_batch(sql)
    }

    fn export(&mut self) -> Result<Vec<u8>, PlaygroundError> {
        self.0.export()
    }

    fn import(&mut self, payload: &[u8]) -> Result<(), PlaygroundError> {
        self.0.import(payload)
    }
}

pub fn users_session_without_returning() -> anyhow::Result<Session<NoReturning>> {
    let db = NoReturning(SqliteDatabase::open_in_memory()?);
    let mut session = Session::with_database(db, Box::new(MemoryStateStore::new()));
    session.seed(USERS_SCHEMA)?;
    Ok(session)
}

/// Runs the binary with `args`, feeding `stdin`, and returns its stdout.
pub fn run_cli(data_dir: &Path, args: &[&str], stdin: &str) -> anyhow::Result<String> {
    let bin = env!("CARGO_BIN_EXE_sql-playground");
    let mut child = Command::new(bin)
        .arg("--data")
        .arg(data_dir)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()?;

    child
        .stdin
        .take()
        .ok_or_else(|| anyhow::anyhow!("failed to open stdin"))?
        .write_all(stdin.as_bytes())?;

    let output = child.wait_with_output()?;
    if !output.status.success() {
        anyhow::bail!("sql-playground exited with {}", output.status);
    }
    Ok(String::from_utf8(output.stdout)?)
}
