use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use std::collections::BTreeMap;
use std::fmt;

/// Engine-assigned `rowid` of a table row.
pub type RowId = i64;

#[derive(Debug, Clone)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Null, Cell::Null) => true,
            (Cell::Int(a), Cell::Int(b)) => a == b,
            (Cell::Float(a), Cell::Float(b)) => a.to_bits() == b.to_bits(),
            (Cell::Text(a), Cell::Text(b)) => a == b,
            (Cell::Blob(a), Cell::Blob(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Cell {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<ValueRef<'_>> for Cell {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(i) => Cell::Int(i),
            ValueRef::Real(f) => Cell::Float(f),
            ValueRef::Text(bytes) => Cell::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Cell::Blob(bytes.to_vec()),
        }
    }
}

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Null => ToSqlOutput::Owned(Value::Null),
            Cell::Int(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            Cell::Float(f) => ToSqlOutput::Owned(Value::Real(*f)),
            Cell::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Cell::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b.as_slice())),
        })
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("NULL"),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
            Cell::Blob(b) => {
                f.write_str("x'")?;
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                f.write_str("'")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub values: Vec<Cell>,
}

/// Rows returned by a query, with the column names reported by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
}

/// One user table as the diagram renderer draws it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    /// Row ids are absent for WITHOUT ROWID tables.
    pub rows: Vec<(Option<RowId>, Row)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowImpact {
    Rows(Vec<RowId>),
    /// Every row of the table; the table itself is the target.
    All,
}

impl RowImpact {
    pub fn contains(&self, id: RowId) -> bool {
        match self {
            RowImpact::Rows(ids) => ids.contains(&id),
            RowImpact::All => true,
        }
    }
}

/// At most one entry per table.
pub type RowImpactMap = BTreeMap<String, RowImpact>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HighlightKind {
    #[default]
    Normal,
    Delete,
    Drop,
}

impl fmt::Display for HighlightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HighlightKind::Normal => "normal",
            HighlightKind::Delete => "delete",
            HighlightKind::Drop => "drop",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub message: String,
    pub affected_count: u64,
    pub impact: RowImpactMap,
    pub highlight: HighlightKind,
    /// Populated for SELECT only.
    pub result_set: Option<ResultSet>,
}

impl ExecutionResult {
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn failed(err: impl fmt::Display) -> Self {
        Self::notice(format!("Error: {err}"))
    }

    pub fn executed(affected_count: u64) -> Self {
        Self {
            message: format!("Executed successfully, affected rows: {affected_count}"),
            affected_count,
            ..Default::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.message.starts_with("Error: ")
    }
}
