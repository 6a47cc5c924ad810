//! Leading-keyword classification and keyword-anchored target extraction.
//!
//! This is deliberately not a SQL parser: statements are routed by their
//! first word, and table names are single identifier tokens captured after a
//! fixed keyword. Qualified or quoted names are not recognized.

use regex::Regex;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::tokenizer::{Token, Tokenizer};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Drop,
    Other,
}

impl StatementKind {
    fn from_keyword(word: &str) -> Self {
        match word.to_ascii_uppercase().as_str() {
            "SELECT" => StatementKind::Select,
            "INSERT" | "REPLACE" => StatementKind::Insert,
            "UPDATE" => StatementKind::Update,
            "DELETE" => StatementKind::Delete,
            "DROP" => StatementKind::Drop,
            _ => StatementKind::Other,
        }
    }
}

pub fn classify(sql: &str) -> StatementKind {
    match leading_keyword(sql) {
        Some(word) => StatementKind::from_keyword(&word),
        None => StatementKind::Other,
    }
}

fn tokenize(sql: &str) -> Option<Vec<Token>> {
    let dialect = SQLiteDialect {};
    Tokenizer::new(&dialect, sql).tokenize().ok()
}

/// First unquoted word of the statement, skipping whitespace and comments.
fn leading_keyword(sql: &str) -> Option<String> {
    let Some(tokens) = tokenize(sql) else {
        // Unterminated literals and the like: fall back to the raw prefix.
        let word: String = sql
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect();
        return (!word.is_empty()).then_some(word);
    };

    tokens
        .into_iter()
        .find(|t| !matches!(t, Token::Whitespace(_)))
        .and_then(|t| match t {
            Token::Word(w) if w.quote_style.is_none() => Some(w.value),
            _ => None,
        })
}

/// True when a `;` is followed by anything other than whitespace or comments.
pub fn is_multi_statement(sql: &str) -> bool {
    let Some(tokens) = tokenize(sql) else {
        return false;
    };
    let mut seen_terminator = false;
    for token in tokens {
        match token {
            Token::SemiColon => seen_terminator = true,
            Token::Whitespace(_) | Token::EOF => {}
            _ if seen_terminator => return true,
            _ => {}
        }
    }
    false
}

fn capture<'a>(re: &Regex, sql: &'a str) -> Option<&'a str> {
    re.captures(sql).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Table named right after the first `FROM`.
pub fn from_table(sql: &str) -> Option<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?i)\bFROM\s+(\w+)").expect("valid FROM regex"));
    capture(re, sql)
}

pub fn insert_table(sql: &str) -> Option<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?i)\bINTO\s+(\w+)").expect("valid INTO regex"));
    capture(re, sql)
}

pub fn update_table(sql: &str) -> Option<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)\bUPDATE\s+(?:OR\s+[a-z]+\s+)?(\w+)").expect("valid UPDATE regex")
    });
    capture(re, sql)
}

pub fn delete_table(sql: &str) -> Option<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE
        .get_or_init(|| Regex::new(r"(?i)\bDELETE\s+FROM\s+(\w+)").expect("valid DELETE regex"));
    capture(re, sql)
}

pub fn drop_table(sql: &str) -> Option<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)\bDROP\s+TABLE\s+(?:IF\s+EXISTS\s+)?(\w+)").expect("valid DROP regex")
    });
    capture(re, sql)
}

/// Everything after the first `WHERE`, without the statement terminator.
pub fn where_clause(sql: &str) -> Option<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?is)\bWHERE\s+(.+)").expect("valid WHERE regex"));
    capture(re, sql).map(statement_body).filter(|w| !w.is_empty())
}

/// `SELECT rowid FROM <table> [WHERE ...]` for the rows a statement will touch.
pub fn rowid_probe(table: &str, where_clause: Option<&str>) -> String {
    match where_clause {
        Some(w) => format!("SELECT rowid FROM {table} WHERE {w}"),
        None => format!("SELECT rowid FROM {table}"),
    }
}

/// Makes `rowid` the first projected column of a SELECT.
pub fn with_rowid_projection(sql: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?i)\bSELECT\s+").expect("valid SELECT regex"));
    re.replace(sql, "SELECT rowid, ").into_owned()
}

pub fn with_returning_rowid(sql: &str) -> String {
    format!("{} RETURNING rowid", statement_body(sql))
}

/// `sql` up to its last significant token: trailing `;`, comments and
/// whitespace are cut so that a clause can be appended.
pub fn statement_body(sql: &str) -> &str {
    let dialect = SQLiteDialect {};
    let Ok(tokens) = Tokenizer::new(&dialect, sql).tokenize_with_location() else {
        return strip_trailing_semicolon(sql);
    };
    let tail = tokens
        .iter()
        .rposition(|t| !matches!(t.token, Token::Whitespace(_) | Token::SemiColon | Token::EOF))
        .and_then(|last| tokens.get(last + 1));
    let Some(tail) = tail else {
        return strip_trailing_semicolon(sql);
    };
    match byte_offset(sql, tail.span.start.line, tail.span.start.column) {
        Some(end) => sql[..end].trim(),
        None => strip_trailing_semicolon(sql),
    }
}

/// Byte index of a 1-based tokenizer line/column (columns count chars).
fn byte_offset(sql: &str, line: u64, column: u64) -> Option<usize> {
    let line_start = match line {
        0 | 1 => 0,
        n => sql.match_indices('\n').nth(usize::try_from(n - 2).ok()?)?.0 + 1,
    };
    let rest = sql.get(line_start..)?;
    let skip = usize::try_from(column.saturating_sub(1)).ok()?;
    let within = rest
        .char_indices()
        .nth(skip)
        .map_or(rest.len(), |(i, _)| i);
    Some(line_start + within)
}

pub fn strip_trailing_semicolon(s: &str) -> &str {
    let s = s.trim();
    if let Some(stripped) = s.strip_suffix(';') {
        stripped.trim()
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_leading_keyword() {
        assert_eq!(classify("  select * from t"), StatementKind::Select);
        assert_eq!(classify("INSERT INTO t VALUES (1)"), StatementKind::Insert);
        assert_eq!(classify("replace into t values (1)"), StatementKind::Insert);
        assert_eq!(classify("Update t SET a = 1"), StatementKind::Update);
        assert_eq!(classify("DELETE FROM t"), StatementKind::Delete);
        assert_eq!(classify("drop table t"), StatementKind::Drop);
        assert_eq!(classify("CREATE TABLE t (a)"), StatementKind::Other);
        assert_eq!(classify("PRAGMA table_info(t)"), StatementKind::Other);
        assert_eq!(classify(""), StatementKind::Other);
    }

    #[test]
    fn leading_comments_are_skipped() {
        assert_eq!(classify("-- note\nDELETE FROM t"), StatementKind::Delete);
        assert_eq!(classify("/* x */ SELECT 1"), StatementKind::Select);
    }

    #[test]
    fn ctes_are_passthrough() {
        assert_eq!(
            classify("WITH x AS (SELECT 1) SELECT * FROM x"),
            StatementKind::Other
        );
    }

    #[test]
    fn unterminated_literal_falls_back_to_prefix() {
        assert_eq!(classify("SELECT 'oops"), StatementKind::Select);
    }

    #[test]
    fn detects_multiple_statements() {
        assert!(!is_multi_statement("SELECT 1;"));
        assert!(!is_multi_statement("SELECT 1;  -- trailing"));
        assert!(!is_multi_statement("SELECT 'a;b' FROM t"));
        assert!(is_multi_statement("SELECT 1; SELECT 2"));
        assert!(is_multi_statement("DELETE FROM t; DROP TABLE u;"));
    }

    #[test]
    fn extracts_targets() {
        assert_eq!(from_table("SELECT a FROM users WHERE a = 1"), Some("users"));
        assert_eq!(
            insert_table("INSERT INTO users (a) VALUES (1)"),
            Some("users")
        );
        assert_eq!(
            insert_table("INSERT OR REPLACE INTO users VALUES (1)"),
            Some("users")
        );
        assert_eq!(update_table("UPDATE users SET a = 1"), Some("users"));
        assert_eq!(
            update_table("UPDATE OR IGNORE users SET a = 1"),
            Some("users")
        );
        assert_eq!(delete_table("delete from users"), Some("users"));
        assert_eq!(delete_table("DELETE users"), None);
        assert_eq!(drop_table("DROP TABLE users;"), Some("users"));
        assert_eq!(drop_table("DROP TABLE IF EXISTS users"), Some("users"));
        assert_eq!(drop_table("DROP VIEW v"), None);
    }

    #[test]
    fn where_clause_spans_lines_and_drops_terminator() {
        assert_eq!(
            where_clause("DELETE FROM t\nWHERE a = 1\n  AND b = 2;"),
            Some("a = 1\n  AND b = 2")
        );
        assert_eq!(where_clause("DELETE FROM t;"), None);
    }

    #[test]
    fn builds_probe_and_rewrites() {
        assert_eq!(
            rowid_probe("t", Some("a = 1")),
            "SELECT rowid FROM t WHERE a = 1"
        );
        assert_eq!(rowid_probe("t", None), "SELECT rowid FROM t");
        assert_eq!(
            with_rowid_projection("select *\nFROM t"),
            "SELECT rowid, *\nFROM t"
        );
        assert_eq!(
            with_returning_rowid("INSERT INTO t VALUES (1);  "),
            "INSERT INTO t VALUES (1) RETURNING rowid"
        );
    }

    #[test]
    fn returning_goes_before_trailing_comments() {
        assert_eq!(
            with_returning_rowid("INSERT INTO t VALUES ('é'); -- add one"),
            "INSERT INTO t VALUES ('é') RETURNING rowid"
        );
        assert_eq!(
            with_returning_rowid("INSERT INTO t\nVALUES (1) /* note */\n-- more\n"),
            "INSERT INTO t\nVALUES (1) RETURNING rowid"
        );
        assert_eq!(
            with_returning_rowid("INSERT INTO t VALUES ('--;')"),
            "INSERT INTO t VALUES ('--;') RETURNING rowid"
        );
    }

    #[test]
    fn where_clause_drops_trailing_comment() {
        assert_eq!(
            where_clause("DELETE FROM t WHERE a = 1; -- old rows"),
            Some("a = 1")
        );
    }
}
