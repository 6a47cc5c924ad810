//! Built-in lessons: each chapter seeds a starting schema and suggests a
//! statement to try.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chapter {
    pub id: &'static str,
    pub description: &'static str,
    /// Setup script run before the lesson, if any.
    pub base_sql: Option<&'static str>,
    pub example_sql: &'static str,
    pub placeholder: &'static str,
}

const DDL: &str = "DDL basics: build tables with CREATE TABLE and remove them with DROP TABLE.";
const DML: &str = "DML basics: add rows with INSERT, read them with SELECT, change them with UPDATE and remove them with DELETE.";

const USERS_TABLE: &str = "CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    username VARCHAR(50) NOT NULL,
    email VARCHAR(100) NOT NULL UNIQUE);";

const USERS_WITH_ROWS: &str = "CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    username VARCHAR(50) NOT NULL,
    email VARCHAR(100) NOT NULL UNIQUE);

INSERT INTO users (username, email)
VALUES
('alice', 'alice@example.com'),
('bob', 'bob@example.com'),
('charlie', 'charlie@example.com');";

pub const CHAPTERS: &[Chapter] = &[
    Chapter {
        id: "create",
        description: DDL,
        base_sql: None,
        example_sql: USERS_TABLE,
        placeholder: "CREATE TABLE users (column1 attributes ..., column2 attributes ..., ...);",
    },
    Chapter {
        id: "alter",
        description: DDL,
        base_sql: Some(USERS_TABLE),
        example_sql: "ALTER TABLE users ADD COLUMN age INT;",
        placeholder: "ALTER TABLE users {ADD | DROP | RENAME} COLUMN column attributes;",
    },
    Chapter {
        id: "drop",
        description: DDL,
        base_sql: Some(USERS_TABLE),
        example_sql: "DROP TABLE users;",
        placeholder: "DROP TABLE table_name;",
    },
    Chapter {
        id: "insert",
        description: DML,
        base_sql: Some(USERS_TABLE),
        example_sql: "INSERT INTO users (username, email)
VALUES
('alice', 'alice@example.com'),
('bob', 'bob@example.com'),
('charlie', 'charlie@example.com');",
        placeholder: "INSERT INTO table_name (column1, column2, ...) VALUES (value1, value2, ...);",
    },
    Chapter {
        id: "select",
        description: DML,
        base_sql: Some(USERS_WITH_ROWS),
        example_sql: "SELECT * FROM users;",
        placeholder: "SELECT {column1, column2, ... | *} FROM table_name WHERE condition;",
    },
    Chapter {
        id: "update",
        description: DML,
        base_sql: Some(USERS_WITH_ROWS),
        example_sql: "UPDATE users SET email = 'bob@example.org' WHERE username = 'bob';",
        placeholder: "UPDATE table_name SET column = value WHERE condition;",
    },
    Chapter {
        id: "delete",
        description: DML,
        base_sql: Some(USERS_WITH_ROWS),
        example_sql: "DELETE FROM users WHERE username = 'alice';",
        placeholder: "DELETE FROM table_name WHERE condition;",
    },
];

/// Case-insensitive lookup by chapter id.
pub fn find(id: &str) -> Option<&'static Chapter> {
    CHAPTERS.iter().find(|c| c.id.eq_ignore_ascii_case(id.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Database, SqliteDatabase};

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(find("DELETE").map(|c| c.id), Some("delete"));
        assert!(find("joins").is_none());
    }

    #[test]
    fn every_base_script_and_example_runs() {
        for chapter in CHAPTERS {
            let mut db = SqliteDatabase::open_in_memory().unwrap();
            if let Some(base) = chapter.base_sql {
                db.execute_batch(base)
                    .unwrap_or_else(|e| panic!("{} base: {e}", chapter.id));
            }
            db.execute(chapter.example_sql)
                .unwrap_or_else(|e| panic!("{} example: {e}", chapter.id));
        }
    }
}
