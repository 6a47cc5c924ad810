//! Line-oriented front end: SQL accumulates until a line ends with `;`,
//! backslash commands drive the confirm/cancel workflow and lessons.

use crate::chapters::{self, Chapter, CHAPTERS};
use crate::engine::Database;
use crate::error::PlaygroundError;
use crate::pending::GuardOutcome;
use crate::render::{render_diagram, render_result_set};
use crate::router;
use crate::session::Session;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Sql(String),
    Confirm,
    Cancel,
    ConfirmDelete,
    CancelDelete,
    ConfirmDrop,
    CancelDrop,
    Tables,
    Chapters,
    Chapter(String),
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parses a backslash command line.
    pub fn parse_meta(line: &str) -> Command {
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or("");
        match name {
            "\\confirm" | "\\y" => Command::Confirm,
            "\\cancel" | "\\n" => Command::Cancel,
            "\\confirm-delete" => Command::ConfirmDelete,
            "\\cancel-delete" => Command::CancelDelete,
            "\\confirm-drop" => Command::ConfirmDrop,
            "\\cancel-drop" => Command::CancelDrop,
            "\\tables" | "\\dt" => Command::Tables,
            "\\chapters" => Command::Chapters,
            "\\chapter" => match parts.next() {
                Some(id) => Command::Chapter(id.to_string()),
                None => Command::Chapters,
            },
            "\\help" | "\\?" => Command::Help,
            "\\quit" | "\\q" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

const HELP: &str = "\
Enter SQL terminated by ';'. DELETE and DROP are previewed first.
  \\confirm, \\cancel          resolve the pending DELETE or DROP
  \\confirm-delete, \\cancel-delete
  \\confirm-drop, \\cancel-drop
  \\tables                     redraw the table diagram
  \\chapters, \\chapter <id>   list lessons or show one
  \\help, \\quit
";

/// Reads commands from `input` until EOF or `\quit`, writing all output to `out`.
pub fn run<D, R, W>(session: &mut Session<D>, input: R, out: &mut W) -> Result<(), PlaygroundError>
where
    D: Database,
    R: BufRead,
    W: Write,
{
    let mut buffer = String::new();
    let mut lines = input.lines();
    loop {
        write!(out, "{}", if buffer.is_empty() { "sql> " } else { "...> " })?;
        out.flush()?;

        let Some(line) = lines.next().transpose()? else {
            if !buffer.trim().is_empty() {
                writeln!(out)?;
                dispatch(session, Command::Sql(std::mem::take(&mut buffer)), out)?;
            }
            writeln!(out)?;
            return Ok(());
        };

        let trimmed = line.trim();
        if buffer.is_empty() && trimmed.starts_with('\\') {
            if !dispatch(session, Command::parse_meta(trimmed), out)? {
                return Ok(());
            }
            continue;
        }
        if buffer.is_empty() && trimmed.is_empty() {
            continue;
        }

        buffer.push_str(&line);
        buffer.push('\n');
        if trimmed.ends_with(';') {
            dispatch(session, Command::Sql(std::mem::take(&mut buffer)), out)?;
        }
    }
}

/// Runs one command. Returns `false` when the loop should stop.
fn dispatch<D: Database, W: Write>(
    session: &mut Session<D>,
    command: Command,
    out: &mut W,
) -> Result<bool, PlaygroundError> {
    match command {
        Command::Sql(sql) => {
            let result = router::execute(&sql, session);
            writeln!(out, "Affected rows: {}", result.affected_count)?;
            writeln!(out, "{}", result.message)?;
            if let Some(rs) = &result.result_set {
                write!(out, "{}", render_result_set(rs))?;
            }
            if session.pending().is_some() {
                writeln!(out, "Type \\confirm to apply or \\cancel to discard.")?;
            }
            draw(session, out)?;
        }
        Command::Confirm => report(session.confirm(), session, out)?,
        Command::ConfirmDelete => report(session.confirm_delete(), session, out)?,
        Command::ConfirmDrop => report(session.confirm_drop(), session, out)?,
        Command::Cancel => report(Ok(session.cancel()), session, out)?,
        Command::CancelDelete => report(Ok(session.cancel_delete()), session, out)?,
        Command::CancelDrop => report(Ok(session.cancel_drop()), session, out)?,
        Command::Tables => draw(session, out)?,
        Command::Chapters => {
            for chapter in CHAPTERS {
                writeln!(out, "{:<8} {}", chapter.id, chapter.example_sql.lines().next().unwrap_or(""))?;
            }
        }
        Command::Chapter(id) => match chapters::find(&id) {
            Some(chapter) => describe_chapter(chapter, out)?,
            None => writeln!(out, "Unknown chapter: {id}")?,
        },
        Command::Help => write!(out, "{HELP}")?,
        Command::Quit => return Ok(false),
        Command::Unknown(line) => writeln!(out, "Unknown command: {line} (try \\help)")?,
    }
    Ok(true)
}

fn report<D: Database, W: Write>(
    outcome: Result<Option<GuardOutcome>, PlaygroundError>,
    session: &mut Session<D>,
    out: &mut W,
) -> Result<(), PlaygroundError> {
    match outcome {
        Ok(Some(outcome)) => {
            writeln!(out, "{outcome}")?;
            draw(session, out)?;
        }
        Ok(None) => writeln!(out, "Nothing pending.")?,
        Err(e) => writeln!(out, "Error: {e}")?,
    }
    Ok(())
}

fn draw<D: Database, W: Write>(session: &mut Session<D>, out: &mut W) -> Result<(), PlaygroundError> {
    match session.tables() {
        Ok(tables) => {
            let diagram = render_diagram(&tables, session.last_impact(), session.highlight());
            write!(out, "{diagram}")?;
        }
        Err(e) => writeln!(out, "Error: {e}")?,
    }
    Ok(())
}

pub fn describe_chapter<W: Write>(chapter: &Chapter, out: &mut W) -> Result<(), PlaygroundError> {
    writeln!(out, "Chapter {}: {}", chapter.id, chapter.description)?;
    if let Some(base) = chapter.base_sql {
        writeln!(out, "-- setup\n{base}")?;
    }
    writeln!(out, "-- try\n{}", chapter.example_sql)?;
    writeln!(out, "-- form\n{}", chapter.placeholder)?;
    Ok(())
}
