//! Plain-text table diagrams.
//!
//! Each user table is drawn as a grid. Rows in the impact set carry a
//! marker in the left gutter (`*` normal, `-` pending delete); a table
//! marked as a whole gets the highlight kind appended to its title.

use crate::model::{HighlightKind, ResultSet, RowImpact, RowImpactMap, TableView};
use std::fmt::Write;

fn marker(highlight: HighlightKind) -> char {
    match highlight {
        HighlightKind::Normal => '*',
        HighlightKind::Delete => '-',
        HighlightKind::Drop => 'x',
    }
}

pub fn render_diagram(
    tables: &[TableView],
    impact: &RowImpactMap,
    highlight: HighlightKind,
) -> String {
    if tables.is_empty() {
        return "(no tables)\n".to_string();
    }
    tables
        .iter()
        .map(|t| render_table(t, impact.get(&t.name), highlight))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_table(
    table: &TableView,
    impact: Option<&RowImpact>,
    highlight: HighlightKind,
) -> String {
    let mut title = format!("Table: {}", table.name);
    if matches!(impact, Some(RowImpact::All)) {
        let _ = write!(title, "  [{highlight}]");
    }

    let headers: Vec<String> = table
        .columns
        .iter()
        .map(|c| {
            if c.declared_type.is_empty() {
                c.name.clone()
            } else {
                format!("{} ({})", c.name, c.declared_type)
            }
        })
        .collect();

    let row_marker = marker(highlight);
    let rows: Vec<(Option<char>, Vec<String>)> = table
        .rows
        .iter()
        .map(|(id, row)| {
            let marked = match (impact, id) {
                (Some(rows @ RowImpact::Rows(_)), Some(id)) => rows.contains(*id),
                _ => false,
            };
            let cells = row.values.iter().map(ToString::to_string).collect();
            (marked.then_some(row_marker), cells)
        })
        .collect();

    format!("{title}\n{}", grid(&headers, &rows))
}

pub fn render_result_set(rs: &ResultSet) -> String {
    let rows: Vec<(Option<char>, Vec<String>)> = rs
        .rows
        .iter()
        .map(|r| (None, r.values.iter().map(ToString::to_string).collect()))
        .collect();
    grid(&rs.columns, &rows)
}

fn grid(headers: &[String], rows: &[(Option<char>, Vec<String>)]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for (_, cells) in rows {
        for (i, cell) in cells.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let separator = {
        let mut s = String::from("  +");
        for w in &widths {
            s.push_str(&"-".repeat(w + 2));
            s.push('+');
        }
        s.push('\n');
        s
    };
    let line = |gutter: char, cells: &[String]| {
        let mut s = format!("{gutter} |");
        for (i, w) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let pad = w - cell.chars().count();
            let _ = write!(s, " {cell}{} |", " ".repeat(pad));
        }
        s.push('\n');
        s
    };

    let mut out = separator.clone();
    out.push_str(&line(' ', headers));
    out.push_str(&separator);
    for (mark, cells) in rows {
        out.push_str(&line(mark.unwrap_or(' '), cells));
    }
    out.push_str(&separator);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, ColumnInfo, Row};

    fn users() -> TableView {
        TableView {
            name: "users".into(),
            columns: vec![
                ColumnInfo {
                    name: "id".into(),
                    declared_type: "INTEGER".into(),
                },
                ColumnInfo {
                    name: "name".into(),
                    declared_type: "".into(),
                },
            ],
            rows: vec![
                (
                    Some(1),
                    Row {
                        values: vec![Cell::Int(1), Cell::Text("alice".into())],
                    },
                ),
                (
                    Some(2),
                    Row {
                        values: vec![Cell::Int(2), Cell::Null],
                    },
                ),
            ],
        }
    }

    #[test]
    fn marks_impacted_rows_with_highlight_kind() {
        let out = render_table(
            &users(),
            Some(&RowImpact::Rows(vec![2])),
            HighlightKind::Delete,
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Table: users");
        assert_eq!(lines[2], "  | id (INTEGER) | name  |");
        assert_eq!(lines[4], "  | 1            | alice |");
        assert_eq!(lines[5], "- | 2            | NULL  |");
    }

    #[test]
    fn whole_table_impact_marks_title_not_rows() {
        let out = render_table(&users(), Some(&RowImpact::All), HighlightKind::Drop);
        assert!(out.starts_with("Table: users  [drop]\n"));
        assert!(!out.contains("\nx |"));
    }

    #[test]
    fn diagram_without_tables() {
        assert_eq!(
            render_diagram(&[], &RowImpactMap::new(), HighlightKind::Normal),
            "(no tables)\n"
        );
    }

    #[test]
    fn result_set_grid() {
        let rs = ResultSet {
            columns: vec!["n".into()],
            rows: vec![Row {
                values: vec![Cell::Int(10)],
            }],
        };
        assert_eq!(
            render_result_set(&rs),
            "  +----+\n  | n  |\n  +----+\n  | 10 |\n  +----+\n"
        );
    }
}
