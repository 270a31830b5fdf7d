//! SQL seed file reader.
//!
//! Understands just enough SQL to pull rows out of a seed script:
//!
//!   INSERT INTO AssetDiagnostics (diagnostic_id, asset_id, ...) VALUES
//!     (1, 'T-123', ...),
//!     (2, 'B-456', ...);
//!
//! Everything else (CREATE TABLE, PRAGMA, comments) is skipped.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Number, Value};
use substation_core::Dataset;
use thiserror::Error;
use tracing::{debug, warn};

static INSERT_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^INSERT\s+INTO\s+[`\x22]?(\w+)[`\x22]?\s*\(([^)]*)\)\s*VALUES\s*(.*)$")
        .expect("insert pattern")
});

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unterminated string literal near byte {0}")]
    UnterminatedString(usize),
    #[error("{table}: expected {columns} values per row, found {values}")]
    ColumnMismatch {
        table: String,
        columns: usize,
        values: usize,
    },
    #[error("{table}: malformed VALUES list: {message}")]
    Syntax { table: String, message: String },
    #[error("rows do not match the table layout: {0}")]
    Rows(#[from] serde_json::Error),
}

/// Split a script into statements on `;`, dropping `--` and `/* */` comments.
fn split_statements(text: &str) -> Result<Vec<String>, IngestError> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut chars = text.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '\'' => {
                cur.push(c);
                loop {
                    match chars.next() {
                        Some((_, '\'')) => {
                            cur.push('\'');
                            // '' is an escaped quote
                            if matches!(chars.peek(), Some((_, '\''))) {
                                chars.next();
                                cur.push('\'');
                            } else {
                                break;
                            }
                        }
                        Some((_, ch)) => cur.push(ch),
                        None => return Err(IngestError::UnterminatedString(pos)),
                    }
                }
            }
            '-' if matches!(chars.peek(), Some((_, '-'))) => {
                for (_, ch) in chars.by_ref() {
                    if ch == '\n' {
                        cur.push('\n');
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                let mut prev = ' ';
                for (_, ch) in chars.by_ref() {
                    if prev == '*' && ch == '/' {
                        break;
                    }
                    prev = ch;
                }
                cur.push(' ');
            }
            ';' => {
                if !cur.trim().is_empty() {
                    out.push(cur.trim().to_string());
                }
                cur.clear();
            }
            _ => cur.push(c),
        }
    }
    if !cur.trim().is_empty() {
        out.push(cur.trim().to_string());
    }
    Ok(out)
}

/// Parse `(a, 'b', NULL), (...)` into rows of JSON values.
fn parse_tuples(table: &str, src: &str) -> Result<Vec<Vec<Value>>, IngestError> {
    let syntax = |message: &str| IngestError::Syntax {
        table: table.to_string(),
        message: message.to_string(),
    };

    let chars: Vec<char> = src.chars().collect();
    let mut i = 0;
    let mut rows = Vec::new();

    let skip_ws = |i: &mut usize| {
        while *i < chars.len() && chars[*i].is_whitespace() {
            *i += 1;
        }
    };

    loop {
        skip_ws(&mut i);
        if i >= chars.len() {
            break;
        }
        if chars[i] != '(' {
            return Err(syntax("expected '('"));
        }
        i += 1;

        let mut row = Vec::new();
        loop {
            skip_ws(&mut i);
            if i >= chars.len() {
                return Err(syntax("unexpected end of row"));
            }
            if chars[i] == '\'' {
                i += 1;
                let mut s = String::new();
                loop {
                    match chars.get(i) {
                        Some('\'') if chars.get(i + 1) == Some(&'\'') => {
                            s.push('\'');
                            i += 2;
                        }
                        Some('\'') => {
                            i += 1;
                            break;
                        }
                        Some(ch) => {
                            s.push(*ch);
                            i += 1;
                        }
                        None => return Err(syntax("unterminated string")),
                    }
                }
                row.push(Value::String(s));
            } else {
                let start = i;
                while i < chars.len() && chars[i] != ',' && chars[i] != ')' {
                    i += 1;
                }
                let raw: String = chars[start..i].iter().collect();
                row.push(scalar(raw.trim()).ok_or_else(|| syntax(&format!("bad value `{}`", raw.trim())))?);
            }

            skip_ws(&mut i);
            match chars.get(i) {
                Some(',') => i += 1,
                Some(')') => {
                    i += 1;
                    break;
                }
                _ => return Err(syntax("expected ',' or ')'")),
            }
        }
        rows.push(row);

        skip_ws(&mut i);
        if chars.get(i) == Some(&',') {
            i += 1;
        }
    }
    Ok(rows)
}

/// Unquoted literal: NULL, TRUE/FALSE, or a number.
fn scalar(raw: &str) -> Option<Value> {
    match raw.to_ascii_uppercase().as_str() {
        "NULL" => return Some(Value::Null),
        "TRUE" => return Some(Value::Bool(true)),
        "FALSE" => return Some(Value::Bool(false)),
        _ => {}
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Value::Number(n.into()));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

/// Canonical table name for a name as written in the script.
fn known_table(name: &str) -> Option<&'static str> {
    Dataset::default()
        .table_counts()
        .into_iter()
        .map(|(table, _)| table)
        .find(|table| table.eq_ignore_ascii_case(name))
}

/// Read every INSERT in a seed script into a `Dataset`.
pub fn parse_sql_seed(text: &str) -> Result<Dataset, IngestError> {
    let mut tables: Map<String, Value> = Map::new();

    for stmt in split_statements(text)? {
        let Some(caps) = INSERT_HEAD.captures(&stmt) else {
            continue;
        };
        let name = &caps[1];
        let Some(table) = known_table(name) else {
            warn!(table = name, "skipping rows for unknown table");
            continue;
        };

        let columns: Vec<String> = caps[2]
            .split(',')
            .map(|c| c.trim().trim_matches(['`', '"']).to_string())
            .collect();
        let rows = parse_tuples(table, &caps[3])?;
        debug!(table, rows = rows.len(), "parsed insert");

        let target = tables
            .entry(table.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        let Value::Array(target) = target else {
            continue;
        };
        for values in rows {
            if values.len() != columns.len() {
                return Err(IngestError::ColumnMismatch {
                    table: table.to_string(),
                    columns: columns.len(),
                    values: values.len(),
                });
            }
            // NULL columns are left out so the row type's defaults apply
            let row: Map<String, Value> = columns
                .iter()
                .cloned()
                .zip(values)
                .filter(|(_, v)| !v.is_null())
                .collect();
            target.push(Value::Object(row));
        }
    }

    Ok(serde_json::from_value(Value::Object(tables))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements_ignore_semicolons_in_strings_and_comments() {
        let stmts = split_statements(
            "-- seed; data\nCREATE TABLE x (a TEXT);\n/* a; b */ INSERT INTO x (a) VALUES ('1;2');",
        )
        .unwrap();
        assert_eq!(stmts.len(), 2);
        assert!(stmts[1].ends_with("VALUES ('1;2')"));
    }

    #[test]
    fn test_tuples_with_escapes_and_literals() {
        let rows = parse_tuples("t", "(1, 'O''Brien', NULL, TRUE, 85.0),\n (2, '', FALSE, false, -3)")
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1], Value::String("O'Brien".to_string()));
        assert_eq!(rows[0][2], Value::Null);
        assert_eq!(rows[0][3], Value::Bool(true));
        assert_eq!(rows[0][4].as_f64(), Some(85.0));
        assert_eq!(rows[1][4].as_i64(), Some(-3));
    }

    #[test]
    fn test_parse_inventory_insert() {
        let sql = r#"
INSERT INTO Inventory (part_id, asset_id, asset_name, part_name, available_quantity, order_status, location) VALUES
(10001, 'T-987', 'Transformer T-987', 'Bushings', 5, 'In Stock', 'Warehouse A');
"#;
        let db = parse_sql_seed(sql).unwrap();
        assert_eq!(db.inventory.len(), 1);
        assert_eq!(db.inventory[0].part_name, "Bushings");
        assert!(db.asset_diagnostics.is_empty());
    }

    #[test]
    fn test_null_columns_take_defaults() {
        let sql = r#"
INSERT INTO AssetDiagnostics (diagnostic_id, asset_id, asset_name, health_score, last_diagnostic_date, diagnostic_summary, data_source) VALUES
(1, 'T-1', 'Transformer T-1', NULL, '2025-04-05 08:30:00', NULL, 'PI');
INSERT INTO TrainingMaterials (training_id, topic, content, certification_required, reference_manual, url) VALUES
(7, 'Relay Testing', NULL, NULL, NULL, NULL);
"#;
        let db = parse_sql_seed(sql).unwrap();
        let diag = db.asset_health("T-1").unwrap();
        assert_eq!(diag.health_score, None);
        assert_eq!(diag.diagnostic_summary, "");
        assert_eq!(diag.data_source, "PI");
        let t = &db.training_materials[0];
        assert!(!t.certification_required);
        assert_eq!(t.url, "");
    }

    #[test]
    fn test_null_in_required_column_is_an_error() {
        let sql = "INSERT INTO AssetDiagnostics (diagnostic_id, asset_id, asset_name, last_diagnostic_date) \
                   VALUES (1, 'T-1', 'Transformer T-1', NULL);";
        assert!(matches!(parse_sql_seed(sql), Err(IngestError::Rows(_))));
    }

    #[test]
    fn test_unknown_table_is_skipped() {
        let db = parse_sql_seed("INSERT INTO Users (id, name) VALUES (1, 'x');").unwrap();
        assert_eq!(db, Dataset::default());
    }

    #[test]
    fn test_column_mismatch_names_table() {
        let err = parse_sql_seed(
            "INSERT INTO Inventory (part_id, asset_id) VALUES (1, 'T-1', 'extra');",
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::ColumnMismatch { columns: 2, values: 3, .. }));
        assert!(err.to_string().starts_with("Inventory:"));
    }

    #[test]
    fn test_wrong_types_are_row_errors() {
        let err = parse_sql_seed(
            "INSERT INTO Inventory (part_id, asset_id, asset_name, part_name, available_quantity, order_status, location) VALUES ('x', 'T-1', 'n', 'p', 1, 's', 'l');",
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::Rows(_)));
    }
}
