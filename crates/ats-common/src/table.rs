//! Candidate table loading.
//!
//! The table arrives as a JSON array of row objects exported from the talent
//! sheet. Spreadsheet exports are loosely typed (`"Yes"` for flags, numbers
//! as text, blank cells as `""`), so each cell is coerced against the column's
//! declared [`FieldKind`] before the row becomes a [`Candidate`].

use std::{fs::File, io::BufReader, io::Read, path::Path};

use serde_json::{Map, Number, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    field::{known_field_kind, FieldKind},
    Candidate,
};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read candidate table: {0}")]
    Io(#[from] std::io::Error),
    #[error("candidate table is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("candidate table must be a JSON array of rows")]
    NotAnArray,
    #[error("row {index} is not a valid candidate: {source}")]
    Row {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

pub fn load_candidates_from_path(path: impl AsRef<Path>) -> Result<Vec<Candidate>, TableError> {
    let path = path.as_ref();
    let candidates = load_candidates(BufReader::new(File::open(path)?))?;
    info!(path = %path.display(), rows = candidates.len(), "loaded candidate table");
    Ok(candidates)
}

pub fn load_candidates<R: Read>(reader: R) -> Result<Vec<Candidate>, TableError> {
    let table: Value = serde_json::from_reader(reader)?;
    let Value::Array(rows) = table else {
        return Err(TableError::NotAnArray);
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            let row = match row {
                Value::Object(cells) => Value::Object(coerce_row(index, cells)),
                other => other,
            };
            serde_json::from_value(row).map_err(|source| TableError::Row { index, source })
        })
        .collect()
}

fn coerce_row(index: usize, cells: Map<String, Value>) -> Map<String, Value> {
    cells
        .into_iter()
        .map(|(column, value)| {
            let value = match known_field_kind(&column) {
                Some(kind) => coerce_known(index, &column, kind, value),
                None => coerce_dynamic(value),
            };
            (column, value)
        })
        .collect()
}

fn coerce_known(index: usize, column: &str, kind: FieldKind, value: Value) -> Value {
    let coerced = match (kind, value) {
        (_, Value::Null) => Some(Value::Null),
        (FieldKind::Text, Value::String(s)) => Some(Value::String(s)),
        (FieldKind::Text, Value::Number(n)) => Some(Value::String(n.to_string())),
        (FieldKind::Text, Value::Bool(b)) => Some(Value::String(if b { "Yes" } else { "No" }.into())),
        // list cells from richer exports are folded back into the delimited form
        (FieldKind::Text, Value::Array(items)) => join_list(column, &items).map(Value::String),
        (FieldKind::Number, Value::Number(n)) => Some(number_cell(column, n)),
        (FieldKind::Number, Value::String(s)) if s.trim().is_empty() => Some(Value::Null),
        (FieldKind::Number, Value::String(s)) => parse_number(&s).map(|n| number_cell(column, n)),
        (FieldKind::Bool, Value::Bool(b)) => Some(Value::Bool(b)),
        (FieldKind::Bool, Value::String(s)) if s.trim().is_empty() => Some(Value::Null),
        (FieldKind::Bool, Value::String(s)) => parse_flag(&s).map(Value::Bool),
        _ => None,
    };

    coerced.unwrap_or_else(|| {
        warn!(row = index, column, kind = kind.as_ref(), "unreadable cell; treating as missing");
        Value::Null
    })
}

fn coerce_dynamic(value: Value) -> Value {
    match value {
        Value::String(s) => {
            if let Some(flag) = parse_flag(&s) {
                Value::Bool(flag)
            } else if let Some(n) = parse_number(&s) {
                Value::Number(n)
            } else {
                Value::String(s)
            }
        }
        other => other,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim() {
        "Yes" | "true" | "TRUE" => Some(true),
        "No" | "false" | "FALSE" => Some(false),
        _ => None,
    }
}

fn parse_number(raw: &str) -> Option<Number> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n.into());
    }
    trimmed.parse::<f64>().ok().and_then(Number::from_f64)
}

// `id` is integral; spreadsheet exports often write it as `7.0`.
fn number_cell(column: &str, n: Number) -> Value {
    if column == "id" {
        if let Some(whole) = n.as_f64().filter(|f| f.fract() == 0.0) {
            return Value::from(whole as i64);
        }
    }
    Value::Number(n)
}

fn join_list(column: &str, items: &[Value]) -> Option<String> {
    let separator = match column {
        "skills" => ";",
        "tags" => ",",
        _ => return None,
    };
    let parts: Option<Vec<String>> = items
        .iter()
        .map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect();
    parts.map(|parts| parts.join(separator))
}
