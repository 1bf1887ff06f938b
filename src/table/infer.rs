//! Per-column type inference over raw spreadsheet cells.
//!
//! The classifier walks a fixed candidate order — integer, float, boolean,
//! date, datetime — and picks the first type every non-empty cell in the
//! column parses as. Text is the fallback for mixed or unparseable content,
//! and for columns with no non-empty cells at all.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::{Column, ColumnType, ColumnValues};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Candidate order. Earlier entries are narrower; `Text` is absent because it
/// always matches.
const CANDIDATES: [ColumnType; 5] = [
    ColumnType::Integer,
    ColumnType::Float,
    ColumnType::Boolean,
    ColumnType::Date,
    ColumnType::DateTime,
];

pub fn column_type(cells: &[&Value]) -> ColumnType {
    let non_empty: Vec<&Value> = cells.iter().copied().filter(|c| !is_empty(c)).collect();
    if non_empty.is_empty() {
        return ColumnType::Text;
    }
    CANDIDATES
        .into_iter()
        .find(|ty| non_empty.iter().all(|cell| parses_as(cell, *ty)))
        .unwrap_or(ColumnType::Text)
}

/// Build the typed column for an already-chosen type. Empty cells become
/// `None`; non-empty cells are guaranteed parseable by `column_type`.
pub fn materialize(name: String, cells: &[&Value], ty: ColumnType) -> Column {
    let values = match ty {
        ColumnType::Integer => ColumnValues::Integer(cells.iter().map(|c| as_integer(c)).collect()),
        ColumnType::Float => ColumnValues::Float(cells.iter().map(|c| as_float(c)).collect()),
        ColumnType::Boolean => ColumnValues::Boolean(cells.iter().map(|c| as_boolean(c)).collect()),
        ColumnType::Date => ColumnValues::Date(cells.iter().map(|c| as_date(c)).collect()),
        ColumnType::DateTime => {
            ColumnValues::DateTime(cells.iter().map(|c| as_datetime(c)).collect())
        }
        ColumnType::Text => ColumnValues::Text(
            cells
                .iter()
                .map(|c| if is_empty(c) { None } else { Some(cell_text(c)) })
                .collect(),
        ),
    };
    Column { name, values }
}

pub fn is_empty(cell: &Value) -> bool {
    match cell {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Text form of any cell, used for header names and text columns.
pub fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn parses_as(cell: &Value, ty: ColumnType) -> bool {
    match ty {
        ColumnType::Integer => as_integer(cell).is_some(),
        ColumnType::Float => as_float(cell).is_some(),
        ColumnType::Boolean => as_boolean(cell).is_some(),
        ColumnType::Date => as_date(cell).is_some(),
        ColumnType::DateTime => as_datetime(cell).is_some(),
        ColumnType::Text => true,
    }
}

fn as_integer(cell: &Value) -> Option<i64> {
    match cell {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_float(cell: &Value) -> Option<f64> {
    match cell {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_boolean(cell: &Value) -> Option<bool> {
    match cell {
        Value::Bool(b) => Some(*b),
        Value::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") {
                Some(true)
            } else if s.eq_ignore_ascii_case("false") {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn as_date(cell: &Value) -> Option<NaiveDate> {
    match cell {
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok(),
        _ => None,
    }
}

fn as_datetime(cell: &Value) -> Option<NaiveDateTime> {
    match cell {
        Value::String(s) => DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s.trim(), fmt).ok()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn infer(cells: &[Value]) -> ColumnType {
        let refs: Vec<&Value> = cells.iter().collect();
        column_type(&refs)
    }

    #[test]
    fn all_integers_stay_integer() {
        assert_eq!(
            infer(&[json!("1"), json!("-42"), json!(7)]),
            ColumnType::Integer
        );
    }

    #[test]
    fn one_decimal_widens_to_float() {
        assert_eq!(
            infer(&[json!("1"), json!("9.5"), json!("3")]),
            ColumnType::Float
        );
    }

    #[test]
    fn any_plain_text_forces_text() {
        assert_eq!(infer(&[json!("1"), json!("Ann")]), ColumnType::Text);
    }

    #[test]
    fn booleans_any_case() {
        assert_eq!(
            infer(&[json!("TRUE"), json!("false"), json!(true)]),
            ColumnType::Boolean
        );
    }

    #[test]
    fn dates_and_datetimes_stay_distinct() {
        assert_eq!(infer(&[json!("2023-10-01")]), ColumnType::Date);
        assert_eq!(infer(&[json!("2023-10-01 12:30:00")]), ColumnType::DateTime);
        assert_eq!(infer(&[json!("2023-10-01T12:30:00")]), ColumnType::DateTime);
        // mixing the two granularities satisfies neither, so text wins
        assert_eq!(
            infer(&[json!("2023-10-01"), json!("2023-10-01 12:30:00")]),
            ColumnType::Text
        );
    }

    #[test]
    fn empty_cells_do_not_count() {
        assert_eq!(
            infer(&[json!(""), json!("2"), Value::Null, json!("  ")]),
            ColumnType::Integer
        );
    }

    #[test]
    fn all_empty_column_falls_back_to_text() {
        assert_eq!(infer(&[json!(""), Value::Null]), ColumnType::Text);
        assert_eq!(infer(&[]), ColumnType::Text);
    }

    #[test]
    fn materialize_keeps_empty_cells_as_none() {
        let cells = [json!("1"), json!(""), json!("3")];
        let refs: Vec<&Value> = cells.iter().collect();
        let col = materialize("n".into(), &refs, ColumnType::Integer);
        assert_eq!(
            col.values,
            ColumnValues::Integer(vec![Some(1), None, Some(3)])
        );
    }
}
