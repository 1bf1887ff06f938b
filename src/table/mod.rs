//! In-memory columnar table built from a raw spreadsheet grid.

pub mod infer;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::warn;

use crate::error::{PipelineError, Result};

/// Raw cell grid exactly as the Sheets API returned it. Row 0 is the header;
/// rows may be ragged because trailing empty cells are not sent by the server.
pub type RawGrid = Vec<Vec<Value>>;

static EMPTY_CELL: Value = Value::Null;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    Text,
}

/// Values of one column, all the same length as the table's row count.
/// Empty cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Integer(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    Date(Vec<Option<NaiveDate>>),
    DateTime(Vec<Option<NaiveDateTime>>),
    Text(Vec<Option<String>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn column_type(&self) -> ColumnType {
        match self.values {
            ColumnValues::Integer(_) => ColumnType::Integer,
            ColumnValues::Float(_) => ColumnType::Float,
            ColumnValues::Boolean(_) => ColumnType::Boolean,
            ColumnValues::Date(_) => ColumnType::Date,
            ColumnValues::DateTime(_) => ColumnType::DateTime,
            ColumnValues::Text(_) => ColumnType::Text,
        }
    }

    pub fn len(&self) -> usize {
        match &self.values {
            ColumnValues::Integer(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Boolean(v) => v.len(),
            ColumnValues::Date(v) => v.len(),
            ColumnValues::DateTime(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Typed table in header order. Column names are taken verbatim from row 0;
/// duplicate or blank headers are passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub columns: Vec<Column>,
    pub row_count: usize,
}

impl NormalizedTable {
    /// Split the grid into header + data and infer one type per column.
    /// A grid without any rows at all is an error; a header-only grid is a
    /// valid zero-row table. Rows shorter than the header read as empty cells
    /// for the missing positions.
    pub fn from_grid(grid: RawGrid) -> Result<Self> {
        let mut rows = grid.into_iter();
        let header = rows.next().ok_or(PipelineError::EmptySource)?;
        let data: Vec<Vec<Value>> = rows.collect();

        if data.iter().any(|r| r.len() > header.len()) {
            warn!(
                "some rows have more cells than the {}-column header; extra cells ignored",
                header.len()
            );
        }

        let row_count = data.len();
        let columns = header
            .iter()
            .enumerate()
            .map(|(idx, name_cell)| {
                let cells: Vec<&Value> = data
                    .iter()
                    .map(|row| row.get(idx).unwrap_or(&EMPTY_CELL))
                    .collect();
                let ty = infer::column_type(&cells);
                infer::materialize(infer::cell_text(name_cell), &cells, ty)
            })
            .collect();

        Ok(NormalizedTable { columns, row_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn grid(rows: &[&[&str]]) -> RawGrid {
        rows.iter()
            .map(|r| r.iter().map(|c| json!(c)).collect())
            .collect()
    }

    #[test]
    fn empty_grid_is_an_error() {
        let err = NormalizedTable::from_grid(Vec::new()).unwrap_err();
        assert!(matches!(err, PipelineError::EmptySource));
    }

    #[test]
    fn header_only_grid_gives_zero_row_table() {
        let table = NormalizedTable::from_grid(grid(&[&["id", "name"]])).unwrap();
        assert_eq!(table.row_count, 0);
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[0].name, "id");
        assert_eq!(table.columns[1].name, "name");
        // no data to go on, so everything falls back to text
        assert!(table.columns.iter().all(|c| c.column_type() == ColumnType::Text));
    }

    #[test]
    fn typical_grid_normalizes_per_column() {
        let table = NormalizedTable::from_grid(grid(&[
            &["id", "name", "score"],
            &["1", "Ann", "9.5"],
        ]))
        .unwrap();

        assert_eq!(table.row_count, 1);
        assert_eq!(
            table.columns[0].values,
            ColumnValues::Integer(vec![Some(1)])
        );
        assert_eq!(
            table.columns[1].values,
            ColumnValues::Text(vec![Some("Ann".to_string())])
        );
        assert_eq!(
            table.columns[2].values,
            ColumnValues::Float(vec![Some(9.5)])
        );
    }

    #[test]
    fn ragged_rows_pad_with_empty_cells() {
        let table = NormalizedTable::from_grid(grid(&[
            &["a", "b", "c"],
            &["1", "x"],
            &["2", "y", "z"],
        ]))
        .unwrap();

        assert_eq!(table.row_count, 2);
        assert_eq!(
            table.columns[2].values,
            ColumnValues::Text(vec![None, Some("z".to_string())])
        );
        assert!(table.columns.iter().all(|c| c.len() == 2));
    }

    #[test]
    fn rows_longer_than_header_drop_extra_cells() {
        let table = NormalizedTable::from_grid(grid(&[&["a"], &["1", "spill"]])).unwrap();
        assert_eq!(table.columns.len(), 1);
        assert_eq!(
            table.columns[0].values,
            ColumnValues::Integer(vec![Some(1)])
        );
    }

    #[test]
    fn native_json_cells_normalize_too() {
        let table = NormalizedTable::from_grid(vec![
            vec![json!("n"), json!("flag")],
            vec![json!(3), json!(true)],
        ])
        .unwrap();
        assert_eq!(table.columns[0].column_type(), ColumnType::Integer);
        assert_eq!(
            table.columns[1].values,
            ColumnValues::Boolean(vec![Some(true)])
        );
    }
}
