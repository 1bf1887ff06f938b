//! Maps inferred column types onto BigQuery field types.

use gcp_bigquery_client::model::{
    table_field_schema::TableFieldSchema, table_schema::TableSchema,
};

use crate::table::{ColumnType, NormalizedTable};

/// Total mapping; anything the warehouse has no narrower type for is STRING.
pub fn field_type_token(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Integer => "INTEGER",
        ColumnType::Float => "FLOAT",
        ColumnType::Boolean => "BOOLEAN",
        ColumnType::DateTime => "DATETIME",
        ColumnType::Date => "DATE",
        ColumnType::Text => "STRING",
    }
}

/// Destination schema, one field per column in column order.
pub fn table_schema(table: &NormalizedTable) -> TableSchema {
    let fields = table
        .columns
        .iter()
        .map(|col| match col.column_type() {
            ColumnType::Integer => TableFieldSchema::integer(&col.name),
            ColumnType::Float => TableFieldSchema::float(&col.name),
            ColumnType::Boolean => TableFieldSchema::bool(&col.name),
            ColumnType::DateTime => TableFieldSchema::date_time(&col.name),
            ColumnType::Date => TableFieldSchema::date(&col.name),
            ColumnType::Text => TableFieldSchema::string(&col.name),
        })
        .collect();
    TableSchema::new(fields)
}
