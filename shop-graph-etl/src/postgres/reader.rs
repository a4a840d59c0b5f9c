// PostgreSQL data reading: full-table scans decoded into column-keyed records
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::postgres::{PgRow, PgTypeInfo, PgTypeKind};
use sqlx::{Column, Row, TypeInfo};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::connection::PostgresSource;
use crate::errors::RelationalError;
use crate::interfaces::RelationalSource;
use crate::models::{Record, Value};

#[async_trait]
impl RelationalSource for PostgresSource {
    async fn ping(&self) -> Result<(), RelationalError> {
        self.round_trip().await
    }

    async fn fetch_table(&self, table: &str) -> Result<Vec<Record>, RelationalError> {
        let sql = format!("SELECT * FROM {}", table);
        let rows = sqlx::query(&sql).fetch_all(self.pool()).await?;
        debug!(table, rows = rows.len(), "Fetched table");

        if let Some(first) = rows.first() {
            for column in first.columns() {
                if !is_decodable(column.type_info()) {
                    warn!(
                        table,
                        column = column.name(),
                        type_name = column.type_info().name(),
                        "Column type not decoded, values read as NULL"
                    );
                }
            }
        }

        rows.iter().map(decode_row).collect()
    }

    async fn close(&self) {
        self.pool().close().await;
        info!("PostgreSQL connection released");
    }
}

/// Column types decoded into a [`Value`].
const DECODED_TYPES: [&str; 15] = [
    "BOOL",
    "INT2",
    "INT4",
    "INT8",
    "FLOAT4",
    "FLOAT8",
    "NUMERIC",
    "TEXT",
    "VARCHAR",
    "BPCHAR",
    "NAME",
    "UUID",
    "DATE",
    "TIMESTAMP",
    "TIMESTAMPTZ",
];

fn decodes_type_name(name: &str) -> bool {
    DECODED_TYPES.contains(&name)
}

fn is_decodable(type_info: &PgTypeInfo) -> bool {
    decodes_type_name(type_info.name()) || matches!(type_info.kind(), PgTypeKind::Enum(_))
}

/// Decode one row using the result-set metadata for names, order and types.
///
/// Columns of other types (JSON, arrays, intervals, ...) are kept by name with
/// a NULL value; typed-row decoding fails later only if such a column is one
/// the loader needs.
fn decode_row(row: &PgRow) -> Result<Record, RelationalError> {
    let mut record = Record::new();
    for column in row.columns() {
        let idx = column.ordinal();
        let type_info = column.type_info();

        if !is_decodable(type_info) {
            record.push(column.name(), Value::Null);
            continue;
        }

        let value = match type_info.name() {
            "BOOL" => row.try_get::<Option<bool>, _>(idx)?.map(Value::Bool),
            "INT2" => row
                .try_get::<Option<i16>, _>(idx)?
                .map(|v| Value::Int(v.into())),
            "INT4" => row
                .try_get::<Option<i32>, _>(idx)?
                .map(|v| Value::Int(v.into())),
            "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(Value::Int),
            "FLOAT4" => row
                .try_get::<Option<f32>, _>(idx)?
                .map(|v| Value::Float(v.into())),
            "FLOAT8" => row.try_get::<Option<f64>, _>(idx)?.map(Value::Float),
            "NUMERIC" => row
                .try_get::<Option<BigDecimal>, _>(idx)?
                .map(Value::Decimal),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
                row.try_get::<Option<String>, _>(idx)?.map(Value::Text)
            }
            "UUID" => row
                .try_get::<Option<Uuid>, _>(idx)?
                .map(|u| Value::Text(u.to_string())),
            "DATE" => row.try_get::<Option<NaiveDate>, _>(idx)?.map(Value::Date),
            "TIMESTAMP" => row
                .try_get::<Option<NaiveDateTime>, _>(idx)?
                .map(Value::Timestamp),
            "TIMESTAMPTZ" => row
                .try_get::<Option<DateTime<Utc>>, _>(idx)?
                .map(Value::TimestampTz),
            // Enum labels travel as text on the wire
            _ => row
                .try_get_unchecked::<Option<String>, _>(idx)?
                .map(Value::Text),
        };

        record.push(column.name(), value.unwrap_or(Value::Null));
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_types_decoded() {
        for name in ["INT8", "NUMERIC", "VARCHAR", "UUID", "DATE", "TIMESTAMPTZ"] {
            assert!(decodes_type_name(name), "{name} should be decoded");
        }
    }

    #[test]
    fn test_other_types_skipped() {
        for name in ["JSONB", "JSON", "INT4[]", "INTERVAL", "TIME", "MONEY", "CHAR"] {
            assert!(!decodes_type_name(name), "{name} should be read as NULL");
        }
    }
}
