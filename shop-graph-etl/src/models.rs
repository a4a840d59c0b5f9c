// Data models for the migration: raw records, typed rows and the extracted dataset
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt;

use crate::errors::ExtractionError;
use crate::migration::LoadPhase;

/// A single decoded cell, independent of either store.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(BigDecimal),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::Timestamp(_) => "timestamp",
            Value::TimestampTz(_) => "timestamptz",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<NaturalKey> for Value {
    fn from(key: NaturalKey) -> Self {
        match key {
            NaturalKey::Int(i) => Value::Int(i),
            NaturalKey::Text(s) => Value::Text(s),
        }
    }
}

/// Source-provided identifier used to deduplicate nodes across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NaturalKey {
    Int(i64),
    Text(String),
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NaturalKey::Int(i) => write!(f, "{}", i),
            NaturalKey::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for NaturalKey {
    fn from(value: i64) -> Self {
        NaturalKey::Int(value)
    }
}

impl From<&str> for NaturalKey {
    fn from(value: &str) -> Self {
        NaturalKey::Text(value.to_string())
    }
}

/// One row of a table scan: column names in result-set order, each with its value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. Order of calls is the column order.
    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        self.fields.push((column.into(), value));
    }

    /// Builder-style [`Record::push`].
    pub fn with(mut self, column: impl Into<String>, value: Value) -> Self {
        self.push(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

/// Column accessor that attaches table/row context to decoding failures.
pub struct RowReader<'a> {
    table: &'a str,
    row: usize,
    record: &'a Record,
}

impl<'a> RowReader<'a> {
    pub fn new(table: &'a str, row: usize, record: &'a Record) -> Self {
        Self { table, row, record }
    }

    fn value(&self, column: &str) -> Result<&'a Value, ExtractionError> {
        self.record
            .get(column)
            .ok_or_else(|| ExtractionError::MissingColumn {
                table: self.table.to_string(),
                row: self.row,
                column: column.to_string(),
            })
    }

    fn unexpected(&self, column: &str, expected: &'static str, found: &Value) -> ExtractionError {
        ExtractionError::UnexpectedValue {
            table: self.table.to_string(),
            row: self.row,
            column: column.to_string(),
            expected,
            found: found.kind().to_string(),
        }
    }

    pub fn key(&self, column: &str) -> Result<NaturalKey, ExtractionError> {
        self.optional_key(column)?
            .ok_or_else(|| self.unexpected(column, "identifier", &Value::Null))
    }

    /// Identifier column that may be NULL (nullable foreign keys).
    pub fn optional_key(&self, column: &str) -> Result<Option<NaturalKey>, ExtractionError> {
        match self.value(column)? {
            Value::Null => Ok(None),
            Value::Int(i) => Ok(Some(NaturalKey::Int(*i))),
            Value::Text(s) => Ok(Some(NaturalKey::Text(s.clone()))),
            other => Err(self.unexpected(column, "identifier", other)),
        }
    }

    pub fn text(&self, column: &str) -> Result<String, ExtractionError> {
        match self.value(column)? {
            Value::Text(s) => Ok(s.clone()),
            other => Err(self.unexpected(column, "text", other)),
        }
    }

    /// Text column that may be NULL.
    pub fn optional_text(&self, column: &str) -> Result<Option<String>, ExtractionError> {
        match self.value(column)? {
            Value::Null => Ok(None),
            Value::Text(s) => Ok(Some(s.clone())),
            other => Err(self.unexpected(column, "text", other)),
        }
    }

    pub fn int(&self, column: &str) -> Result<i64, ExtractionError> {
        match self.value(column)? {
            Value::Int(i) => Ok(*i),
            other => Err(self.unexpected(column, "integer", other)),
        }
    }

    /// Numeric column coerced to a float.
    pub fn float(&self, column: &str) -> Result<f64, ExtractionError> {
        let value = self.value(column)?;
        match value {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            Value::Decimal(d) => d
                .to_f64()
                .ok_or_else(|| self.unexpected(column, "finite number", value)),
            other => Err(self.unexpected(column, "number", other)),
        }
    }

    /// Any value, passed through untouched (dates and timestamps).
    pub fn opaque(&self, column: &str) -> Result<Value, ExtractionError> {
        self.value(column).cloned()
    }
}

/// Conversion from a raw record into a typed row, by column name.
pub trait FromRecord: Sized {
    fn from_record(reader: &RowReader<'_>) -> Result<Self, ExtractionError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow {
    pub id: NaturalKey,
    pub name: Option<String>,
}

impl FromRecord for CategoryRow {
    fn from_record(r: &RowReader<'_>) -> Result<Self, ExtractionError> {
        Ok(Self {
            id: r.key("id")?,
            name: r.optional_text("name")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub id: NaturalKey,
    pub name: Option<String>,
    pub price: f64,
    pub category_id: Option<NaturalKey>,
}

impl FromRecord for ProductRow {
    fn from_record(r: &RowReader<'_>) -> Result<Self, ExtractionError> {
        Ok(Self {
            id: r.key("id")?,
            name: r.optional_text("name")?,
            price: r.float("price")?,
            category_id: r.optional_key("category_id")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRow {
    pub id: NaturalKey,
    pub name: Option<String>,
    pub join_date: Value,
}

impl FromRecord for CustomerRow {
    fn from_record(r: &RowReader<'_>) -> Result<Self, ExtractionError> {
        Ok(Self {
            id: r.key("id")?,
            name: r.optional_text("name")?,
            join_date: r.opaque("join_date")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
    pub id: NaturalKey,
    /// Read from the `ts` column.
    pub order_date: Value,
    pub customer_id: Option<NaturalKey>,
}

impl FromRecord for OrderRow {
    fn from_record(r: &RowReader<'_>) -> Result<Self, ExtractionError> {
        Ok(Self {
            id: r.key("id")?,
            order_date: r.opaque("ts")?,
            customer_id: r.optional_key("customer_id")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemRow {
    pub order_id: NaturalKey,
    pub product_id: NaturalKey,
    pub quantity: i64,
}

impl FromRecord for OrderItemRow {
    fn from_record(r: &RowReader<'_>) -> Result<Self, ExtractionError> {
        Ok(Self {
            order_id: r.key("order_id")?,
            product_id: r.key("product_id")?,
            quantity: r.int("quantity")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub customer_id: NaturalKey,
    pub product_id: NaturalKey,
    pub event_type: String,
}

impl FromRecord for EventRow {
    fn from_record(r: &RowReader<'_>) -> Result<Self, ExtractionError> {
        Ok(Self {
            customer_id: r.key("customer_id")?,
            product_id: r.key("product_id")?,
            event_type: r.text("event_type")?,
        })
    }
}

/// Decode every record of a table into its typed row shape.
pub fn decode_table<T: FromRecord>(table: &str, records: &[Record]) -> Result<Vec<T>, ExtractionError> {
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| T::from_record(&RowReader::new(table, idx + 1, record)))
        .collect()
}

/// In-memory snapshot of all six tables, in source row order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub categories: Vec<CategoryRow>,
    pub products: Vec<ProductRow>,
    pub customers: Vec<CustomerRow>,
    pub orders: Vec<OrderRow>,
    pub order_items: Vec<OrderItemRow>,
    pub events: Vec<EventRow>,
}

impl Dataset {
    /// Rows extracted for the table a phase loads.
    pub fn row_count(&self, phase: LoadPhase) -> usize {
        match phase {
            LoadPhase::Category => self.categories.len(),
            LoadPhase::Product => self.products.len(),
            LoadPhase::Customer => self.customers.len(),
            LoadPhase::Order => self.orders.len(),
            LoadPhase::OrderItem => self.order_items.len(),
            LoadPhase::Event => self.events.len(),
        }
    }
}
