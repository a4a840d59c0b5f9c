//! Errors for the schema, extraction and load stages.
use std::path::PathBuf;
use thiserror::Error;

use super::store::{GraphStoreError, RelationalError};
use crate::migration::LoadPhase;

/// Errors raised while bootstrapping the graph schema.
///
/// Statements before the failing one stay applied; they are idempotent and
/// are re-applied on the next run.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read schema file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema statement {index} rejected ({statement}): {source}")]
    Statement {
        index: usize,
        statement: String,
        #[source]
        source: GraphStoreError,
    },
}

/// Errors raised while reading tables from the relational source.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to read table {table}: {source}")]
    Query {
        table: String,
        #[source]
        source: RelationalError,
    },

    #[error("Table {table}, row {row}: missing column {column}")]
    MissingColumn {
        table: String,
        row: usize,
        column: String,
    },

    #[error("Table {table}, row {row}, column {column}: expected {expected}, found {found}")]
    UnexpectedValue {
        table: String,
        row: usize,
        column: String,
        expected: &'static str,
        found: String,
    },
}

/// Errors raised while writing to the graph.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{phase} load failed at row {row}: {source}")]
    Store {
        phase: LoadPhase,
        row: usize,
        #[source]
        source: GraphStoreError,
    },
}
