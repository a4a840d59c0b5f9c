//! Error types for the shop graph ETL.
//!
//! Each pipeline stage has its own error enum; [`EtlError`] is the top-level
//! type returned by the executor. Store adapters raise [`RelationalError`] and
//! [`GraphStoreError`], which the stage errors wrap with context.
mod config;
mod stage;
mod store;

pub use config::ConfigError;
pub use stage::{ExtractionError, LoadError, SchemaError};
pub use store::{GraphStoreError, RelationalError};

use thiserror::Error;

/// Errors that abort a pipeline run.
///
/// Every variant is fatal. The remediation is always to fix the underlying
/// condition and re-run the whole pipeline, which is safe because every
/// graph write is an upsert.
#[derive(Debug, Error)]
pub enum EtlError {
    /// Invalid configuration, detected before any I/O.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A dependency never answered within its readiness budget.
    #[error("Dependency {dependency} unavailable after {attempts} attempts: {last_error}")]
    DependencyUnavailable {
        dependency: String,
        attempts: u32,
        last_error: String,
    },

    /// A schema bootstrap statement was rejected.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A table could not be read or decoded.
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// A graph upsert or merge failed.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),
}

impl EtlError {
    /// Create a dependency unavailable error.
    pub fn dependency_unavailable(
        dependency: impl Into<String>,
        attempts: u32,
        last_error: impl Into<String>,
    ) -> Self {
        Self::DependencyUnavailable {
            dependency: dependency.into(),
            attempts,
            last_error: last_error.into(),
        }
    }
}
