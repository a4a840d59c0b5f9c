//! Errors raised by the store adapters behind the
//! [`crate::interfaces::RelationalSource`] and [`crate::interfaces::GraphStore`] traits.
use thiserror::Error;

/// Errors from the relational source.
#[derive(Debug, Error)]
pub enum RelationalError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Query failure reported by a non-sqlx source.
    #[error("Query error: {0}")]
    Query(String),
}

impl RelationalError {
    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }
}

/// Errors from the graph store.
#[derive(Debug, Error)]
pub enum GraphStoreError {
    #[error("Neo4j error: {0}")]
    Neo4j(#[from] neo4rs::Error),

    /// The store answered with something the adapter did not expect.
    #[error("Unexpected response: {0}")]
    Response(String),

    /// Statement rejected by a non-neo4rs store.
    #[error("Statement rejected: {0}")]
    Statement(String),

    /// The session was already released.
    #[error("Graph session is closed")]
    Closed,
}

impl GraphStoreError {
    /// Create an unexpected response error.
    pub fn response(msg: impl Into<String>) -> Self {
        Self::Response(msg.into())
    }

    /// Create a statement rejected error.
    pub fn statement(msg: impl Into<String>) -> Self {
        Self::Statement(msg.into())
    }
}
