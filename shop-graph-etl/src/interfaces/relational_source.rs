use async_trait::async_trait;

use crate::errors::RelationalError;
use crate::models::Record;

/// Read-only access to the relational shop database.
#[async_trait]
pub trait RelationalSource: Send + Sync {
    /// Minimal round-trip used by the readiness probe.
    ///
    /// Any connection opened for the check must be released before returning.
    async fn ping(&self) -> Result<(), RelationalError>;

    /// Read every row of `table`, in the order the store returns them.
    ///
    /// Column names and order come from the result-set metadata.
    async fn fetch_table(&self, table: &str) -> Result<Vec<Record>, RelationalError>;

    /// Release the held connection. Called exactly once, on every exit path.
    async fn close(&self);
}
