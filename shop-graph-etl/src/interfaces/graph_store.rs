use async_trait::async_trait;

use crate::errors::GraphStoreError;
use crate::types::{LinkOutcome, NodeMerge, RelationshipMerge};

/// Write access to the target property graph.
///
/// Every write is an upsert, so replaying the same sequence of calls leaves
/// the graph unchanged.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Minimal round-trip used by the readiness probe.
    async fn ping(&self) -> Result<(), GraphStoreError>;

    /// Execute one raw statement (schema bootstrap).
    async fn run_statement(&self, statement: &str) -> Result<(), GraphStoreError>;

    /// Create the node if absent, then overwrite its properties.
    async fn merge_node(&self, request: &NodeMerge) -> Result<(), GraphStoreError>;

    /// Match both endpoints and merge the relationship between them.
    ///
    /// A missing endpoint is not an error: nothing is written and
    /// [`LinkOutcome::MissingEndpoint`] is returned.
    async fn merge_relationship(
        &self,
        request: &RelationshipMerge,
    ) -> Result<LinkOutcome, GraphStoreError>;

    /// Release the session. Called exactly once, on every exit path.
    async fn close(&self);
}
