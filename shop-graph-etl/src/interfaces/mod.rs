//! Store traits the pipeline is written against.
//!
//! The PostgreSQL and Neo4j adapters implement these; tests substitute
//! in-memory implementations.
mod graph_store;
mod relational_source;

pub use graph_store::GraphStore;
pub use relational_source::RelationalSource;
