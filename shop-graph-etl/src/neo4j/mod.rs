// Neo4j module - graph store connection and writing
pub mod connection;
pub mod writer;

pub use connection::{connect, Neo4jStore};
