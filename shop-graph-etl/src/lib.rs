//! # Shop Graph ETL
//!
//! Migrates the relational shop dataset (categories, products, customers,
//! orders, order items and behavioral events) from PostgreSQL into a Neo4j
//! property graph.
//!
//! ## Flow
//!
//! 1. **Readiness**: wait until both stores answer a trivial request
//! 2. **Schema**: apply uniqueness constraints and indexes
//! 3. **Extract**: read the six tables into typed rows
//! 4. **Load**: merge nodes and relationships, one entity type at a time
//!
//! Every graph write is an upsert, so the whole pipeline can be re-run after
//! any failure.
//!
//! ## Modules
//!
//! - [`config`]: Configuration read from the environment
//! - [`interfaces`]: Store traits the pipeline is written against
//! - [`postgres`]: PostgreSQL relational source
//! - [`neo4j`]: Neo4j graph store
//! - [`migration`]: Schema bootstrap, extraction, loading and orchestration
//! - [`errors`]: Error types

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod migration;
pub mod models;
pub mod neo4j;
pub mod postgres;
pub mod readiness;
pub mod types;

pub use config::EtlConfig;
pub use errors::EtlError;
pub use migration::{MigrationExecutor, MigrationReport};
