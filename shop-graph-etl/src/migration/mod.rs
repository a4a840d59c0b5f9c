// Migration module - schema bootstrap, extraction, loading and orchestration
pub mod executor;
pub mod extractor;
pub mod loader;
pub mod phase;
pub mod schema;

pub use executor::{MigrationExecutor, MigrationReport};
pub use extractor::RelationalExtractor;
pub use loader::{GraphLoader, PhaseSummary};
pub use phase::{LoadPhase, PipelineState};
pub use schema::{load_schema_file, split_statements, SchemaBatch, SchemaBootstrapper};
