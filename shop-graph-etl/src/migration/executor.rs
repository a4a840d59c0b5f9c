// Migration executor - orchestrates the migration flow
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use super::extractor::RelationalExtractor;
use super::loader::{GraphLoader, PhaseSummary};
use super::phase::{LoadPhase, PipelineState};
use super::schema::{SchemaBatch, SchemaBootstrapper};
use crate::config::ReadinessConfig;
use crate::errors::EtlError;
use crate::interfaces::{GraphStore, RelationalSource};
use crate::readiness::ReadinessProbe;

pub const RELATIONAL_DEPENDENCY: &str = "postgres";
pub const GRAPH_DEPENDENCY: &str = "neo4j";

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationReport {
    pub schema_statements: usize,
    /// Rows read per source table.
    pub extracted: BTreeMap<&'static str, usize>,
    pub phases: Vec<PhaseSummary>,
    pub elapsed_secs: f64,
}

impl MigrationReport {
    pub fn phase(&self, phase: LoadPhase) -> Option<&PhaseSummary> {
        self.phases.iter().find(|s| s.phase == phase)
    }

    pub fn total_rows(&self) -> usize {
        self.phases.iter().map(|s| s.rows).sum()
    }

    pub fn total_links_missing(&self) -> usize {
        self.phases.iter().map(|s| s.links_missing).sum()
    }
}

/// Migration executor that coordinates the migration process
///
/// `Idle -> ProbingDependencies -> BootstrappingSchema -> Extracting ->
/// Loading(..) -> Done`, or `Failed` from any step. Both store handles are
/// released when [`MigrationExecutor::execute`] returns, whatever the outcome,
/// so an executor runs once; a retry builds a new one.
pub struct MigrationExecutor {
    source: Arc<dyn RelationalSource>,
    graph: Arc<dyn GraphStore>,
    probe: ReadinessProbe,
    schema: SchemaBatch,
    state: PipelineState,
}

impl MigrationExecutor {
    /// Create a new migration executor
    pub fn new(
        source: Arc<dyn RelationalSource>,
        graph: Arc<dyn GraphStore>,
        readiness: ReadinessConfig,
        schema: SchemaBatch,
    ) -> Self {
        Self {
            source,
            graph,
            probe: ReadinessProbe::new(readiness),
            schema,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn transition(&mut self, next: PipelineState) {
        debug_assert!(
            !self.state.is_terminal(),
            "executor already finished in {:?}",
            self.state
        );
        debug!(from = ?self.state, to = ?next, "Pipeline state change");
        self.state = next;
    }

    /// Execute the full migration process
    pub async fn execute(&mut self) -> Result<MigrationReport, EtlError> {
        let start_time = Instant::now();

        let result = self.run_stages(start_time).await;

        self.source.close().await;
        self.graph.close().await;

        match &result {
            Ok(report) => {
                self.transition(PipelineState::Done);
                info!("\n=== Migration Complete ===");
                info!("Total time: {:.2}s", report.elapsed_secs);
                info!("Schema statements: {}", report.schema_statements);
                for summary in &report.phases {
                    info!(
                        "{}: {} rows, {} nodes, {} links ({} missing)",
                        summary.phase,
                        summary.rows,
                        summary.nodes_merged,
                        summary.links_created,
                        summary.links_missing
                    );
                }
                if let Ok(json) = serde_json::to_string(report) {
                    debug!(report = %json, "Migration report");
                }
            }
            Err(e) => {
                let failed_in = self.state;
                self.transition(PipelineState::Failed);
                error!(state = ?failed_in, error = %e, "Migration failed");
            }
        }

        result
    }

    async fn run_stages(&mut self, start_time: Instant) -> Result<MigrationReport, EtlError> {
        // Step 1: Wait for both stores
        self.transition(PipelineState::ProbingDependencies);
        let source = self.source.clone();
        self.probe
            .wait_until_ready(RELATIONAL_DEPENDENCY, || {
                let source = source.clone();
                async move { source.ping().await }
            })
            .await?;
        let graph = self.graph.clone();
        self.probe
            .wait_until_ready(GRAPH_DEPENDENCY, || {
                let graph = graph.clone();
                async move { graph.ping().await }
            })
            .await?;

        // Step 2: Constraints and indexes
        info!("\n=== Applying Graph Schema ===");
        self.transition(PipelineState::BootstrappingSchema);
        let batch = self.schema.text().await?;
        let schema_statements = SchemaBootstrapper::new(self.graph.clone())
            .apply_schema(&batch)
            .await?;

        // Step 3: Read data from PostgreSQL
        info!("\n=== Reading data from PostgreSQL ===");
        self.transition(PipelineState::Extracting);
        let dataset = RelationalExtractor::new(self.source.clone())
            .extract_dataset()
            .await?;
        let extracted = LoadPhase::ORDER
            .iter()
            .map(|phase| (phase.table(), dataset.row_count(*phase)))
            .collect();

        // Step 4: Write data to Neo4j, one phase at a time
        info!("\n=== Writing data to Neo4j ===");
        let loader = GraphLoader::new(self.graph.clone());
        let mut phases = Vec::with_capacity(LoadPhase::ORDER.len());
        for phase in LoadPhase::ORDER {
            debug_assert!(phase
                .depends_on()
                .iter()
                .all(|dep| phases.iter().any(|s: &PhaseSummary| s.phase == *dep)));
            self.transition(PipelineState::Loading(phase));
            phases.push(loader.load_phase(phase, &dataset).await?);
        }

        Ok(MigrationReport {
            schema_statements,
            extracted,
            phases,
            elapsed_secs: start_time.elapsed().as_secs_f64(),
        })
    }
}
