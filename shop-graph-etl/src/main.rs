//! Shop Graph ETL entry point
//!
//! Reads configuration from the environment, then runs one full migration
//! from PostgreSQL into Neo4j.

use anyhow::{Context, Result};
use shop_graph_etl::config::LogFormat;
use shop_graph_etl::migration::SchemaBatch;
use shop_graph_etl::{neo4j, postgres, EtlConfig, MigrationExecutor};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shop_graph_etl=info"));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config = EtlConfig::from_env().context("Invalid configuration")?;
    init_tracing(config.log_format);

    info!(
        service_name = "shop-graph-etl",
        service_version = env!("CARGO_PKG_VERSION"),
        "Starting PostgreSQL to Neo4j migration"
    );
    info!(config = ?config, "Configuration loaded");

    let source = postgres::connect(&config.postgres).context("Failed to configure PostgreSQL")?;
    let graph = neo4j::connect(&config.neo4j);

    let mut executor = MigrationExecutor::new(
        Arc::new(source),
        Arc::new(graph),
        config.readiness,
        SchemaBatch::File(config.schema_path.clone()),
    );
    let report = executor.execute().await?;

    info!(
        rows = report.total_rows(),
        links_missing = report.total_links_missing(),
        "ETL process completed successfully"
    );
    Ok(())
}
