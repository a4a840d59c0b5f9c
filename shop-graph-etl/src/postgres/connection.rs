// PostgreSQL connection setup
use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgConnection, PgPool};
use tracing::debug;

use crate::config::{redact_url, PostgresConfig, PG_MAX_CONNECTIONS};
use crate::errors::RelationalError;

/// Relational source backed by a single-connection PostgreSQL pool.
pub struct PostgresSource {
    pool: PgPool,
    url: String,
}

impl PostgresSource {
    pub(super) fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Open and immediately close a dedicated connection.
    pub(crate) async fn round_trip(&self) -> Result<(), RelationalError> {
        let conn = PgConnection::connect(&self.url).await?;
        conn.close().await?;
        Ok(())
    }
}

/// Create the PostgreSQL source.
///
/// The pool is lazy: no connection is opened until the first table is read,
/// so the readiness probe runs before the pipeline touches the database.
pub fn connect(config: &PostgresConfig) -> Result<PostgresSource, RelationalError> {
    let pool = PgPoolOptions::new()
        .max_connections(PG_MAX_CONNECTIONS)
        .connect_lazy(&config.url)?;

    debug!(url = %redact_url(&config.url), "PostgreSQL pool created");

    Ok(PostgresSource {
        pool,
        url: config.url.clone(),
    })
}
