// Configuration for the ETL run, read from the environment and validated once
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ConfigError;

// PostgreSQL connection pool configuration: the pipeline holds a single connection
pub const PG_MAX_CONNECTIONS: u32 = 1;

// Readiness probe defaults
pub const DEFAULT_READINESS_ATTEMPTS: u32 = 10;
pub const DEFAULT_READINESS_INTERVAL_SECS: u64 = 3;

// Progress reporting interval (rows) while loading a phase
pub const LOAD_REPORT_INTERVAL: usize = 1000;

pub const DEFAULT_NEO4J_USER: &str = "neo4j";
pub const DEFAULT_SCHEMA_PATH: &str = "schema/constraints.cypher";

/// Connection settings for the relational source.
#[derive(Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub url: String,
}

impl fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("url", &redact_url(&self.url))
            .finish()
    }
}

/// Connection settings for the graph store.
#[derive(Clone, PartialEq, Eq)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Neo4jConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Neo4jConfig")
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Retry budget for the readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessConfig {
    /// Total number of attempts, including the first one.
    pub attempts: u32,
    /// Sleep between two failed attempts.
    pub interval: Duration,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_READINESS_ATTEMPTS,
            interval: Duration::from_secs(DEFAULT_READINESS_INTERVAL_SECS),
        }
    }
}

/// Console output format for the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Full configuration of one ETL run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtlConfig {
    pub postgres: PostgresConfig,
    pub neo4j: Neo4jConfig,
    pub readiness: ReadinessConfig,
    pub schema_path: PathBuf,
    pub log_format: LogFormat,
}

impl EtlConfig {
    /// Build the configuration from process environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: PostgreSQL URL (required)
    /// - `NEO4J_URI`: Bolt URI (required)
    /// - `NEO4J_USER`: graph user (default: neo4j)
    /// - `NEO4J_PASSWORD`: graph password (default: empty)
    /// - `READINESS_ATTEMPTS`: probe attempts per dependency (default: 10)
    /// - `READINESS_INTERVAL_SECS`: sleep between attempts (default: 3)
    /// - `GRAPH_SCHEMA_PATH`: schema statement file (default: schema/constraints.cypher)
    /// - `LOG_FORMAT`: "pretty" or "json" (default: pretty)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup, then validate it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let readiness = ReadinessConfig {
            attempts: parse_or(&lookup, "READINESS_ATTEMPTS", DEFAULT_READINESS_ATTEMPTS)?,
            interval: Duration::from_secs(parse_or(
                &lookup,
                "READINESS_INTERVAL_SECS",
                DEFAULT_READINESS_INTERVAL_SECS,
            )?),
        };

        let log_format = match lookup("LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "" | "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::invalid(
                    "LOG_FORMAT",
                    format!("expected \"pretty\" or \"json\", got \"{}\"", other),
                ))
            }
        };

        let config = Self {
            postgres: PostgresConfig {
                url: required("DATABASE_URL")?,
            },
            neo4j: Neo4jConfig {
                uri: required("NEO4J_URI")?,
                user: lookup("NEO4J_USER").unwrap_or_else(|| DEFAULT_NEO4J_USER.to_string()),
                password: lookup("NEO4J_PASSWORD").unwrap_or_default(),
            },
            readiness,
            schema_path: lookup("GRAPH_SCHEMA_PATH")
                .unwrap_or_else(|| DEFAULT_SCHEMA_PATH.to_string())
                .into(),
            log_format,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the invariants every component relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.postgres.url.trim();
        if url.is_empty() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
            return Err(ConfigError::invalid(
                "DATABASE_URL",
                "expected a postgres:// or postgresql:// URL",
            ));
        }

        let uri = self.neo4j.uri.trim();
        if uri.is_empty() {
            return Err(ConfigError::Missing("NEO4J_URI"));
        }
        if !uri.contains("://") {
            return Err(ConfigError::invalid(
                "NEO4J_URI",
                "expected a URI with a scheme, e.g. bolt://localhost:7687",
            ));
        }

        if self.readiness.attempts == 0 {
            return Err(ConfigError::invalid(
                "READINESS_ATTEMPTS",
                "must be at least 1",
            ));
        }

        if self.schema_path.as_os_str().is_empty() {
            return Err(ConfigError::Missing("GRAPH_SCHEMA_PATH"));
        }

        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::invalid(key, e.to_string())),
        _ => Ok(default),
    }
}

/// Hide the credentials part of a connection URL.
pub fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
