// Neo4j connection setup
use neo4rs::Graph;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::Neo4jConfig;
use crate::errors::GraphStoreError;

/// Lifecycle of the pipeline's graph session.
enum Session {
    Pending,
    Open(Graph),
    Closed,
}

/// Graph store backed by a Neo4j instance reached over Bolt.
///
/// The session is opened on first use and dropped by `close`; any call after
/// that fails with [`GraphStoreError::Closed`].
pub struct Neo4jStore {
    config: Neo4jConfig,
    session: Mutex<Session>,
}

impl Neo4jStore {
    pub fn new(config: Neo4jConfig) -> Self {
        Self {
            config,
            session: Mutex::new(Session::Pending),
        }
    }

    /// Build a fresh graph handle, independent of the pipeline session.
    pub(crate) fn open(&self) -> Result<Graph, GraphStoreError> {
        let graph = Graph::new(&self.config.uri, &self.config.user, &self.config.password)?;
        Ok(graph)
    }

    /// The pipeline session, opened on first use.
    pub(crate) async fn graph(&self) -> Result<Graph, GraphStoreError> {
        let mut session = self.session.lock().await;
        match &*session {
            Session::Open(graph) => Ok(graph.clone()),
            Session::Closed => Err(GraphStoreError::Closed),
            Session::Pending => {
                let graph = self.open()?;
                debug!(uri = %self.config.uri, "Neo4j session opened");
                *session = Session::Open(graph.clone());
                Ok(graph)
            }
        }
    }

    pub(crate) async fn release(&self) {
        let mut session = self.session.lock().await;
        if let Session::Open(_) = *session {
            info!("Neo4j session released");
        }
        *session = Session::Closed;
    }
}

/// Create the Neo4j store. No connection is made until first use.
pub fn connect(config: &Neo4jConfig) -> Neo4jStore {
    Neo4jStore::new(config.clone())
}
