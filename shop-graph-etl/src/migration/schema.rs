// Graph schema bootstrap: constraints and indexes applied statement by statement
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::errors::SchemaError;
use crate::interfaces::GraphStore;

/// Where the schema statement batch comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaBatch {
    Inline(String),
    File(PathBuf),
}

impl SchemaBatch {
    /// Resolve the batch text, reading the file if needed.
    pub async fn text(&self) -> Result<String, SchemaError> {
        match self {
            SchemaBatch::Inline(text) => Ok(text.clone()),
            SchemaBatch::File(path) => load_schema_file(path).await,
        }
    }
}

/// Read a schema statement file.
pub async fn load_schema_file(path: &Path) -> Result<String, SchemaError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Applies a `;`-separated batch of schema statements to the graph store.
pub struct SchemaBootstrapper {
    graph: Arc<dyn GraphStore>,
}

impl SchemaBootstrapper {
    pub fn new(graph: Arc<dyn GraphStore>) -> Self {
        Self { graph }
    }

    /// Execute every statement of the batch in source order.
    ///
    /// There is no surrounding transaction: statements before a rejected one
    /// stay applied. Returns the number of statements executed.
    #[instrument(skip(self, batch))]
    pub async fn apply_schema(&self, batch: &str) -> Result<usize, SchemaError> {
        let statements = split_statements(batch);
        info!(statements = statements.len(), "Applying graph schema");

        for (idx, statement) in statements.iter().enumerate() {
            debug!(index = idx + 1, %statement, "Running schema statement");
            self.graph
                .run_statement(statement)
                .await
                .map_err(|source| SchemaError::Statement {
                    index: idx + 1,
                    statement: statement.clone(),
                    source,
                })?;
        }

        info!(statements = statements.len(), "✓ Graph schema applied");
        Ok(statements.len())
    }
}

/// Split a batch on `;`, trimming and dropping empty statements.
///
/// Separators inside quoted segments ('...', "...", `...`) do not split, and
/// `//` line comments and `/* */` block comments are removed.
pub fn split_statements(batch: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = batch.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            current.push(c);
            if c == '\\' && q != '`' {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                current.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        current.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
                current.push(' ');
            }
            ';' => push_statement(&mut statements, &mut current),
            _ => current.push(c),
        }
    }
    push_statement(&mut statements, &mut current);

    statements
}

fn push_statement(statements: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    current.clear();
}
