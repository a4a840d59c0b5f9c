// Relational extraction: one full-table scan per load phase
use std::sync::Arc;
use tracing::{info, instrument};

use super::phase::LoadPhase;
use crate::errors::ExtractionError;
use crate::interfaces::RelationalSource;
use crate::models::{decode_table, Dataset, FromRecord, Record};

/// Reads the six shop tables into memory.
pub struct RelationalExtractor {
    source: Arc<dyn RelationalSource>,
}

impl RelationalExtractor {
    pub fn new(source: Arc<dyn RelationalSource>) -> Self {
        Self { source }
    }

    /// Read every row of `table` as column-keyed records.
    pub async fn extract(&self, table: &str) -> Result<Vec<Record>, ExtractionError> {
        self.source
            .fetch_table(table)
            .await
            .map_err(|source| ExtractionError::Query {
                table: table.to_string(),
                source,
            })
    }

    async fn extract_typed<T: FromRecord>(&self, phase: LoadPhase) -> Result<Vec<T>, ExtractionError> {
        let table = phase.table();
        let records = self.extract(table).await?;
        let rows = decode_table(table, &records)?;
        info!(table, rows = records.len(), "✓ Read table");
        Ok(rows)
    }

    /// Snapshot all six tables, in load order. Any failure discards the
    /// whole dataset.
    #[instrument(skip(self))]
    pub async fn extract_dataset(&self) -> Result<Dataset, ExtractionError> {
        info!("Extracting data from PostgreSQL");
        Ok(Dataset {
            categories: self.extract_typed(LoadPhase::Category).await?,
            products: self.extract_typed(LoadPhase::Product).await?,
            customers: self.extract_typed(LoadPhase::Customer).await?,
            orders: self.extract_typed(LoadPhase::Order).await?,
            order_items: self.extract_typed(LoadPhase::OrderItem).await?,
            events: self.extract_typed(LoadPhase::Event).await?,
        })
    }
}
