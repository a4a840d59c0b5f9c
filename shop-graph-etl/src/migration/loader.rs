// Graph loading: idempotent upserts per entity type plus relationship merges
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::phase::LoadPhase;
use crate::config::LOAD_REPORT_INTERVAL;
use crate::errors::{GraphStoreError, LoadError};
use crate::interfaces::GraphStore;
use crate::models::{Dataset, NaturalKey, Value};
use crate::types::{LinkOutcome, NodeLabel, NodeMerge, NodeRef, RelationshipMerge, RelationshipType};

/// Counters for one load phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseSummary {
    pub phase: LoadPhase,
    pub rows: usize,
    pub nodes_merged: usize,
    pub links_created: usize,
    pub links_missing: usize,
}

impl PhaseSummary {
    fn new(phase: LoadPhase) -> Self {
        Self {
            phase,
            rows: 0,
            nodes_merged: 0,
            links_created: 0,
            links_missing: 0,
        }
    }

    fn record_link(&mut self, outcome: LinkOutcome) {
        match outcome {
            LinkOutcome::Linked => self.links_created += 1,
            LinkOutcome::MissingEndpoint => self.links_missing += 1,
        }
    }
}

/// Writes the shop entities into the graph store.
///
/// Every operation is an upsert: nodes are merged by natural key and their
/// properties overwritten; relationships are merged between existing nodes.
/// The loader does not order phases itself; callers follow
/// [`LoadPhase::ORDER`].
pub struct GraphLoader {
    graph: Arc<dyn GraphStore>,
}

impl GraphLoader {
    pub fn new(graph: Arc<dyn GraphStore>) -> Self {
        Self { graph }
    }

    async fn merge_node(
        &self,
        label: NodeLabel,
        id: &NaturalKey,
        properties: Vec<(&'static str, Value)>,
    ) -> Result<(), GraphStoreError> {
        let request = NodeMerge {
            node: NodeRef::new(label, id.clone()),
            properties,
        };
        self.graph.merge_node(&request).await
    }

    async fn link(&self, request: RelationshipMerge) -> Result<LinkOutcome, GraphStoreError> {
        let outcome = self.graph.merge_relationship(&request).await?;
        if outcome == LinkOutcome::MissingEndpoint {
            warn!(
                relationship = %request.rel_type,
                from = %request.from,
                to = %request.to,
                "Relationship skipped: endpoint node not found"
            );
        }
        Ok(outcome)
    }

    pub async fn upsert_category(
        &self,
        id: &NaturalKey,
        name: Option<&str>,
    ) -> Result<(), GraphStoreError> {
        self.merge_node(NodeLabel::Category, id, vec![("name", text(name))])
            .await
    }

    pub async fn upsert_product(
        &self,
        id: &NaturalKey,
        name: Option<&str>,
        price: f64,
    ) -> Result<(), GraphStoreError> {
        self.merge_node(
            NodeLabel::Product,
            id,
            vec![("name", text(name)), ("price", Value::Float(price))],
        )
        .await
    }

    /// Requires the category node to exist already.
    pub async fn link_product_to_category(
        &self,
        product_id: &NaturalKey,
        category_id: &NaturalKey,
    ) -> Result<LinkOutcome, GraphStoreError> {
        self.link(RelationshipMerge {
            rel_type: RelationshipType::InCategory,
            from: NodeRef::new(NodeLabel::Product, product_id.clone()),
            to: NodeRef::new(NodeLabel::Category, category_id.clone()),
            key_properties: vec![],
            properties: vec![],
        })
        .await
    }

    pub async fn upsert_customer(
        &self,
        id: &NaturalKey,
        name: Option<&str>,
        join_date: &Value,
    ) -> Result<(), GraphStoreError> {
        self.merge_node(
            NodeLabel::Customer,
            id,
            vec![("name", text(name)), ("join_date", join_date.clone())],
        )
        .await
    }

    pub async fn upsert_order(
        &self,
        id: &NaturalKey,
        order_date: &Value,
    ) -> Result<(), GraphStoreError> {
        self.merge_node(NodeLabel::Order, id, vec![("order_date", order_date.clone())])
            .await
    }

    /// Requires the customer node to exist already.
    pub async fn link_order_to_customer(
        &self,
        order_id: &NaturalKey,
        customer_id: &NaturalKey,
    ) -> Result<LinkOutcome, GraphStoreError> {
        self.link(RelationshipMerge {
            rel_type: RelationshipType::Placed,
            from: NodeRef::new(NodeLabel::Customer, customer_id.clone()),
            to: NodeRef::new(NodeLabel::Order, order_id.clone()),
            key_properties: vec![],
            properties: vec![],
        })
        .await
    }

    /// One `CONTAINS` edge per (order, product); `quantity` is overwritten.
    pub async fn link_order_contains_product(
        &self,
        order_id: &NaturalKey,
        product_id: &NaturalKey,
        quantity: i64,
    ) -> Result<LinkOutcome, GraphStoreError> {
        self.link(RelationshipMerge {
            rel_type: RelationshipType::Contains,
            from: NodeRef::new(NodeLabel::Order, order_id.clone()),
            to: NodeRef::new(NodeLabel::Product, product_id.clone()),
            key_properties: vec![],
            properties: vec![("quantity", Value::Int(quantity))],
        })
        .await
    }

    /// One `EVENT` edge per (customer, product, type).
    pub async fn link_customer_event(
        &self,
        customer_id: &NaturalKey,
        product_id: &NaturalKey,
        event_type: &str,
    ) -> Result<LinkOutcome, GraphStoreError> {
        self.link(RelationshipMerge {
            rel_type: RelationshipType::Event,
            from: NodeRef::new(NodeLabel::Customer, customer_id.clone()),
            to: NodeRef::new(NodeLabel::Product, product_id.clone()),
            key_properties: vec![("type", Value::Text(event_type.to_string()))],
            properties: vec![],
        })
        .await
    }

    /// Load one entity type's full table, row by row in source order.
    #[instrument(skip(self, dataset), fields(table = phase.table()))]
    pub async fn load_phase(
        &self,
        phase: LoadPhase,
        dataset: &Dataset,
    ) -> Result<PhaseSummary, LoadError> {
        let mut summary = PhaseSummary::new(phase);
        let total = dataset.row_count(phase);
        info!(rows = total, "Loading {} rows", phase);

        for row in 0..total {
            self.load_row(phase, dataset, row, &mut summary)
                .await
                .map_err(|source| LoadError::Store {
                    phase,
                    row: row + 1,
                    source,
                })?;
            summary.rows += 1;

            if summary.rows % LOAD_REPORT_INTERVAL == 0 && summary.rows < total {
                info!("  Progress: {}/{} rows", summary.rows, total);
            }
        }

        info!(
            rows = summary.rows,
            nodes_merged = summary.nodes_merged,
            links_created = summary.links_created,
            links_missing = summary.links_missing,
            "✓ Loaded {}",
            phase
        );
        Ok(summary)
    }

    async fn load_row(
        &self,
        phase: LoadPhase,
        dataset: &Dataset,
        row: usize,
        summary: &mut PhaseSummary,
    ) -> Result<(), GraphStoreError> {
        match phase {
            LoadPhase::Category => {
                let category = &dataset.categories[row];
                self.upsert_category(&category.id, category.name.as_deref())
                    .await?;
                summary.nodes_merged += 1;
            }
            LoadPhase::Product => {
                let product = &dataset.products[row];
                self.upsert_product(&product.id, product.name.as_deref(), product.price)
                    .await?;
                summary.nodes_merged += 1;
                match &product.category_id {
                    Some(category_id) => summary.record_link(
                        self.link_product_to_category(&product.id, category_id)
                            .await?,
                    ),
                    None => {
                        warn!(product = %product.id, "Product has no category_id");
                        summary.record_link(LinkOutcome::MissingEndpoint);
                    }
                }
            }
            LoadPhase::Customer => {
                let customer = &dataset.customers[row];
                self.upsert_customer(&customer.id, customer.name.as_deref(), &customer.join_date)
                    .await?;
                summary.nodes_merged += 1;
            }
            LoadPhase::Order => {
                let order = &dataset.orders[row];
                self.upsert_order(&order.id, &order.order_date).await?;
                summary.nodes_merged += 1;
                match &order.customer_id {
                    Some(customer_id) => summary.record_link(
                        self.link_order_to_customer(&order.id, customer_id).await?,
                    ),
                    None => {
                        warn!(order = %order.id, "Order has no customer_id");
                        summary.record_link(LinkOutcome::MissingEndpoint);
                    }
                }
            }
            LoadPhase::OrderItem => {
                let item = &dataset.order_items[row];
                summary.record_link(
                    self.link_order_contains_product(&item.order_id, &item.product_id, item.quantity)
                        .await?,
                );
            }
            LoadPhase::Event => {
                let event = &dataset.events[row];
                summary.record_link(
                    self.link_customer_event(&event.customer_id, &event.product_id, &event.event_type)
                        .await?,
                );
            }
        }
        Ok(())
    }
}

fn text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |s| Value::Text(s.to_string()))
}
