//! In-memory store doubles shared by the integration tests.
//!
//! `MemoryGraph` follows Neo4j MERGE semantics closely enough to check
//! idempotence: nodes are unique per (label, id), relationships are unique per
//! (type, endpoints, key properties), and `SET x = null` removes a property.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use shop_graph_etl::config::ReadinessConfig;
use shop_graph_etl::errors::{GraphStoreError, RelationalError};
use shop_graph_etl::interfaces::{GraphStore, RelationalSource};
use shop_graph_etl::models::{NaturalKey, Record, Value};
use shop_graph_etl::types::{
    LinkOutcome, NodeLabel, NodeMerge, NodeRef, RelationshipMerge, RelationshipType,
};

pub const SCHEMA: &str = include_str!("../../schema/constraints.cypher");

pub fn fast_readiness() -> ReadinessConfig {
    ReadinessConfig {
        attempts: 3,
        interval: Duration::from_millis(5),
    }
}

// ============================================================================
// Relational source
// ============================================================================

pub struct MemorySource {
    tables: Mutex<HashMap<String, Vec<Record>>>,
    reachable: bool,
    failing_table: Option<String>,
    pub ping_calls: AtomicUsize,
    pub close_calls: AtomicUsize,
    fetched: Mutex<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            reachable: true,
            failing_table: None,
            ping_calls: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new()
        }
    }

    pub fn failing_on(mut self, table: &str) -> Self {
        self.failing_table = Some(table.to_string());
        self
    }

    pub fn with_table(self, table: &str, rows: Vec<Record>) -> Self {
        self.set_table(table, rows);
        self
    }

    pub fn set_table(&self, table: &str, rows: Vec<Record>) {
        self.tables.lock().unwrap().insert(table.to_string(), rows);
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn closes(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelationalSource for MemorySource {
    async fn ping(&self) -> Result<(), RelationalError> {
        self.ping_calls.fetch_add(1, Ordering::SeqCst);
        if self.reachable {
            Ok(())
        } else {
            Err(RelationalError::query("connection refused"))
        }
    }

    async fn fetch_table(&self, table: &str) -> Result<Vec<Record>, RelationalError> {
        self.fetched.lock().unwrap().push(table.to_string());
        if self.failing_table.as_deref() == Some(table) {
            return Err(RelationalError::query(format!(
                "relation \"{}\" does not exist",
                table
            )));
        }
        Ok(self
            .tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default())
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Graph store
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub rel_type: RelationshipType,
    pub from: NodeRef,
    pub to: NodeRef,
    pub key: Vec<(&'static str, Value)>,
    pub properties: BTreeMap<&'static str, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: BTreeMap<NodeRef, BTreeMap<&'static str, Value>>,
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    pub fn node_count(&self, label: NodeLabel) -> usize {
        self.nodes.keys().filter(|n| n.label == label).count()
    }

    pub fn edges_of(&self, rel_type: RelationshipType) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.rel_type == rel_type).collect()
    }

    pub fn property(&self, node: &NodeRef, name: &str) -> Option<&Value> {
        self.nodes.get(node).and_then(|props| props.get(name))
    }

    pub fn has_edge(&self, rel_type: RelationshipType, from: &NodeRef, to: &NodeRef) -> bool {
        self.edges
            .iter()
            .any(|e| e.rel_type == rel_type && &e.from == from && &e.to == to)
    }
}

pub struct MemoryGraph {
    snapshot: Mutex<GraphSnapshot>,
    statements: Mutex<Vec<String>>,
    reachable: bool,
    rejected_statement: Option<String>,
    fail_after_writes: Option<usize>,
    pub writes: AtomicUsize,
    pub close_calls: AtomicUsize,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self {
            snapshot: Mutex::new(GraphSnapshot::default()),
            statements: Mutex::new(Vec::new()),
            reachable: true,
            rejected_statement: None,
            fail_after_writes: None,
            writes: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new()
        }
    }

    /// Reject any schema statement containing `fragment`.
    pub fn rejecting(mut self, fragment: &str) -> Self {
        self.rejected_statement = Some(fragment.to_string());
        self
    }

    /// Fail every node/relationship write after the first `n`.
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after_writes = Some(n);
        self
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        self.snapshot.lock().unwrap().clone()
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    fn count_write(&self) -> Result<(), GraphStoreError> {
        let done = self.writes.fetch_add(1, Ordering::SeqCst);
        match self.fail_after_writes {
            Some(limit) if done >= limit => {
                Err(GraphStoreError::statement("write rejected by test store"))
            }
            _ => Ok(()),
        }
    }
}

fn apply_properties(
    target: &mut BTreeMap<&'static str, Value>,
    properties: &[(&'static str, Value)],
) {
    for (name, value) in properties {
        if value.is_null() {
            target.remove(name);
        } else {
            target.insert(*name, value.clone());
        }
    }
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn ping(&self) -> Result<(), GraphStoreError> {
        if self.reachable {
            Ok(())
        } else {
            Err(GraphStoreError::statement("service unavailable"))
        }
    }

    async fn run_statement(&self, statement: &str) -> Result<(), GraphStoreError> {
        if let Some(fragment) = &self.rejected_statement {
            if statement.contains(fragment.as_str()) {
                return Err(GraphStoreError::statement(format!(
                    "Invalid input: {}",
                    statement
                )));
            }
        }
        self.statements.lock().unwrap().push(statement.to_string());
        Ok(())
    }

    async fn merge_node(&self, request: &NodeMerge) -> Result<(), GraphStoreError> {
        self.count_write()?;
        let mut snapshot = self.snapshot.lock().unwrap();
        let node = snapshot.nodes.entry(request.node.clone()).or_default();
        apply_properties(node, &request.properties);
        Ok(())
    }

    async fn merge_relationship(
        &self,
        request: &RelationshipMerge,
    ) -> Result<LinkOutcome, GraphStoreError> {
        self.count_write()?;
        let mut snapshot = self.snapshot.lock().unwrap();
        if !snapshot.nodes.contains_key(&request.from) || !snapshot.nodes.contains_key(&request.to)
        {
            return Ok(LinkOutcome::MissingEndpoint);
        }

        let position = snapshot.edges.iter().position(|e| {
            e.rel_type == request.rel_type
                && e.from == request.from
                && e.to == request.to
                && e.key == request.key_properties
        });
        let index = match position {
            Some(index) => index,
            None => {
                snapshot.edges.push(Edge {
                    rel_type: request.rel_type,
                    from: request.from.clone(),
                    to: request.to.clone(),
                    key: request.key_properties.clone(),
                    properties: BTreeMap::new(),
                });
                snapshot.edges.len() - 1
            }
        };
        apply_properties(&mut snapshot.edges[index].properties, &request.properties);
        Ok(LinkOutcome::Linked)
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn key(id: i64) -> NaturalKey {
    NaturalKey::Int(id)
}

pub fn node(label: NodeLabel, id: i64) -> NodeRef {
    NodeRef::new(label, id)
}

fn fk(id: Option<i64>) -> Value {
    id.map_or(Value::Null, Value::Int)
}

pub fn category(id: i64, name: &str) -> Record {
    Record::new()
        .with("id", Value::Int(id))
        .with("name", Value::Text(name.into()))
}

pub fn product(id: i64, name: &str, price: &str, category_id: Option<i64>) -> Record {
    Record::new()
        .with("id", Value::Int(id))
        .with("name", Value::Text(name.into()))
        .with("price", Value::Decimal(price.parse().unwrap()))
        .with("category_id", fk(category_id))
}

pub fn customer(id: i64, name: &str, join_date: NaiveDate) -> Record {
    Record::new()
        .with("id", Value::Int(id))
        .with("name", Value::Text(name.into()))
        .with("join_date", Value::Date(join_date))
}

pub fn order(id: i64, customer_id: Option<i64>, day: u32) -> Record {
    Record::new()
        .with("id", Value::Int(id))
        .with("customer_id", fk(customer_id))
        .with(
            "ts",
            Value::Timestamp(date(2024, 3, day).and_hms_opt(10, 0, 0).unwrap()),
        )
}

pub fn order_item(id: i64, order_id: i64, product_id: i64, quantity: i64) -> Record {
    Record::new()
        .with("id", Value::Int(id))
        .with("order_id", Value::Int(order_id))
        .with("product_id", Value::Int(product_id))
        .with("quantity", Value::Int(quantity))
}

pub fn event(id: i64, customer_id: i64, product_id: i64, event_type: &str) -> Record {
    Record::new()
        .with("id", Value::Int(id))
        .with("customer_id", Value::Int(customer_id))
        .with("product_id", Value::Int(product_id))
        .with("event_type", Value::Text(event_type.into()))
}

/// Small, fully consistent shop: 2 categories, 3 products, 2 customers,
/// 2 orders, 3 order items, 4 events (two of them duplicates).
pub fn shop_source() -> MemorySource {
    MemorySource::new()
        .with_table(
            "categories",
            vec![category(1, "Kitchen"), category(2, "Books")],
        )
        .with_table(
            "products",
            vec![
                product(10, "Kettle", "24.90", Some(1)),
                product(11, "Mug", "5.50", Some(1)),
                product(12, "Rust in Action", "39.00", Some(2)),
            ],
        )
        .with_table(
            "customers",
            vec![
                customer(100, "Ada", date(2023, 1, 15)),
                customer(101, "Grace", date(2023, 6, 1)),
            ],
        )
        .with_table("orders", vec![order(1000, Some(100), 1), order(1001, Some(101), 2)])
        .with_table(
            "order_items",
            vec![
                order_item(1, 1000, 10, 1),
                order_item(2, 1000, 11, 4),
                order_item(3, 1001, 12, 2),
            ],
        )
        .with_table(
            "events",
            vec![
                event(1, 100, 10, "view"),
                event(2, 100, 10, "view"),
                event(3, 100, 10, "purchase"),
                event(4, 101, 12, "view"),
            ],
        )
}
