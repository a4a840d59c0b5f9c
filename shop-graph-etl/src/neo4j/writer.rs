// Neo4j data writing: parameterized MERGE statements for nodes and relationships
use async_trait::async_trait;
use bigdecimal::ToPrimitive;
use neo4rs::{BoltNull, BoltType, Query};

use super::connection::Neo4jStore;
use crate::errors::GraphStoreError;
use crate::interfaces::GraphStore;
use crate::models::{NaturalKey, Value};
use crate::types::{LinkOutcome, NodeMerge, RelationshipMerge};

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn ping(&self) -> Result<(), GraphStoreError> {
        // Dedicated handle, dropped before returning
        let graph = self.open()?;
        graph.run(Query::new("RETURN 1".to_string())).await?;
        Ok(())
    }

    async fn run_statement(&self, statement: &str) -> Result<(), GraphStoreError> {
        let graph = self.graph().await?;
        graph.run(Query::new(statement.to_string())).await?;
        Ok(())
    }

    async fn merge_node(&self, request: &NodeMerge) -> Result<(), GraphStoreError> {
        let mut query =
            Query::new(node_merge_cypher(request)).param("id", key_to_bolt(&request.node.key));
        for (name, value) in &request.properties {
            query = query.param(&format!("p_{}", name), to_bolt(value));
        }

        let graph = self.graph().await?;
        graph.run(query).await?;
        Ok(())
    }

    async fn merge_relationship(
        &self,
        request: &RelationshipMerge,
    ) -> Result<LinkOutcome, GraphStoreError> {
        let mut query = Query::new(relationship_merge_cypher(request))
            .param("from_id", key_to_bolt(&request.from.key))
            .param("to_id", key_to_bolt(&request.to.key));
        for (name, value) in &request.key_properties {
            query = query.param(&format!("k_{}", name), to_bolt(value));
        }
        for (name, value) in &request.properties {
            query = query.param(&format!("p_{}", name), to_bolt(value));
        }

        let graph = self.graph().await?;
        let mut result = graph.execute(query).await?;
        let linked = match result.next().await? {
            Some(row) => row
                .get::<i64>("linked")
                .map_err(|e| GraphStoreError::response(format!("linked count: {}", e)))?,
            None => 0,
        };

        Ok(link_outcome(linked))
    }

    async fn close(&self) {
        self.release().await;
    }
}

/// `MERGE (n:Label {id: $id}) SET n.prop = $p_prop, ...`
pub fn node_merge_cypher(request: &NodeMerge) -> String {
    let mut cypher = format!("MERGE (n:{} {{id: $id}})", request.node.label);
    if !request.properties.is_empty() {
        let assignments: Vec<String> = request
            .properties
            .iter()
            .map(|(name, _)| format!("n.{name} = $p_{name}"))
            .collect();
        cypher.push_str(" SET ");
        cypher.push_str(&assignments.join(", "));
    }
    cypher
}

/// Match-then-merge: when an endpoint is absent the MATCH yields no row, the
/// MERGE never runs and `linked` is 0.
pub fn relationship_merge_cypher(request: &RelationshipMerge) -> String {
    let key_map = if request.key_properties.is_empty() {
        String::new()
    } else {
        let pairs: Vec<String> = request
            .key_properties
            .iter()
            .map(|(name, _)| format!("{name}: $k_{name}"))
            .collect();
        format!(" {{{}}}", pairs.join(", "))
    };

    let mut cypher = format!(
        "MATCH (a:{} {{id: $from_id}}) \
         MATCH (b:{} {{id: $to_id}}) \
         MERGE (a)-[r:{}{}]->(b)",
        request.from.label, request.to.label, request.rel_type, key_map
    );

    if !request.properties.is_empty() {
        let assignments: Vec<String> = request
            .properties
            .iter()
            .map(|(name, _)| format!("r.{name} = $p_{name}"))
            .collect();
        cypher.push_str(" SET ");
        cypher.push_str(&assignments.join(", "));
    }

    cypher.push_str(" RETURN count(r) AS linked");
    cypher
}

/// A zero count means the MATCH found no endpoint pair.
fn link_outcome(linked: i64) -> LinkOutcome {
    if linked > 0 {
        LinkOutcome::Linked
    } else {
        LinkOutcome::MissingEndpoint
    }
}

fn key_to_bolt(key: &NaturalKey) -> BoltType {
    match key {
        NaturalKey::Int(i) => (*i).into(),
        NaturalKey::Text(s) => s.clone().into(),
    }
}

/// Map a decoded cell onto the Bolt type system. Temporal values keep their
/// temporal type so the graph store owns date handling.
pub fn to_bolt(value: &Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => (*b).into(),
        Value::Int(i) => (*i).into(),
        Value::Float(f) => (*f).into(),
        Value::Decimal(d) => match d.to_f64() {
            Some(f) => f.into(),
            None => d.to_string().into(),
        },
        Value::Text(s) => s.clone().into(),
        Value::Date(d) => (*d).into(),
        Value::Timestamp(t) => (*t).into(),
        Value::TimestampTz(t) => t.fixed_offset().into(),
    }
}
