//! Graph-side request types passed to a [`crate::interfaces::GraphStore`].
//!
//! Labels, relationship types and property names are closed sets known at
//! compile time; only property *values* and natural keys come from the source
//! data, and those always travel as statement parameters.

use serde::Serialize;
use std::fmt;

use crate::models::{NaturalKey, Value};

/// Node labels written by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NodeLabel {
    Category,
    Product,
    Customer,
    Order,
}

impl NodeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeLabel::Category => "Category",
            NodeLabel::Product => "Product",
            NodeLabel::Customer => "Customer",
            NodeLabel::Order => "Order",
        }
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship types written by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RelationshipType {
    /// Product -> Category
    InCategory,
    /// Customer -> Order
    Placed,
    /// Order -> Product
    Contains,
    /// Customer -> Product
    Event,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::InCategory => "IN_CATEGORY",
            RelationshipType::Placed => "PLACED",
            RelationshipType::Contains => "CONTAINS",
            RelationshipType::Event => "EVENT",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a node: its label plus the value of its `id` property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef {
    pub label: NodeLabel,
    pub key: NaturalKey,
}

impl NodeRef {
    pub fn new(label: NodeLabel, key: impl Into<NaturalKey>) -> Self {
        Self {
            label,
            key: key.into(),
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.label, self.key)
    }
}

/// Merge a node by natural key, then overwrite `properties`.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMerge {
    pub node: NodeRef,
    pub properties: Vec<(&'static str, Value)>,
}

/// Merge a relationship between two existing nodes.
///
/// `key_properties` take part in the merge pattern, so two merges that differ
/// only in those values produce two edges. `properties` are set after the
/// merge and overwrite previous values.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipMerge {
    pub rel_type: RelationshipType,
    pub from: NodeRef,
    pub to: NodeRef,
    pub key_properties: Vec<(&'static str, Value)>,
    pub properties: Vec<(&'static str, Value)>,
}

/// Result of a relationship merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkOutcome {
    /// Both endpoints were found and the edge exists now.
    Linked,
    /// At least one endpoint is absent, so no edge was written.
    MissingEndpoint,
}
