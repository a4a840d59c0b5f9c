// Declared load order and pipeline states
use serde::Serialize;
use std::fmt;

/// One entity type's load step.
///
/// [`LoadPhase::ORDER`] is the only place the load order is defined: every
/// phase comes after the phases whose nodes its relationships point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LoadPhase {
    Category,
    Product,
    Customer,
    Order,
    OrderItem,
    Event,
}

impl LoadPhase {
    pub const ORDER: [LoadPhase; 6] = [
        LoadPhase::Category,
        LoadPhase::Product,
        LoadPhase::Customer,
        LoadPhase::Order,
        LoadPhase::OrderItem,
        LoadPhase::Event,
    ];

    /// Source table read for this phase.
    pub fn table(&self) -> &'static str {
        match self {
            LoadPhase::Category => "categories",
            LoadPhase::Product => "products",
            LoadPhase::Customer => "customers",
            LoadPhase::Order => "orders",
            LoadPhase::OrderItem => "order_items",
            LoadPhase::Event => "events",
        }
    }

    /// Phases whose nodes must exist before this one links to them.
    pub(crate) fn depends_on(&self) -> &'static [LoadPhase] {
        match self {
            LoadPhase::Category | LoadPhase::Customer => &[],
            LoadPhase::Product => &[LoadPhase::Category],
            LoadPhase::Order => &[LoadPhase::Customer],
            LoadPhase::OrderItem => &[LoadPhase::Order, LoadPhase::Product],
            LoadPhase::Event => &[LoadPhase::Customer, LoadPhase::Product],
        }
    }
}

impl fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadPhase::Category => "Category",
            LoadPhase::Product => "Product",
            LoadPhase::Customer => "Customer",
            LoadPhase::Order => "Order",
            LoadPhase::OrderItem => "OrderItem",
            LoadPhase::Event => "Event",
        };
        f.write_str(name)
    }
}

/// States of a pipeline run. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    Idle,
    ProbingDependencies,
    BootstrappingSchema,
    Extracting,
    Loading(LoadPhase),
    Done,
    Failed,
}

impl PipelineState {
    pub(crate) fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}
