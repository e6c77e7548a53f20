use super::edge::Edge;
use super::id::{EdgeId, ElementId};
use super::validate::Warning;
use std::collections::HashMap;

/// Compiled execution plan for one flow.
/// Holds the dependency levels and the pre-computed edge routing the sweep
/// reads its bindings from.
#[derive(Debug, Clone)]
pub struct CompiledPlan {
    /// Dependency levels, earliest first
    pub levels: Vec<Vec<ElementId>>,

    /// Edges of the flow, in flow order
    pub edges: Vec<Edge>,

    /// Incoming edges per element, in flow order
    pub incoming: HashMap<ElementId, Vec<EdgeId>>,

    /// Non-fatal findings of validation
    pub warnings: Vec<Warning>,

    /// Compilation statistics
    pub stats: PlanStats,
}

/// Statistics about the compiled plan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanStats {
    /// Number of elements scheduled
    pub total_elements: usize,

    /// Number of dependency levels
    pub levels: usize,

    /// Number of edges
    pub edges: usize,

    /// Elements without incoming edges
    pub entry_elements: usize,

    /// Elements without outgoing edges
    pub terminal_elements: usize,

    /// Elements with neither
    pub isolated_elements: usize,

    /// Compilation time in microseconds
    pub compile_time_us: u64,
}

impl CompiledPlan {
    /// Create a new empty compiled plan
    pub fn new() -> Self {
        Self {
            levels: Vec::new(),
            edges: Vec::new(),
            incoming: HashMap::new(),
            warnings: Vec::new(),
            stats: PlanStats::default(),
        }
    }

    /// Check if the plan schedules anything
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Elements in execution order
    pub fn order(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.levels.iter().flatten().copied()
    }

    /// Incoming edges of `element`, in flow order
    pub fn incoming_edges(&self, element: ElementId) -> impl Iterator<Item = &Edge> {
        self.incoming
            .get(&element)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id.index()))
    }

    pub fn level_of(&self, element: ElementId) -> Option<usize> {
        self.levels.iter().position(|level| level.contains(&element))
    }
}

impl Default for CompiledPlan {
    fn default() -> Self {
        Self::new()
    }
}
