//! Topological ordering via Kahn's algorithm
//!
//! The ordering is fully pinned: the queue is seeded with in-degree-zero
//! nodes in ascending id, and successors are relaxed in edge-insertion
//! order, so ties always resolve the same way and two runs over identical
//! input produce identical output.

use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use tracing::debug;

use crate::domain::DependencyGraph;

/// Topological sort outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopoResult {
    pub can_be_ordered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topological_order: Option<Vec<u64>>,
}

impl TopoResult {
    fn unorderable() -> Self {
        Self {
            can_be_ordered: false,
            topological_order: None,
        }
    }
}

/// Computes a linear extension of the graph with Kahn's algorithm.
///
/// Callers are expected to have run cycle detection first; if a cycle
/// slipped past anyway, the incomplete order is discarded and the result
/// reports `can_be_ordered: false` instead of panicking.
pub fn topological_order(graph: &DependencyGraph) -> TopoResult {
    let mut in_degree: BTreeMap<u64, usize> = graph
        .nodes()
        .map(|id| (id, graph.predecessors(id).len()))
        .collect();

    // Ascending id seeding; BTreeMap iteration makes this deterministic.
    let mut queue: VecDeque<u64> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());

    while let Some(id) = queue.pop_front() {
        order.push(id);
        for &successor in graph.successors(id) {
            if let Some(degree) = in_degree.get_mut(&successor) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(successor);
                }
            }
        }
    }

    if order.len() != graph.node_count() {
        debug!(
            ordered = order.len(),
            nodes = graph.node_count(),
            "incomplete topological order, graph has a cycle"
        );
        return TopoResult::unorderable();
    }

    TopoResult {
        can_be_ordered: true,
        topological_order: Some(order),
    }
}
