//! Critical path calculation
//!
//! Forward earliest-start propagation over the topological order, then a
//! backward trace from the latest-finishing node. The duration-weighted
//! longest chain bounds the minimum completion time of the whole task set.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::topo::topological_order;
use crate::domain::DependencyGraph;

/// Tolerance for the floating-point equality test in the backward trace.
///
/// Durations are caller-supplied hour estimates, so two decimal places of
/// slop is plenty; anything tighter starts tripping over accumulated
/// summation error on long chains.
pub const DURATION_TOLERANCE: f64 = 1e-2;

/// Critical path outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalPathResult {
    /// Task ids from the path's source to its finishing node
    pub critical_path: Vec<u64>,
    /// Sum of durations along the path
    pub total_duration: f64,
    pub path_length: usize,
}

impl CriticalPathResult {
    fn empty() -> Self {
        Self {
            critical_path: Vec::new(),
            total_duration: 0.0,
            path_length: 0,
        }
    }
}

/// Computes the longest duration-weighted path through an acyclic graph.
///
/// Tasks absent from `durations` count as zero hours. If the graph cannot
/// be topologically ordered the computation short-circuits to an empty
/// path rather than attempting a forward pass over a cyclic graph.
///
/// Ties are pinned: the finishing node is the first maximum in ascending
/// node id, and the backward trace takes the first qualifying predecessor
/// in `reverse_adjacency` (edge-insertion) order.
pub fn critical_path(graph: &DependencyGraph, durations: &BTreeMap<u64, f64>) -> CriticalPathResult {
    let topo = topological_order(graph);
    let Some(order) = topo.topological_order else {
        debug!("graph is not orderable, returning empty critical path");
        return CriticalPathResult::empty();
    };
    if order.is_empty() {
        return CriticalPathResult::empty();
    }

    let duration = |id: u64| durations.get(&id).copied().unwrap_or(0.0);

    // Forward pass: earliest start of a node is the latest finish among
    // its predecessors.
    let mut earliest_start: BTreeMap<u64, f64> = BTreeMap::new();
    for &id in &order {
        let start = graph
            .predecessors(id)
            .iter()
            .map(|&p| earliest_start[&p] + duration(p))
            .fold(0.0, f64::max);
        earliest_start.insert(id, start);
    }

    // Finishing node: first maximum of earliest finish, ascending id.
    let mut end_node = None;
    let mut max_finish = f64::NEG_INFINITY;
    for id in graph.nodes() {
        let finish = earliest_start[&id] + duration(id);
        if finish > max_finish {
            max_finish = finish;
            end_node = Some(id);
        }
    }
    let Some(end_node) = end_node else {
        return CriticalPathResult::empty();
    };

    // Backward trace: step to the predecessor whose finish explains the
    // current node's start, until a source is reached.
    let mut path = Vec::new();
    let mut current = end_node;
    loop {
        path.push(current);
        let required_start = earliest_start[&current];
        let next = graph.predecessors(current).iter().copied().find(|&p| {
            (earliest_start[&p] + duration(p) - required_start).abs() < DURATION_TOLERANCE
        });
        match next {
            Some(p) => current = p,
            None => break,
        }
    }
    path.reverse();

    let total_duration = path.iter().map(|&id| duration(id)).sum();
    CriticalPathResult {
        path_length: path.len(),
        total_duration,
        critical_path: path,
    }
}
