//! Dependency graph built from deduplicated relations
//!
//! The graph is a per-call value: built fresh from a relation list, never
//! cached or shared. Ordered collections keep every iteration order pinned,
//! so two runs over the same input produce identical traversals and results.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::relation::DependencyRelation;

/// Directed task graph with adjacency views derived from the edge list.
///
/// `adjacency` and `reverse_adjacency` are exact projections of `edges`:
/// neighbor lists keep edge-list insertion order, which downstream
/// algorithms rely on for reproducible tie-breaking.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: BTreeSet<u64>,
    edges: Vec<DependencyRelation>,
    adjacency: BTreeMap<u64, Vec<u64>>,
    reverse_adjacency: BTreeMap<u64, Vec<u64>>,
}

impl DependencyGraph {
    /// Builds a graph whose node set is derived from relation endpoints only.
    ///
    /// A task with no incident relation is invisible here; use
    /// [`DependencyGraph::from_relations_with_tasks`] when isolated tasks
    /// should be representable.
    pub fn from_relations(relations: impl IntoIterator<Item = DependencyRelation>) -> Self {
        Self::build(relations, std::iter::empty())
    }

    /// Builds a graph over an explicit node universe plus relation endpoints.
    ///
    /// Supplying the full task id list makes isolated tasks show up in
    /// [`DependencyGraph::analyze`] instead of silently vanishing.
    pub fn from_relations_with_tasks(
        relations: impl IntoIterator<Item = DependencyRelation>,
        task_ids: impl IntoIterator<Item = u64>,
    ) -> Self {
        Self::build(relations, task_ids)
    }

    fn build(
        relations: impl IntoIterator<Item = DependencyRelation>,
        task_ids: impl IntoIterator<Item = u64>,
    ) -> Self {
        let mut graph = Self::default();
        graph.nodes.extend(task_ids);

        for relation in relations {
            graph.nodes.insert(relation.source_task_id);
            graph.nodes.insert(relation.target_task_id);
            graph
                .adjacency
                .entry(relation.source_task_id)
                .or_default()
                .push(relation.target_task_id);
            graph
                .reverse_adjacency
                .entry(relation.target_task_id)
                .or_default()
                .push(relation.source_task_id);
            graph.edges.push(relation);
        }

        graph
    }

    /// Node ids in ascending order
    pub fn nodes(&self) -> impl Iterator<Item = u64> + '_ {
        self.nodes.iter().copied()
    }

    /// The deduplicated relation list this graph was built from
    pub fn edges(&self) -> &[DependencyRelation] {
        &self.edges
    }

    /// Direct successors of a node, in edge-insertion order
    pub fn successors(&self, id: u64) -> &[u64] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Direct predecessors of a node, in edge-insertion order
    pub fn predecessors(&self, id: u64) -> &[u64] {
        self.reverse_adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, id: u64) -> bool {
        self.nodes.contains(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Structural metrics over the adjacency views.
    pub fn analyze(&self) -> GraphAnalysis {
        GraphAnalysis {
            total_nodes: self.node_count(),
            total_edges: self.edge_count(),
            nodes_with_dependencies: self.adjacency.values().filter(|v| !v.is_empty()).count(),
            nodes_with_dependents: self
                .reverse_adjacency
                .values()
                .filter(|v| !v.is_empty())
                .count(),
            max_outgoing_dependencies: self
                .adjacency
                .values()
                .map(Vec::len)
                .max()
                .unwrap_or(0),
            max_incoming_dependencies: self
                .reverse_adjacency
                .values()
                .map(Vec::len)
                .max()
                .unwrap_or(0),
            isolated_nodes: self
                .nodes()
                .filter(|id| self.successors(*id).is_empty() && self.predecessors(*id).is_empty())
                .collect(),
        }
    }
}

/// Summary statistics for a dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphAnalysis {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub nodes_with_dependencies: usize,
    pub nodes_with_dependents: usize,
    pub max_outgoing_dependencies: usize,
    pub max_incoming_dependencies: usize,
    /// Nodes with no incident edge, ascending
    pub isolated_nodes: Vec<u64>,
}
