//! Cycle detection
//!
//! Iterative depth-first search with an explicit frame stack, shared
//! visited marks, on-stack flags, and parent pointers, so detection and
//! cycle reconstruction run in O(V + E) without recursion limits.

use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::domain::DependencyGraph;

const NO_PARENT: usize = usize::MAX;

/// Cycle detection outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleResult {
    pub has_cycles: bool,
    /// Each cycle in traversal order, first node repeated at the end
    pub cycles: Vec<Vec<u64>>,
    pub cycle_count: usize,
}

/// Finds cycles in the graph, best-effort.
///
/// Each DFS descent stops at the first cycle it encounters; remaining
/// unexplored nodes are still scanned as fresh roots, so every component
/// contributes at most one cycle per descent rather than an exhaustive
/// enumeration. `has_cycles` is exact either way: it is false if and only
/// if the graph is acyclic.
///
/// Roots are scanned in ascending node id and neighbors in edge-insertion
/// order, so the reported cycles are deterministic.
pub fn find_cycles(graph: &DependencyGraph) -> CycleResult {
    let ids: Vec<u64> = graph.nodes().collect();
    let index: HashMap<u64, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let n = ids.len();

    let mut visited = vec![false; n];
    let mut on_stack = vec![false; n];
    let mut parent = vec![NO_PARENT; n];
    let mut cycles = Vec::new();

    for root in 0..n {
        if visited[root] {
            continue;
        }

        // Frames are (node, next successor offset); the path from the root
        // to the top frame is exactly the nodes with on_stack set.
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        visited[root] = true;
        on_stack[root] = true;
        parent[root] = NO_PARENT;

        'descent: while let Some(frame) = stack.last_mut() {
            let v = frame.0;
            let successors = graph.successors(ids[v]);

            if frame.1 < successors.len() {
                let w = index[&successors[frame.1]];
                frame.1 += 1;

                if on_stack[w] {
                    let cycle = reconstruct(&ids, &parent, v, w);
                    debug!(len = cycle.len(), "cycle found");
                    cycles.push(cycle);
                    break 'descent;
                }
                if !visited[w] {
                    visited[w] = true;
                    on_stack[w] = true;
                    parent[w] = v;
                    stack.push((w, 0));
                }
            } else {
                on_stack[v] = false;
                stack.pop();
            }
        }

        // An aborted descent leaves its path flagged; clear it so later
        // roots cannot see stale on-stack state.
        for (v, _) in stack {
            on_stack[v] = false;
        }
    }

    CycleResult {
        has_cycles: !cycles.is_empty(),
        cycle_count: cycles.len(),
        cycles,
    }
}

/// Walks parent pointers from `v` back to the re-entered node `w` and
/// returns the cycle in traversal order, closed with `w`.
fn reconstruct(ids: &[u64], parent: &[usize], v: usize, w: usize) -> Vec<u64> {
    let mut cycle = vec![ids[v]];
    let mut current = v;
    while current != w {
        current = parent[current];
        cycle.push(ids[current]);
    }
    cycle.reverse();
    cycle.push(ids[w]);
    cycle
}
