//! Graph algorithms over the dependency graph
//!
//! Cycle detection, topological ordering, and critical path calculation.
//! All three are pure functions of a per-call
//! [`DependencyGraph`](crate::domain::DependencyGraph); nothing here caches
//! or shares state between invocations.

mod critical_path;
mod cycles;
mod topo;

pub use critical_path::{critical_path, CriticalPathResult, DURATION_TOLERANCE};
pub use cycles::{find_cycles, CycleResult};
pub use topo::{topological_order, TopoResult};
