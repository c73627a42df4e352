//! depmap - dependency analysis for task lists
//!
//! Turns a task list and pairwise dependency signals into a directed graph,
//! checks it for cycles, computes a deterministic execution order, and
//! derives the critical path bounding total completion time. The engine is
//! a pure function of its inputs: no I/O, no persistence, no shared state
//! between calls.

pub mod analysis;
pub mod cli;
pub mod detect;
pub mod domain;
pub mod logging;

pub use analysis::{CriticalPathResult, CycleResult, TopoResult};
pub use detect::{DetectResult, DetectorContext, DetectorRules, RelationDetector};
pub use domain::{
    DependencyGraph, DependencyRelation, DependencyStrength, DependencyType, GraphAnalysis, Task,
};
