//! Domain models for the dependency engine
//!
//! Pure data types without any I/O concerns: tasks as supplied by the
//! caller, typed dependency relations, and the per-call dependency graph.

mod graph;
mod relation;
mod task;

pub use graph::{DependencyGraph, GraphAnalysis};
pub use relation::{DependencyRelation, DependencyStrength, DependencyType, RelationError};
pub use task::{duration_map, validate_tasks, Task, TaskError};
