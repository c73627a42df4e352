//! Input file loading
//!
//! Task lists, relation lists, contexts, and duration maps arrive as JSON
//! or YAML files (chosen by extension). Everything is validated at the
//! boundary: structural contract violations fail fast here, before any
//! graph is built.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;

use crate::detect::{dedup_relations, DetectorContext};
use crate::domain::{validate_tasks, DependencyRelation, Task};

fn parse_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
    } else {
        serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// Loads and validates a task list.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    let tasks: Vec<Task> = parse_file(path)?;
    validate_tasks(&tasks).with_context(|| format!("Invalid task list in {}", path.display()))?;
    Ok(tasks)
}

/// Loads, validates, and deduplicates a relation list.
///
/// Deduplication is idempotent, so feeding an already-clean detector
/// output through here changes nothing.
pub fn load_relations(path: &Path) -> Result<Vec<DependencyRelation>> {
    let relations: Vec<DependencyRelation> = parse_file(path)?;
    for relation in &relations {
        relation
            .validate()
            .with_context(|| format!("Invalid relation in {}", path.display()))?;
    }
    Ok(dedup_relations(relations))
}

/// Loads a detection context.
pub fn load_context(path: &Path) -> Result<DetectorContext> {
    parse_file(path)
}

/// Loads a task id -> duration (hours) map.
pub fn load_durations(path: &Path) -> Result<BTreeMap<u64, f64>> {
    let durations: BTreeMap<u64, f64> = parse_file(path)?;
    for (id, value) in &durations {
        if !value.is_finite() || *value < 0.0 {
            bail!(
                "Invalid duration for task {id} in {}: {value} (must be finite and >= 0)",
                path.display()
            );
        }
    }
    Ok(durations)
}
