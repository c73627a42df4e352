//! Task input model
//!
//! Tasks are read-only inputs to the analysis engine: the caller owns them,
//! we only inspect their text, deadlines, and duration estimates. Every
//! analysis call receives a fully materialized task list and holds no state
//! afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TaskError {
    #[error("Duplicate task id: {0}")]
    DuplicateId(u64),

    #[error("Invalid duration estimate for task {id}: {value} (must be finite and >= 0)")]
    InvalidDuration { id: u64, value: f64 },
}

/// A task as supplied by the calling system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: u64,

    /// Human-readable title
    pub title: String,

    /// Optional free-text description
    #[serde(default)]
    pub description: String,

    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Workflow category (e.g. design, development)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Deadline, if the task has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,

    /// Person responsible for the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    /// Estimated duration in hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_estimate: Option<f64>,
}

impl Task {
    /// Creates a task with the given id and title and no other data
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            category: None,
            deadline: None,
            assignee: None,
            duration_estimate: None,
        }
    }

    /// Combined lowercased text of title, description, and tags.
    ///
    /// This is the haystack the relation detector searches for mentions of
    /// other tasks and for trigger keywords.
    pub fn combined_text(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.tags.join(" ")).to_lowercase()
    }
}

/// Validates a task list as engine input.
///
/// Rejects duplicate ids and negative or non-finite duration estimates.
/// Missing optional fields are fine; they degrade detector scores to zero
/// rather than failing.
pub fn validate_tasks(tasks: &[Task]) -> Result<(), TaskError> {
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !seen.insert(task.id) {
            return Err(TaskError::DuplicateId(task.id));
        }
        if let Some(d) = task.duration_estimate {
            if !d.is_finite() || d < 0.0 {
                return Err(TaskError::InvalidDuration { id: task.id, value: d });
            }
        }
    }
    Ok(())
}

/// Extracts the duration map used by the critical path calculator.
///
/// Tasks without an estimate are simply absent; the calculator defaults
/// them to zero.
pub fn duration_map(tasks: &[Task]) -> BTreeMap<u64, f64> {
    tasks
        .iter()
        .filter_map(|t| t.duration_estimate.map(|d| (t.id, d)))
        .collect()
}
