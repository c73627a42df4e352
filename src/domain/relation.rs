//! Dependency relations between tasks
//!
//! A relation is a directed edge tagged with a type and strength. Types and
//! strengths are closed enums enforced at construction and deserialization
//! time; a malformed string on the wire is an input error, never a default.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RelationError {
    #[error("Self-dependency not allowed: task {0}")]
    SelfLoop(u64),

    #[error("Confidence out of range for relation {src} -> {target}: {value}")]
    ConfidenceOutOfRange { src: u64, target: u64, value: f64 },
}

/// Kind of dependency between two tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    /// Source must finish before target can start
    Blocks,
    /// Source leads into target (sequencing, not a hard block)
    Enables,
    /// Target is a subtask of source
    Subtask,
    /// Both tasks compete for the same resource
    ResourceShared,
}

impl DependencyType {
    /// Display label, matching the serialized form
    pub fn label(&self) -> &'static str {
        match self {
            DependencyType::Blocks => "blocks",
            DependencyType::Enables => "enables",
            DependencyType::Subtask => "subtask",
            DependencyType::ResourceShared => "resource_shared",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How firmly one task depends on another
///
/// Ordered weakest to strongest, so `Ord` comparisons follow intuition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyStrength {
    Weak,
    Moderate,
    Strong,
    Critical,
}

impl DependencyStrength {
    pub fn label(&self) -> &'static str {
        match self {
            DependencyStrength::Weak => "weak",
            DependencyStrength::Moderate => "moderate",
            DependencyStrength::Strong => "strong",
            DependencyStrength::Critical => "critical",
        }
    }
}

impl fmt::Display for DependencyStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A directed dependency edge between two tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyRelation {
    pub source_task_id: u64,
    pub target_task_id: u64,
    pub dependency_type: DependencyType,
    pub strength: DependencyStrength,

    /// Detector confidence in [0, 1]
    pub confidence: f64,

    /// Human-readable evidence collected by the detector
    #[serde(default)]
    pub reasoning: Vec<String>,

    /// False for relations asserted by the caller rather than detected
    #[serde(default = "default_auto_detected")]
    pub auto_detected: bool,
}

fn default_auto_detected() -> bool {
    true
}

impl DependencyRelation {
    /// Creates a validated relation with empty reasoning.
    pub fn new(
        source_task_id: u64,
        target_task_id: u64,
        dependency_type: DependencyType,
        strength: DependencyStrength,
        confidence: f64,
    ) -> Result<Self, RelationError> {
        let relation = Self {
            source_task_id,
            target_task_id,
            dependency_type,
            strength,
            confidence,
            reasoning: Vec::new(),
            auto_detected: true,
        };
        relation.validate()?;
        Ok(relation)
    }

    /// Checks the structural invariants: no self-loops, confidence in [0, 1].
    ///
    /// Deserialized relations must pass through this before entering the
    /// engine; serde alone cannot express the range constraint.
    pub fn validate(&self) -> Result<(), RelationError> {
        if self.source_task_id == self.target_task_id {
            return Err(RelationError::SelfLoop(self.source_task_id));
        }
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(RelationError::ConfidenceOutOfRange {
                src: self.source_task_id,
                target: self.target_task_id,
                value: self.confidence,
            });
        }
        Ok(())
    }

    /// The dedup identity: two relations with the same key are duplicates.
    pub fn key(&self) -> (u64, u64, DependencyType) {
        (self.source_task_id, self.target_task_id, self.dependency_type)
    }
}
