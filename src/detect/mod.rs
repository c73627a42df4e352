//! Relation detection
//!
//! Heuristic pairwise dependency detection driven by an injectable ruleset,
//! plus the deduplication pass that collapses repeated
//! (source, target, type) triples.

mod detector;
mod rules;

pub use detector::{dedup_relations, DetectResult, DetectorContext, RelationDetector};
pub use rules::{DetectorRules, RulesError, ScoreWeights, Thresholds};
