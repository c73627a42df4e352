//! Pairwise relation detection
//!
//! Scans every ordered task pair for explicit trigger-pattern references
//! first, then falls back to a weighted implicit score built from deadline
//! gaps, category affinity, keyword overlap, and shared resources. Pure
//! function of its inputs: missing optional fields degrade sub-scores to
//! zero instead of failing.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

use super::rules::DetectorRules;
use crate::domain::{DependencyRelation, DependencyStrength, DependencyType, Task};

/// Timeline sub-score tiers: deadline gap within a week, a month, beyond
const TIMELINE_WEEK: f64 = 0.8;
const TIMELINE_MONTH: f64 = 0.5;
const TIMELINE_DISTANT: f64 = 0.2;

/// Category sub-score for a configured upstream/downstream pair vs. same category
const CATEGORY_LISTED: f64 = 0.7;
const CATEGORY_SAME: f64 = 0.4;

/// Resource sub-score contributions
const RESOURCE_SAME_ASSIGNEE: f64 = 0.3;
const RESOURCE_SHARED_MENTION: f64 = 0.4;

const SECONDS_PER_DAY: i64 = 86_400;

/// Optional detection context supplied by the caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorContext {
    /// Resources whose mention in both tasks suggests contention
    pub shared_resources: Vec<String>,

    /// Assignee assumed for tasks without one
    pub default_assignee: Option<String>,
}

/// Detection outcome for a task list
#[derive(Debug, Clone, Serialize)]
pub struct DetectResult {
    pub dependencies: Vec<DependencyRelation>,
    pub total_dependencies: usize,
    /// Mean relation confidence, 0.0 when nothing was detected
    pub average_confidence: f64,
}

/// Heuristic dependency detector driven by an injected ruleset.
pub struct RelationDetector {
    rules: DetectorRules,
}

impl RelationDetector {
    pub fn new(rules: DetectorRules) -> Self {
        Self { rules }
    }

    /// Detector with the built-in bilingual ruleset
    pub fn with_defaults() -> Self {
        Self::new(DetectorRules::default())
    }

    /// Detects dependencies across every ordered task pair.
    ///
    /// O(n²) in the number of tasks; the caller batches if that matters.
    /// The returned list is already deduplicated by (source, target, type).
    pub fn detect(&self, tasks: &[Task], context: Option<&DetectorContext>) -> DetectResult {
        let mut relations = Vec::new();

        for (i, source) in tasks.iter().enumerate() {
            for (j, target) in tasks.iter().enumerate() {
                if i == j {
                    continue;
                }
                if let Some(relation) = self.analyze_pair(source, target, context) {
                    debug!(
                        source = relation.source_task_id,
                        target = relation.target_task_id,
                        dependency_type = %relation.dependency_type,
                        confidence = relation.confidence,
                        "detected relation"
                    );
                    relations.push(relation);
                }
            }
        }

        let relations = dedup_relations(relations);
        let average_confidence = if relations.is_empty() {
            0.0
        } else {
            relations.iter().map(|r| r.confidence).sum::<f64>() / relations.len() as f64
        };

        DetectResult {
            total_dependencies: relations.len(),
            average_confidence,
            dependencies: relations,
        }
    }

    fn analyze_pair(
        &self,
        source: &Task,
        target: &Task,
        context: Option<&DetectorContext>,
    ) -> Option<DependencyRelation> {
        self.explicit_relation(source, target)
            .or_else(|| self.implicit_relation(source, target, context))
    }

    /// Explicit pass: the source text must mention the target (by title or
    /// id) and contain one of the configured trigger patterns. The first
    /// matching pattern in ruleset scan order decides the type.
    fn explicit_relation(&self, source: &Task, target: &Task) -> Option<DependencyRelation> {
        let text = source.combined_text();

        let mut references = Vec::new();
        let target_title = target.title.to_lowercase();
        if !target_title.is_empty() && text.contains(&target_title) {
            references.push(format!("references task title '{}'", target_title));
        }
        if text.contains(&target.id.to_string()) {
            references.push(format!("references task id {}", target.id));
        }
        if references.is_empty() {
            return None;
        }

        for (dependency_type, patterns) in &self.rules.trigger_patterns {
            for pattern in patterns {
                if pattern.is_match(&text) {
                    let mut reasoning = references;
                    reasoning.push(format!("matched trigger pattern '{}'", pattern.as_str()));
                    return Some(DependencyRelation {
                        source_task_id: source.id,
                        target_task_id: target.id,
                        dependency_type: *dependency_type,
                        strength: self.strength_from_text(&text),
                        confidence: self.rules.thresholds.explicit_confidence,
                        reasoning,
                        auto_detected: true,
                    });
                }
            }
        }

        None
    }

    /// Implicit pass: weighted sum of gated sub-scores.
    fn implicit_relation(
        &self,
        source: &Task,
        target: &Task,
        context: Option<&DetectorContext>,
    ) -> Option<DependencyRelation> {
        let gate = self.rules.thresholds.sub_score_gate;
        let weights = &self.rules.weights;

        let mut confidence = 0.0;
        let mut reasoning = Vec::new();
        let mut dependency_type = DependencyType::Blocks;

        let timeline = self.timeline_score(source, target);
        if timeline > gate {
            confidence += timeline * weights.timeline;
            reasoning.push(format!("deadline gap suggests ordering (score: {timeline:.2})"));
        }

        let category = self.category_score(source, target);
        if category > gate {
            confidence += category * weights.category;
            reasoning.push(format!("category affinity (score: {category:.2})"));
        }

        let keyword = self.keyword_score(source, target);
        if keyword > gate {
            confidence += keyword * weights.keyword;
            reasoning.push(format!("keyword overlap (score: {keyword:.2})"));
        }

        if let Some(ctx) = context {
            let resource = self.resource_score(source, target, ctx);
            if resource > gate {
                confidence += resource * weights.resource;
                reasoning.push(format!("shared resources or assignee (score: {resource:.2})"));
                dependency_type = DependencyType::ResourceShared;
            }
        }

        if confidence <= self.rules.thresholds.emit {
            return None;
        }

        let strength = if confidence > self.rules.thresholds.moderate {
            DependencyStrength::Moderate
        } else {
            DependencyStrength::Weak
        };

        Some(DependencyRelation {
            source_task_id: source.id,
            target_task_id: target.id,
            dependency_type,
            strength,
            confidence: confidence.min(1.0),
            reasoning,
            auto_detected: true,
        })
    }

    /// Strongest lexicon tier with a keyword present in the text, default
    /// moderate.
    fn strength_from_text(&self, text: &str) -> DependencyStrength {
        for (strength, keywords) in &self.rules.strength_lexicon {
            if keywords.iter().any(|k| text.contains(k.as_str())) {
                return *strength;
            }
        }
        DependencyStrength::Moderate
    }

    /// Deadline gap score: source due before target and close together
    /// suggests the source feeds the target.
    fn timeline_score(&self, source: &Task, target: &Task) -> f64 {
        let (Some(d1), Some(d2)) = (source.deadline, target.deadline) else {
            return 0.0;
        };

        let gap_seconds = (d2 - d1).num_seconds();
        if gap_seconds <= 0 {
            0.0
        } else if gap_seconds <= 7 * SECONDS_PER_DAY {
            TIMELINE_WEEK
        } else if gap_seconds <= 30 * SECONDS_PER_DAY {
            TIMELINE_MONTH
        } else {
            TIMELINE_DISTANT
        }
    }

    fn category_score(&self, source: &Task, target: &Task) -> f64 {
        let (Some(c1), Some(c2)) = (&source.category, &target.category) else {
            return 0.0;
        };
        let c1 = c1.to_lowercase();
        let c2 = c2.to_lowercase();
        if c1.is_empty() || c2.is_empty() {
            return 0.0;
        }

        match self.rules.category_affinity.get(&c1) {
            Some(downstream) if downstream.contains(&c2) => CATEGORY_LISTED,
            _ if c1 == c2 => CATEGORY_SAME,
            _ => 0.0,
        }
    }

    /// Jaccard similarity of stop-word-filtered token sets.
    fn keyword_score(&self, source: &Task, target: &Task) -> f64 {
        let words1 = self.significant_words(&source.combined_text());
        let words2 = self.significant_words(&target.combined_text());
        if words1.is_empty() || words2.is_empty() {
            return 0.0;
        }

        let overlap = words1.intersection(&words2).count();
        let union = words1.union(&words2).count();
        overlap as f64 / union as f64
    }

    fn significant_words(&self, text: &str) -> BTreeSet<String> {
        text.split_whitespace()
            .filter(|w| !self.rules.stop_words.contains(*w))
            .map(str::to_string)
            .collect()
    }

    /// Same effective assignee and/or both tasks mentioning a shared
    /// resource from the context, capped at 1.0.
    fn resource_score(&self, source: &Task, target: &Task, context: &DetectorContext) -> f64 {
        let mut score = 0.0;

        let assignee1 = source.assignee.as_deref().or(context.default_assignee.as_deref());
        let assignee2 = target.assignee.as_deref().or(context.default_assignee.as_deref());
        if let (Some(a1), Some(a2)) = (assignee1, assignee2) {
            if a1 == a2 {
                score += RESOURCE_SAME_ASSIGNEE;
            }
        }

        let text1 = source.combined_text();
        let text2 = target.combined_text();
        for resource in &context.shared_resources {
            let needle = resource.to_lowercase();
            if text1.contains(&needle) && text2.contains(&needle) {
                score += RESOURCE_SHARED_MENTION;
                break;
            }
        }

        score.min(1.0)
    }
}

/// Removes duplicate relations by (source, target, type), first occurrence
/// wins. O(n) via a seen-set; idempotent.
pub fn dedup_relations(relations: Vec<DependencyRelation>) -> Vec<DependencyRelation> {
    let mut seen = HashSet::with_capacity(relations.len());
    relations
        .into_iter()
        .filter(|relation| seen.insert(relation.key()))
        .collect()
}
