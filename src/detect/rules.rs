//! Detector ruleset
//!
//! All lookup tables the relation detector consults live here as one
//! immutable value handed to the detector's constructor, so tests and
//! callers can substitute alternate rulesets. A TOML file can override any
//! section; omitted sections keep the built-in defaults.
//!
//! The built-in tables are bilingual (Chinese/English) because the task
//! corpora this engine was built for mix both.

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

use crate::domain::{DependencyStrength, DependencyType};

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("Failed to read ruleset file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse ruleset: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid trigger pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("Invalid value for {name}: {value} (must be within [0, 1])")]
    OutOfRange { name: &'static str, value: f64 },
}

/// Weights applied to the implicit sub-scores
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoreWeights {
    pub timeline: f64,
    pub category: f64,
    pub keyword: f64,
    pub resource: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            timeline: 0.4,
            category: 0.3,
            keyword: 0.3,
            resource: 0.2,
        }
    }
}

/// Detection thresholds
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// A sub-score must exceed this to contribute at all
    pub sub_score_gate: f64,
    /// Combined confidence must exceed this for a relation to be emitted
    pub emit: f64,
    /// Above this the emitted strength is moderate rather than weak
    pub moderate: f64,
    /// Confidence assigned to explicit trigger-pattern matches
    pub explicit_confidence: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            sub_score_gate: 0.3,
            emit: 0.6,
            moderate: 0.7,
            explicit_confidence: 0.8,
        }
    }
}

/// Compiled, immutable configuration for the relation detector.
pub struct DetectorRules {
    /// Trigger patterns in scan order: blocks, subtask, enables,
    /// resource_shared. The first matching pattern decides the relation
    /// type, so this order is part of the contract.
    pub trigger_patterns: Vec<(DependencyType, Vec<Regex>)>,

    /// Strength keywords scanned strongest tier first
    pub strength_lexicon: Vec<(DependencyStrength, Vec<String>)>,

    /// category -> downstream categories it typically feeds into
    pub category_affinity: BTreeMap<String, Vec<String>>,

    /// Tokens ignored by the keyword-overlap score
    pub stop_words: BTreeSet<String>,

    pub weights: ScoreWeights,
    pub thresholds: Thresholds,
}

impl Default for DetectorRules {
    fn default() -> Self {
        // Unwrap is safe: the built-in table compiles, covered by a test.
        Self::from_file(RulesFile::default()).expect("built-in ruleset must be valid")
    }
}

impl DetectorRules {
    /// Parses and compiles a ruleset from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, RulesError> {
        let file: RulesFile = toml::from_str(text)?;
        Self::from_file(file)
    }

    /// Reads and compiles a ruleset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn from_file(file: RulesFile) -> Result<Self, RulesError> {
        let patterns = file.patterns.unwrap_or_default();
        let strength = file.strength.unwrap_or_default();
        let weights = file.weights.unwrap_or_default();
        let thresholds = file.thresholds.unwrap_or_default();

        for (name, value) in [
            ("weights.timeline", weights.timeline),
            ("weights.category", weights.category),
            ("weights.keyword", weights.keyword),
            ("weights.resource", weights.resource),
            ("thresholds.sub_score_gate", thresholds.sub_score_gate),
            ("thresholds.emit", thresholds.emit),
            ("thresholds.moderate", thresholds.moderate),
            ("thresholds.explicit_confidence", thresholds.explicit_confidence),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(RulesError::OutOfRange { name, value });
            }
        }

        let trigger_patterns = vec![
            (DependencyType::Blocks, compile_all(&patterns.blocks)?),
            (DependencyType::Subtask, compile_all(&patterns.subtask)?),
            (DependencyType::Enables, compile_all(&patterns.enables)?),
            (
                DependencyType::ResourceShared,
                compile_all(&patterns.resource_shared)?,
            ),
        ];

        let strength_lexicon = vec![
            (DependencyStrength::Critical, strength.critical),
            (DependencyStrength::Strong, strength.strong),
            (DependencyStrength::Moderate, strength.moderate),
            (DependencyStrength::Weak, strength.weak),
        ];

        Ok(Self {
            trigger_patterns,
            strength_lexicon,
            category_affinity: file.categories.unwrap_or_else(default_categories),
            stop_words: file
                .stop_words
                .map(|words| words.into_iter().collect())
                .unwrap_or_else(default_stop_words),
            weights,
            thresholds,
        })
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, RulesError> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|source| RulesError::InvalidPattern {
                    pattern: p.clone(),
                    source,
                })
        })
        .collect()
}

/// Raw ruleset as it appears in a TOML file
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RulesFile {
    patterns: Option<PatternsSection>,
    strength: Option<StrengthSection>,
    categories: Option<BTreeMap<String, Vec<String>>>,
    stop_words: Option<Vec<String>>,
    weights: Option<ScoreWeights>,
    thresholds: Option<Thresholds>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PatternsSection {
    blocks: Vec<String>,
    subtask: Vec<String>,
    enables: Vec<String>,
    resource_shared: Vec<String>,
}

impl Default for PatternsSection {
    fn default() -> Self {
        Self {
            blocks: to_strings(&[
                r"(完成|finish).*后.*才能",
                r"(等待|wait).*完成",
                r"(依赖|depend).*",
                r"需要.*先.*",
                r"(前置|prerequisite).*",
                r"after.*complete",
                r"depends on",
                r"blocked by",
                r"requires.*first",
            ]),
            subtask: to_strings(&[
                r"(子任务|subtask)",
                r"(分解|break down).*为",
                r"(包含|includes?).*步骤",
                r"consists of",
                r"part of",
                r"under.*task",
            ]),
            enables: to_strings(&[
                r"(然后|then).*",
                r"(接着|next).*",
                r"(顺序|sequence).*",
                r"followed by",
                r"in order",
                r"step.*\d+",
            ]),
            resource_shared: to_strings(&[
                r"(共享|share).*资源",
                r"(同一|same).*人员",
                r"(相同|same).*环境",
                r"shared resource",
                r"same team",
                r"common.*component",
            ]),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StrengthSection {
    critical: Vec<String>,
    strong: Vec<String>,
    moderate: Vec<String>,
    weak: Vec<String>,
}

impl Default for StrengthSection {
    fn default() -> Self {
        Self {
            critical: to_strings(&[
                "必须", "绝对", "关键", "critical", "must", "essential", "不可缺少",
            ]),
            strong: to_strings(&[
                "重要", "需要", "应该", "important", "should", "required", "强烈依赖",
            ]),
            moderate: to_strings(&[
                "最好", "建议", "推荐", "recommend", "suggest", "prefer", "适宜",
            ]),
            weak: to_strings(&[
                "可选", "考虑", "可能", "optional", "consider", "might", "弱依赖",
            ]),
        }
    }
}

fn default_categories() -> BTreeMap<String, Vec<String>> {
    let mut map = BTreeMap::new();
    map.insert("设计".to_string(), to_strings(&["开发", "测试"]));
    map.insert("开发".to_string(), to_strings(&["测试", "部署"]));
    map.insert("测试".to_string(), to_strings(&["部署", "上线"]));
    map.insert("文档".to_string(), to_strings(&["培训", "发布"]));
    map
}

fn default_stop_words() -> BTreeSet<String> {
    ["的", "是", "和", "或", "但", "the", "and", "or", "but", "with", "for"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
