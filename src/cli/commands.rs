//! Analysis commands
//!
//! Each command is one engine operation: load the inputs, run the pure
//! analysis, print the result. Nothing is persisted; every invocation
//! rebuilds its graph from the input files.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

use super::input;
use super::output::Output;
use crate::analysis::{critical_path, find_cycles, topological_order};
use crate::detect::{DetectorRules, RelationDetector};
use crate::domain::{duration_map, DependencyGraph, DependencyRelation, Task};

fn build_detector(rules: Option<&Path>) -> Result<RelationDetector> {
    let rules = match rules {
        Some(path) => DetectorRules::load(path)
            .with_context(|| format!("Failed to load ruleset {}", path.display()))?,
        None => DetectorRules::default(),
    };
    Ok(RelationDetector::new(rules))
}

/// `depmap detect` - detect dependencies among tasks
pub fn detect(
    output: &Output,
    tasks_path: &Path,
    context_path: Option<&Path>,
    rules_path: Option<&Path>,
) -> Result<()> {
    let tasks = input::load_tasks(tasks_path)?;
    let context = context_path.map(input::load_context).transpose()?;
    let detector = build_detector(rules_path)?;

    let result = detector.detect(&tasks, context.as_ref());
    info!(
        tasks = tasks.len(),
        dependencies = result.total_dependencies,
        "detection finished"
    );

    output.json(&result)?;
    output.line(format!(
        "Detected {} dependencies (average confidence {:.2})",
        result.total_dependencies, result.average_confidence
    ));
    for relation in &result.dependencies {
        output.line(format!(
            "  {} -> {} [{}/{}] confidence {:.2}",
            relation.source_task_id,
            relation.target_task_id,
            relation.dependency_type,
            relation.strength,
            relation.confidence
        ));
    }
    Ok(())
}

/// `depmap graph` - structural metrics for a relation set
pub fn graph(output: &Output, relations_path: &Path, tasks_path: Option<&Path>) -> Result<()> {
    let relations = input::load_relations(relations_path)?;
    let graph = build_graph(relations, tasks_path)?;

    let analysis = graph.analyze();
    output.json(&analysis)?;
    output.line("Dependency graph");
    output.field("nodes", analysis.total_nodes);
    output.field("edges", analysis.total_edges);
    output.field("nodes with dependencies", analysis.nodes_with_dependencies);
    output.field("nodes with dependents", analysis.nodes_with_dependents);
    output.field("max outgoing", analysis.max_outgoing_dependencies);
    output.field("max incoming", analysis.max_incoming_dependencies);
    output.field("isolated nodes", format_list(&analysis.isolated_nodes));
    Ok(())
}

/// `depmap cycles` - find circular dependencies
pub fn cycles(output: &Output, relations_path: &Path) -> Result<()> {
    let relations = input::load_relations(relations_path)?;
    let graph = DependencyGraph::from_relations(relations);

    let result = find_cycles(&graph);
    output.json(&result)?;
    if result.has_cycles {
        output.line(format!("Found {} circular dependencies", result.cycle_count));
        for cycle in &result.cycles {
            output.line(format!("  {}", format_path(cycle)));
        }
    } else {
        output.line("No circular dependencies found");
    }
    Ok(())
}

/// `depmap order` - topological ordering of a relation set
pub fn order(output: &Output, relations_path: &Path) -> Result<()> {
    let relations = input::load_relations(relations_path)?;
    let graph = DependencyGraph::from_relations(relations);

    // Cycle check first; Kahn's completeness test stays as a backstop.
    let cycle_result = find_cycles(&graph);
    let result = if cycle_result.has_cycles {
        crate::analysis::TopoResult {
            can_be_ordered: false,
            topological_order: None,
        }
    } else {
        topological_order(&graph)
    };

    output.json(&result)?;
    match &result.topological_order {
        Some(order) => output.line(format!("Execution order: {}", format_path(order))),
        None => output.line("Tasks cannot be ordered: the graph has circular dependencies"),
    }
    Ok(())
}

/// `depmap critical-path` - longest duration-weighted chain
pub fn critical(
    output: &Output,
    relations_path: &Path,
    tasks_path: Option<&Path>,
    durations_path: Option<&Path>,
) -> Result<()> {
    let relations = input::load_relations(relations_path)?;
    let tasks = tasks_path.map(input::load_tasks).transpose()?;

    let graph = match &tasks {
        Some(tasks) => {
            DependencyGraph::from_relations_with_tasks(relations, tasks.iter().map(|t| t.id))
        }
        None => DependencyGraph::from_relations(relations),
    };

    let mut durations = tasks.as_deref().map(duration_map).unwrap_or_default();
    if let Some(path) = durations_path {
        // Explicit map entries override task estimates
        durations.extend(input::load_durations(path)?);
    }

    let result = critical_path(&graph, &durations);
    output.json(&result)?;
    output.line(format!(
        "Critical path ({} tasks, {:.1}h total): {}",
        result.path_length,
        result.total_duration,
        format_path(&result.critical_path)
    ));
    Ok(())
}

/// Combined report for `depmap analyze`
#[derive(Serialize)]
struct AnalyzeReport {
    detect: crate::detect::DetectResult,
    graph: crate::domain::GraphAnalysis,
    cycles: crate::analysis::CycleResult,
    order: crate::analysis::TopoResult,
    critical_path: crate::analysis::CriticalPathResult,
}

/// `depmap analyze` - full pipeline from a task list
pub fn analyze(
    output: &Output,
    tasks_path: &Path,
    context_path: Option<&Path>,
    rules_path: Option<&Path>,
) -> Result<()> {
    let tasks = input::load_tasks(tasks_path)?;
    let context = context_path.map(input::load_context).transpose()?;
    let detector = build_detector(rules_path)?;

    let detect_result = detector.detect(&tasks, context.as_ref());
    let graph = DependencyGraph::from_relations_with_tasks(
        detect_result.dependencies.clone(),
        tasks.iter().map(|t| t.id),
    );
    let graph_analysis = graph.analyze();
    let cycle_result = find_cycles(&graph);
    let order_result = topological_order(&graph);
    let path_result = critical_path(&graph, &duration_map(&tasks));

    output.line(format!(
        "Analyzed {} tasks: {} dependencies, {} cycles",
        tasks.len(),
        detect_result.total_dependencies,
        cycle_result.cycle_count
    ));
    match &order_result.topological_order {
        Some(order) => output.line(format!("Execution order: {}", format_path(order))),
        None => output.line("Tasks cannot be ordered: the graph has circular dependencies"),
    }
    output.line(format!(
        "Critical path ({:.1}h): {}",
        path_result.total_duration,
        format_path(&path_result.critical_path)
    ));

    let report = AnalyzeReport {
        detect: detect_result,
        graph: graph_analysis,
        cycles: cycle_result,
        order: order_result,
        critical_path: path_result,
    };
    output.json(&report)?;
    Ok(())
}

fn build_graph(
    relations: Vec<DependencyRelation>,
    tasks_path: Option<&Path>,
) -> Result<DependencyGraph> {
    match tasks_path {
        Some(path) => {
            let tasks: Vec<Task> = input::load_tasks(path)?;
            Ok(DependencyGraph::from_relations_with_tasks(
                relations,
                tasks.iter().map(|t| t.id),
            ))
        }
        None => Ok(DependencyGraph::from_relations(relations)),
    }
}

fn format_path(ids: &[u64]) -> String {
    if ids.is_empty() {
        "(empty)".to_string()
    } else {
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

fn format_list(ids: &[u64]) -> String {
    if ids.is_empty() {
        "(none)".to_string()
    } else {
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
