//! CLI integration tests for depmap
//!
//! These tests drive the binary end to end: write input files, run a
//! command, check the output. JSON mode output is parsed back to verify
//! the result contracts.

use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a command instance for the depmap binary
fn depmap_cmd() -> assert_cmd::Command {
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("depmap"))
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Three tasks forming a chain via explicit mentions: 1 -> 2 -> 3
fn chain_tasks() -> &'static str {
    r#"[
        {"id": 1, "title": "write schema", "duration_estimate": 2.0},
        {"id": 2, "title": "build api", "description": "depends on write schema", "duration_estimate": 3.0},
        {"id": 3, "title": "ship frontend", "description": "blocked by build api", "duration_estimate": 1.0}
    ]"#
}

fn relation(source: u64, target: u64) -> String {
    format!(
        r#"{{"source_task_id": {source}, "target_task_id": {target}, "dependency_type": "blocks", "strength": "moderate", "confidence": 0.8}}"#
    )
}

fn relations_file(dir: &TempDir, name: &str, pairs: &[(u64, u64)]) -> PathBuf {
    let body = pairs
        .iter()
        .map(|(s, t)| relation(*s, *t))
        .collect::<Vec<_>>()
        .join(", ");
    write_file(dir, name, &format!("[{body}]"))
}

fn run_json(args: &[&str]) -> Value {
    let output = depmap_cmd()
        .args(args)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

// =============================================================================
// Detect
// =============================================================================

#[test]
fn test_detect_reports_explicit_chain() {
    let dir = TempDir::new().unwrap();
    let tasks = write_file(&dir, "tasks.json", chain_tasks());

    let result = run_json(&["detect", tasks.to_str().unwrap()]);

    assert!(result["total_dependencies"].as_u64().unwrap() >= 2);
    let deps = result["dependencies"].as_array().unwrap();
    assert!(deps.iter().any(|d| d["source_task_id"] == 2 && d["target_task_id"] == 1));
    assert!(deps.iter().any(|d| d["source_task_id"] == 3 && d["target_task_id"] == 2));
    for dep in deps {
        assert_eq!(dep["dependency_type"], "blocks");
        assert!(dep["auto_detected"].as_bool().unwrap());
    }
    assert!(result["average_confidence"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_detect_empty_task_list() {
    let dir = TempDir::new().unwrap();
    let tasks = write_file(&dir, "tasks.json", "[]");

    let result = run_json(&["detect", tasks.to_str().unwrap()]);

    assert_eq!(result["total_dependencies"], 0);
    assert_eq!(result["average_confidence"], 0.0);
    assert_eq!(result["dependencies"].as_array().unwrap().len(), 0);
}

#[test]
fn test_detect_text_output() {
    let dir = TempDir::new().unwrap();
    let tasks = write_file(&dir, "tasks.json", chain_tasks());

    depmap_cmd()
        .arg("detect")
        .arg(&tasks)
        .assert()
        .success()
        .stdout(predicate::str::contains("Detected"))
        .stdout(predicate::str::contains("2 -> 1"));
}

#[test]
fn test_detect_with_shared_resource_context() {
    let dir = TempDir::new().unwrap();
    let tasks = write_file(
        &dir,
        "tasks.json",
        r#"[
            {"id": 1, "title": "load test gateway", "description": "hammer the staging-db cluster hard",
             "category": "开发", "deadline": "2025-03-01T12:00:00Z", "assignee": "ada"},
            {"id": 2, "title": "migrate gateway", "description": "move staging-db cluster schema",
             "category": "测试", "deadline": "2025-03-03T12:00:00Z", "assignee": "ada"}
        ]"#,
    );
    let context = write_file(
        &dir,
        "context.json",
        r#"{"shared_resources": ["staging-db"]}"#,
    );

    let result = run_json(&[
        "detect",
        tasks.to_str().unwrap(),
        "--context",
        context.to_str().unwrap(),
    ]);

    let deps = result["dependencies"].as_array().unwrap();
    assert!(deps
        .iter()
        .any(|d| d["dependency_type"] == "resource_shared"));
}

#[test]
fn test_detect_with_custom_ruleset() {
    let dir = TempDir::new().unwrap();
    let tasks = write_file(
        &dir,
        "tasks.json",
        r#"[
            {"id": 1, "title": "deploy", "description": "waits-on sign binaries"},
            {"id": 2, "title": "sign binaries"}
        ]"#,
    );
    // The built-in ruleset has no "waits-on" trigger; a custom one does
    let rules = write_file(
        &dir,
        "rules.toml",
        r#"
        [patterns]
        blocks = ["waits-on"]
        "#,
    );

    let without = run_json(&["detect", tasks.to_str().unwrap()]);
    assert_eq!(without["total_dependencies"], 0);

    let with = run_json(&[
        "detect",
        tasks.to_str().unwrap(),
        "--rules",
        rules.to_str().unwrap(),
    ]);
    assert_eq!(with["total_dependencies"], 1);
}

// =============================================================================
// Graph metrics
// =============================================================================

#[test]
fn test_graph_metrics() {
    let dir = TempDir::new().unwrap();
    let relations = relations_file(&dir, "rel.json", &[(1, 2), (1, 3), (2, 3)]);

    let result = run_json(&["graph", relations.to_str().unwrap()]);

    assert_eq!(result["total_nodes"], 3);
    assert_eq!(result["total_edges"], 3);
    assert_eq!(result["nodes_with_dependencies"], 2);
    assert_eq!(result["nodes_with_dependents"], 2);
    assert_eq!(result["max_outgoing_dependencies"], 2);
    assert_eq!(result["max_incoming_dependencies"], 2);
    assert_eq!(result["isolated_nodes"].as_array().unwrap().len(), 0);
}

#[test]
fn test_graph_isolated_nodes_require_task_universe() {
    let dir = TempDir::new().unwrap();
    let relations = relations_file(&dir, "rel.json", &[(1, 2)]);
    let tasks = write_file(
        &dir,
        "tasks.json",
        r#"[{"id": 1, "title": "a"}, {"id": 2, "title": "b"}, {"id": 9, "title": "loner"}]"#,
    );

    // Without the task list the isolated task is invisible
    let bare = run_json(&["graph", relations.to_str().unwrap()]);
    assert_eq!(bare["total_nodes"], 2);
    assert_eq!(bare["isolated_nodes"].as_array().unwrap().len(), 0);

    // With it, the loner shows up
    let with_tasks = run_json(&[
        "graph",
        relations.to_str().unwrap(),
        "--tasks",
        tasks.to_str().unwrap(),
    ]);
    assert_eq!(with_tasks["total_nodes"], 3);
    assert_eq!(with_tasks["isolated_nodes"], serde_json::json!([9]));
}

// =============================================================================
// Cycles
// =============================================================================

#[test]
fn test_cycles_detected() {
    let dir = TempDir::new().unwrap();
    let relations = relations_file(&dir, "rel.json", &[(1, 2), (2, 1)]);

    let result = run_json(&["cycles", relations.to_str().unwrap()]);

    assert_eq!(result["has_cycles"], true);
    assert_eq!(result["cycle_count"], 1);
    assert_eq!(result["cycles"][0], serde_json::json!([1, 2, 1]));
}

#[test]
fn test_no_cycles_in_chain() {
    let dir = TempDir::new().unwrap();
    let relations = relations_file(&dir, "rel.json", &[(1, 2), (2, 3)]);

    let result = run_json(&["cycles", relations.to_str().unwrap()]);

    assert_eq!(result["has_cycles"], false);
    assert_eq!(result["cycle_count"], 0);

    depmap_cmd()
        .arg("cycles")
        .arg(&relations)
        .assert()
        .success()
        .stdout(predicate::str::contains("No circular dependencies"));
}

// =============================================================================
// Order
// =============================================================================

#[test]
fn test_order_chain() {
    let dir = TempDir::new().unwrap();
    let relations = relations_file(&dir, "rel.json", &[(1, 2), (2, 3)]);

    let result = run_json(&["order", relations.to_str().unwrap()]);

    assert_eq!(result["can_be_ordered"], true);
    assert_eq!(result["topological_order"], serde_json::json!([1, 2, 3]));
}

#[test]
fn test_order_refused_on_cycle() {
    let dir = TempDir::new().unwrap();
    let relations = relations_file(&dir, "rel.json", &[(1, 2), (2, 1)]);

    let result = run_json(&["order", relations.to_str().unwrap()]);

    assert_eq!(result["can_be_ordered"], false);
    assert!(result.get("topological_order").is_none());

    depmap_cmd()
        .arg("order")
        .arg(&relations)
        .assert()
        .success()
        .stdout(predicate::str::contains("cannot be ordered"));
}

#[test]
fn test_order_empty_relations() {
    let dir = TempDir::new().unwrap();
    let relations = relations_file(&dir, "rel.json", &[]);

    let result = run_json(&["order", relations.to_str().unwrap()]);

    assert_eq!(result["can_be_ordered"], true);
    assert_eq!(result["topological_order"], serde_json::json!([]));
}

// =============================================================================
// Critical path
// =============================================================================

#[test]
fn test_critical_path_diamond() {
    let dir = TempDir::new().unwrap();
    let relations = relations_file(&dir, "rel.json", &[(1, 2), (1, 3), (2, 4), (3, 4)]);
    let durations = write_file(&dir, "durations.json", r#"{"1": 1.0, "2": 5.0, "3": 2.0, "4": 1.0}"#);

    let result = run_json(&[
        "critical-path",
        relations.to_str().unwrap(),
        "--durations",
        durations.to_str().unwrap(),
    ]);

    assert_eq!(result["critical_path"], serde_json::json!([1, 2, 4]));
    assert_eq!(result["path_length"], 3);
    assert!((result["total_duration"].as_f64().unwrap() - 7.0).abs() < 1e-9);
}

#[test]
fn test_critical_path_durations_from_tasks() {
    let dir = TempDir::new().unwrap();
    let relations = relations_file(&dir, "rel.json", &[(1, 2), (2, 3)]);
    let tasks = write_file(&dir, "tasks.json", chain_tasks());

    let result = run_json(&[
        "critical-path",
        relations.to_str().unwrap(),
        "--tasks",
        tasks.to_str().unwrap(),
    ]);

    assert_eq!(result["critical_path"], serde_json::json!([1, 2, 3]));
    assert!((result["total_duration"].as_f64().unwrap() - 6.0).abs() < 1e-9);
}

#[test]
fn test_critical_path_short_circuits_on_cycle() {
    let dir = TempDir::new().unwrap();
    let relations = relations_file(&dir, "rel.json", &[(1, 2), (2, 1)]);

    let result = run_json(&["critical-path", relations.to_str().unwrap()]);

    assert_eq!(result["critical_path"], serde_json::json!([]));
    assert_eq!(result["total_duration"], 0.0);
    assert_eq!(result["path_length"], 0);
}

#[test]
fn test_critical_path_empty_relations() {
    let dir = TempDir::new().unwrap();
    let relations = relations_file(&dir, "rel.json", &[]);

    let result = run_json(&["critical-path", relations.to_str().unwrap()]);

    assert_eq!(result["critical_path"], serde_json::json!([]));
    assert_eq!(result["total_duration"], 0.0);
    assert_eq!(result["path_length"], 0);
}

// =============================================================================
// Analyze (full pipeline)
// =============================================================================

#[test]
fn test_analyze_full_pipeline() {
    let dir = TempDir::new().unwrap();
    let tasks = write_file(&dir, "tasks.json", chain_tasks());

    let result = run_json(&["analyze", tasks.to_str().unwrap()]);

    assert!(result["detect"]["total_dependencies"].as_u64().unwrap() >= 2);
    assert_eq!(result["cycles"]["has_cycles"], false);
    assert_eq!(result["order"]["can_be_ordered"], true);

    // The detected chain is 2 -> 1 and 3 -> 2, so execution runs 3, 2, 1
    assert_eq!(result["order"]["topological_order"], serde_json::json!([3, 2, 1]));
    assert_eq!(result["critical_path"]["critical_path"], serde_json::json!([3, 2, 1]));
    assert!((result["critical_path"]["total_duration"].as_f64().unwrap() - 6.0).abs() < 1e-9);
    assert_eq!(result["graph"]["total_nodes"], 3);
}

// =============================================================================
// Input validation
// =============================================================================

#[test]
fn test_duplicate_task_ids_rejected() {
    let dir = TempDir::new().unwrap();
    let tasks = write_file(
        &dir,
        "tasks.json",
        r#"[{"id": 1, "title": "a"}, {"id": 1, "title": "b"}]"#,
    );

    depmap_cmd()
        .arg("detect")
        .arg(&tasks)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate task id"));
}

#[test]
fn test_malformed_relation_type_rejected() {
    let dir = TempDir::new().unwrap();
    let relations = write_file(
        &dir,
        "rel.json",
        r#"[{"source_task_id": 1, "target_task_id": 2, "dependency_type": "sideways", "strength": "weak", "confidence": 0.5}]"#,
    );

    depmap_cmd()
        .arg("cycles")
        .arg(&relations)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse"));
}

#[test]
fn test_negative_duration_rejected() {
    let dir = TempDir::new().unwrap();
    let relations = relations_file(&dir, "rel.json", &[(1, 2)]);
    let durations = write_file(&dir, "durations.json", r#"{"1": -3.0}"#);

    depmap_cmd()
        .arg("critical-path")
        .arg(&relations)
        .arg("--durations")
        .arg(&durations)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid duration"));
}

#[test]
fn test_missing_input_file_fails() {
    depmap_cmd()
        .arg("detect")
        .arg(Path::new("no-such-file.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_yaml_task_input() {
    let dir = TempDir::new().unwrap();
    let tasks = write_file(
        &dir,
        "tasks.yaml",
        "- id: 1\n  title: write schema\n- id: 2\n  title: build api\n  description: depends on write schema\n",
    );

    let result = run_json(&["detect", tasks.to_str().unwrap()]);
    assert_eq!(result["total_dependencies"], 1);
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_repeated_runs_are_bit_identical() {
    let dir = TempDir::new().unwrap();
    let tasks = write_file(&dir, "tasks.json", chain_tasks());

    let first = depmap_cmd()
        .args(["analyze", tasks.to_str().unwrap(), "--format", "json"])
        .output()
        .unwrap();
    let second = depmap_cmd()
        .args(["analyze", tasks.to_str().unwrap(), "--format", "json"])
        .output()
        .unwrap();

    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}
