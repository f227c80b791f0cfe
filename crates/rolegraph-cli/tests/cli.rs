//! End-to-end tests for the rolegraph command
//!
//! Each test builds a small playbook tree in a temp directory and runs the
//! binary against it. `HOME` is pointed at the temp directory so a global
//! config on the host cannot leak in.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the rolegraph binary, isolated from the host config
#[allow(deprecated)]
fn rolegraph(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rolegraph").expect("Failed to find rolegraph binary");
    cmd.env("HOME", home)
        .env_remove("ROLEGRAPH_ROOT")
        .env_remove("ROLEGRAPH_CONFIG");
    cmd
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A site playbook, two roles, and one dangling inclusion.
fn setup_tree() -> TempDir {
    let dir = tempfile::Builder::new()
        .prefix("rolegraph_cli_")
        .tempdir()
        .unwrap();
    let root = dir.path();

    write(
        root,
        "site.yml",
        "- hosts: all\n  roles:\n    - baseline_common\n  tasks:\n    - include_role:\n        name: frontend_webserver\n    - include_role:\n        name: vanished_role\n",
    );
    write(
        root,
        "roles/baseline_common/tasks/main.yml",
        "- name: packages\n  package:\n    name: curl\n- include_role:\n    name: frontend_webserver\n",
    );
    write(
        root,
        "roles/frontend_webserver/tasks/main.yml",
        "- name: nginx\n  package:\n    name: nginx\n",
    );
    write(root, "roles/baseline_common/vars/main.yml", "packages:\n  - curl\n");

    dir
}

// ============================================================================
// Help
// ============================================================================

#[test]
fn test_help_shows_all_commands() {
    let home = TempDir::new().unwrap();
    rolegraph(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("graph"))
        .stdout(predicate::str::contains("edges"))
        .stdout(predicate::str::contains("nodes"))
        .stdout(predicate::str::contains("stats"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("--root"));
}

// ============================================================================
// Graph
// ============================================================================

#[test]
fn test_graph_stdout_emits_dot() {
    let tree = setup_tree();
    rolegraph(tree.path())
        .arg("--root")
        .arg(tree.path())
        .args(["graph", "--stdout", "--title", "Site roles"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("// Site roles"))
        .stdout(predicate::str::contains("digraph {"))
        .stdout(predicate::str::contains("size=\"18,50\";"))
        .stdout(predicate::str::contains("rankdir=\"LR\";"))
        .stdout(predicate::str::contains(
            "label=\"roles/frontend_webserver/tasks/main.yml\"",
        ))
        .stdout(predicate::str::contains(
            "\"vanished_role\" [label=\"vanished_role\", style=\"rounded,dashed\"",
        ));
}

#[test]
fn test_graph_writes_output_file() {
    let tree = setup_tree();
    let out = tree.path().join("out").join("roles.gv");

    rolegraph(tree.path())
        .arg("--root")
        .arg(tree.path())
        .arg("graph")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote 4 edge(s)"));

    let dot = fs::read_to_string(&out).unwrap();
    assert!(dot.contains("digraph {"));
    assert!(dot.trim_end().ends_with('}'));
}

#[test]
fn test_graph_missing_root_fails() {
    let home = TempDir::new().unwrap();
    rolegraph(home.path())
        .args(["--root", "/definitely/not/here", "graph", "--stdout"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to build graph"));
}

// ============================================================================
// Edges and nodes
// ============================================================================

#[test]
fn test_edges_lists_each_edge_once() {
    let tree = setup_tree();
    let output = rolegraph(tree.path())
        .arg("--root")
        .arg(tree.path())
        .arg("edges")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().any(|l| l.ends_with("site.yml -> vanished_role")));
    assert_eq!(
        lines
            .iter()
            .filter(|l| l.ends_with("roles/frontend_webserver/tasks/main.yml"))
            .count(),
        2
    );
}

#[test]
fn test_default_root_keeps_platform_scope() {
    let home = TempDir::new().unwrap();
    let root = home.path().join("playbooks");
    write(&root, "windows/site.yml", "- hosts: win\n  roles:\n    - common\n");
    write(&root, "linux/roles/common/tasks/main.yml", "- ping:\n");

    let output = rolegraph(home.path())
        .current_dir(&root)
        .arg("edges")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.trim_end().ends_with("windows/site.yml -> common"));
}

#[test]
fn test_edges_unresolved_json() {
    let tree = setup_tree();
    let output = rolegraph(tree.path())
        .arg("--root")
        .arg(tree.path())
        .args(["edges", "--unresolved", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let edges: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let edges = edges.as_array().unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["target"], "vanished_role");
}

#[test]
fn test_nodes_excludes_reserved_directories() {
    let tree = setup_tree();
    rolegraph(tree.path())
        .arg("--root")
        .arg(tree.path())
        .args(["nodes", "--category", "role"])
        .assert()
        .success()
        .stdout(predicate::str::contains("roles/baseline_common/tasks/main.yml"))
        .stdout(predicate::str::contains("site.yml").not())
        .stdout(predicate::str::contains("vars/main.yml").not());
}

// ============================================================================
// Stats
// ============================================================================

#[test]
fn test_stats_json() {
    let tree = setup_tree();
    let output = rolegraph(tree.path())
        .arg("--root")
        .arg(tree.path())
        .args(["--sequential", "stats", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["build"]["playbooks"], 1);
    assert_eq!(stats["build"]["roles"], 2);
    assert_eq!(stats["build"]["unresolved"], 1);
    assert_eq!(stats["graph"]["edge_count"], 4);
    assert_eq!(stats["graph"]["unresolved"][0], "vanished_role");
    assert_eq!(stats["graph"]["has_cycle"], false);
}

#[test]
fn test_report_lists_unresolved_mentions() {
    let tree = setup_tree();
    rolegraph(tree.path())
        .arg("--root")
        .arg(tree.path())
        .args(["--quiet", "--report", "stats"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Diagnostics (1):"))
        .stderr(predicate::str::contains("[unresolved]"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_init_and_local_override() {
    let tree = setup_tree();
    rolegraph(tree.path())
        .arg("--root")
        .arg(tree.path())
        .args(["config", "init"])
        .assert()
        .success();

    let config_path = tree.path().join(".rolegraph").join("config.toml");
    assert!(config_path.exists());

    fs::write(&config_path, "[render]\nrankdir = \"TB\"\n").unwrap();
    rolegraph(tree.path())
        .arg("--root")
        .arg(tree.path())
        .args(["graph", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rankdir=\"TB\";"));
}

#[test]
fn test_config_show_prints_toml() {
    let tree = setup_tree();
    rolegraph(tree.path())
        .arg("--root")
        .arg(tree.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[layout]"))
        .stdout(predicate::str::contains("platform_marker = \"playbooks\""));
}

#[test]
fn test_invalid_config_file_fails() {
    let tree = setup_tree();
    let bad = tree.path().join("bad.toml");
    fs::write(&bad, "[logging]\nlevel = \"loud\"\n").unwrap();

    rolegraph(tree.path())
        .arg("--root")
        .arg(tree.path())
        .arg("--config")
        .arg(&bad)
        .arg("stats")
        .assert()
        .failure();
}
