//! Common test utilities for integration tests.
//!
//! Fixture trees are written into temp directories whose path ends in a
//! `playbooks` segment, matching the layout the pipeline expects.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary `playbooks` tree.
pub struct Fixture {
    _temp: TempDir,
    root: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let temp = tempfile::Builder::new()
            .prefix("rolegraph_test_")
            .tempdir()
            .expect("Failed to create temp dir");
        let root = temp.path().join("playbooks");
        fs::create_dir_all(&root).expect("Failed to create playbooks dir");
        // Discovery reports canonical paths; match them when building expectations
        let root = fs::canonicalize(&root).expect("Failed to canonicalize root");
        Self { _temp: temp, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `content` to `rel` under the root, creating parent directories.
    pub fn file(&self, rel: &str, content: &str) -> &Self {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write fixture file");
        self
    }

    /// Absolute path string of `rel`, as discovery reports it.
    pub fn path(&self, rel: &str) -> String {
        self.root.join(rel).to_string_lossy().into_owned()
    }
}

/// The round-table fixture: two playbooks and four role task files, one of
/// which is malformed.
pub fn round_table() -> Fixture {
    let fixture = Fixture::new();
    fixture
        .file(
            "test_playbook.yml",
            r#"---
- hosts: all
  gather_facts: true
  ignore_errors: true

  roles:
    - windows_common
    - { role: dept_common, app_version: 2 }
  tasks:
    - include_role:
        name: application/application2
"#,
        )
        .file(
            "test2.yml",
            r#"---
- hosts: all
  tasks:
"#,
        )
        .file(
            "roles/windows_common/tasks/main.yml",
            r#"---
- include_role:
    name: applications/test_inclusion
"#,
        )
        .file(
            "roles/dept_common/tasks/main.yml",
            r#"---
- include_role:
    name: applications/test_inclusion
"#,
        )
        .file(
            "roles/application/application2/tasks/main.yml",
            r#"---
- include_role:
    name: applications/test_inclusion
"#,
        )
        .file(
            "roles/applications/test_inclusion/tasks/main.yml",
            r#"---
- name: say hi
  win_ping
    data: hi
"#,
        );
    fixture
}
