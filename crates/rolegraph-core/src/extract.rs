//! Mention extraction
//!
//! Turns a parsed [`Document`] into raw [`Mention`]s: unresolved references
//! from one node to a role by name or partial path. Playbooks and role task
//! files have different shapes, so each gets its own [`MentionExtractor`].
//!
//! Unexpected structures inside an otherwise valid document are reported as
//! `ShapeMismatch` diagnostics and skipped; they never fail extraction.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::loader::{value_kind, Document};

/// An unresolved dependency reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Mention {
    /// Path of the node the mention was found in
    pub source: String,
    /// Role name, partial path or qualified name as written
    pub target: String,
}

impl Mention {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Which task keys count as inclusions, per document shape.
///
/// `include` is honoured in role task files but not in playbooks. The two
/// lists are kept separate so the asymmetry stays visible and configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionPolicy {
    /// Task keys recognised in a playbook's `tasks` list
    pub playbook_include_keys: Vec<String>,
    /// Task keys recognised in role task files
    pub role_include_keys: Vec<String>,
    /// Keys of a block entry whose value is a nested task list
    pub block_keys: Vec<String>,
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self {
            playbook_include_keys: vec!["include_role".to_string()],
            role_include_keys: vec!["include".to_string(), "include_role".to_string()],
            block_keys: vec![
                "block".to_string(),
                "rescue".to_string(),
                "always".to_string(),
            ],
        }
    }
}

/// Extracts mentions from one document shape.
pub trait MentionExtractor: Send + Sync {
    fn extract(&self, node: &str, document: &Document, sink: &dyn DiagnosticSink)
        -> Vec<Mention>;
}

// ============================================================================
// Playbooks
// ============================================================================

/// Reads the declared `roles` list and `include_role` tasks of a playbook.
#[derive(Debug, Clone, Default)]
pub struct PlaybookExtractor {
    policy: ExtractionPolicy,
}

impl PlaybookExtractor {
    pub fn new(policy: ExtractionPolicy) -> Self {
        Self { policy }
    }

    fn declared_roles(&self, node: &str, play: &Mapping, sink: &dyn DiagnosticSink) -> Vec<String> {
        let Some(roles) = play.get("roles") else {
            return Vec::new();
        };
        let roles = match roles {
            Value::Sequence(roles) => roles,
            Value::Null => return Vec::new(),
            other => {
                shape_mismatch(sink, node, format!("roles is {}, not a list", value_kind(other)));
                return Vec::new();
            }
        };

        let mut names = Vec::new();
        for entry in roles {
            match entry {
                Value::String(name) => names.push(name.clone()),
                Value::Mapping(map) => match map.get("role") {
                    Some(Value::String(name)) => names.push(name.clone()),
                    _ => shape_mismatch(sink, node, "role entry has no string `role` key"),
                },
                other => shape_mismatch(
                    sink,
                    node,
                    format!("role entry is {}", value_kind(other)),
                ),
            }
        }
        names
    }

    fn inline_inclusions(
        &self,
        node: &str,
        play: &Mapping,
        sink: &dyn DiagnosticSink,
    ) -> Vec<String> {
        let tasks = match play.get("tasks") {
            None | Some(Value::Null) => return Vec::new(),
            Some(Value::Sequence(tasks)) => tasks,
            Some(other) => {
                shape_mismatch(sink, node, format!("tasks is {}, not a list", value_kind(other)));
                return Vec::new();
            }
        };

        let mut names = Vec::new();
        for task in tasks {
            let Value::Mapping(task) = task else {
                shape_mismatch(sink, node, format!("task is {}", value_kind(task)));
                continue;
            };
            for key in &self.policy.playbook_include_keys {
                let Some(value) = task.get(key.as_str()) else {
                    continue;
                };
                match value.get("name") {
                    Some(Value::String(name)) => names.push(name.clone()),
                    _ => shape_mismatch(sink, node, format!("`{}` has no string `name`", key)),
                }
            }
        }
        names
    }
}

impl MentionExtractor for PlaybookExtractor {
    fn extract(
        &self,
        node: &str,
        document: &Document,
        sink: &dyn DiagnosticSink,
    ) -> Vec<Mention> {
        let plays = document.entries();
        let Some(first) = plays.first() else {
            return Vec::new();
        };
        if plays.len() > 1 {
            debug!("{}: only the first of {} plays is inspected", node, plays.len());
        }
        let Value::Mapping(play) = first else {
            shape_mismatch(sink, node, format!("play is {}", value_kind(first)));
            return Vec::new();
        };

        self.declared_roles(node, play, sink)
            .into_iter()
            .chain(self.inline_inclusions(node, play, sink))
            .map(|target| Mention::new(node, target))
            .collect()
    }
}

// ============================================================================
// Roles
// ============================================================================

/// Reads `include`/`include_role` tasks of a role task file, flattening one
/// level of block grouping.
#[derive(Debug, Clone, Default)]
pub struct RoleExtractor {
    policy: ExtractionPolicy,
}

impl RoleExtractor {
    pub fn new(policy: ExtractionPolicy) -> Self {
        Self { policy }
    }

    fn block_tasks<'a>(
        &self,
        node: &str,
        task: &'a Mapping,
        sink: &dyn DiagnosticSink,
    ) -> Option<Vec<&'a Value>> {
        let mut found = false;
        let mut nested = Vec::new();
        for key in &self.policy.block_keys {
            let Some(value) = task.get(key.as_str()) else {
                continue;
            };
            found = true;
            match value {
                Value::Sequence(items) => nested.extend(items.iter()),
                Value::Null => {}
                other => shape_mismatch(
                    sink,
                    node,
                    format!("`{}` is {}, not a list", key, value_kind(other)),
                ),
            }
        }
        found.then_some(nested)
    }

    fn task_mentions(&self, node: &str, task: &Value, sink: &dyn DiagnosticSink) -> Vec<String> {
        let Value::Mapping(task) = task else {
            return Vec::new();
        };

        let mut names = Vec::new();
        for key in &self.policy.role_include_keys {
            let Some(value) = task.get(key.as_str()) else {
                continue;
            };
            match value {
                Value::String(name) => names.push(name.clone()),
                Value::Mapping(map) => match map.get("name") {
                    Some(Value::String(name)) => names.push(name.clone()),
                    _ => shape_mismatch(sink, node, format!("`{}` has no string `name`", key)),
                },
                other => shape_mismatch(
                    sink,
                    node,
                    format!("`{}` is {}", key, value_kind(other)),
                ),
            }
        }
        names
    }
}

impl MentionExtractor for RoleExtractor {
    fn extract(
        &self,
        node: &str,
        document: &Document,
        sink: &dyn DiagnosticSink,
    ) -> Vec<Mention> {
        let mut targets = Vec::new();
        for entry in document.entries() {
            let nested = match entry {
                Value::Mapping(task) => self.block_tasks(node, task, sink),
                _ => None,
            };
            match nested {
                // Only one level: blocks inside blocks are not descended into
                Some(tasks) => {
                    for task in tasks {
                        targets.extend(self.task_mentions(node, task, sink));
                    }
                }
                None => targets.extend(self.task_mentions(node, entry, sink)),
            }
        }

        targets
            .into_iter()
            .map(|target| Mention::new(node, target))
            .collect()
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Both extractors, selected by document shape.
#[derive(Debug, Clone, Default)]
pub struct Extractors {
    playbook: PlaybookExtractor,
    role: RoleExtractor,
}

impl Extractors {
    pub fn new(policy: ExtractionPolicy) -> Self {
        Self {
            playbook: PlaybookExtractor::new(policy.clone()),
            role: RoleExtractor::new(policy),
        }
    }

    pub fn for_document(&self, document: &Document) -> &dyn MentionExtractor {
        match document {
            Document::Playbook(_) => &self.playbook,
            Document::Role(_) => &self.role,
        }
    }

    pub fn extract(&self, node: &str, document: &Document, sink: &dyn DiagnosticSink) -> Vec<Mention> {
        self.for_document(document).extract(node, document, sink)
    }
}

/// Extract mentions from a playbook with the default policy.
pub fn extract_playbook(node: &str, document: &Document, sink: &dyn DiagnosticSink) -> Vec<Mention> {
    PlaybookExtractor::default().extract(node, document, sink)
}

/// Extract mentions from a role task file with the default policy.
pub fn extract_role(node: &str, document: &Document, sink: &dyn DiagnosticSink) -> Vec<Mention> {
    RoleExtractor::default().extract(node, document, sink)
}

fn shape_mismatch(sink: &dyn DiagnosticSink, node: &str, detail: impl Into<String>) {
    sink.report(Diagnostic::new(node, DiagnosticKind::ShapeMismatch, detail));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::layout::NodeCategory;
    use crate::loader::parse;
    use pretty_assertions::assert_eq;

    fn targets(mentions: &[Mention]) -> Vec<&str> {
        mentions.iter().map(|m| m.target.as_str()).collect()
    }

    #[test]
    fn test_playbook_roles_and_tasks() {
        let doc = parse(
            r#"
- hosts: all
  roles:
    - a
    - { role: b, x: 1 }
  tasks:
    - include_role:
        name: c
"#,
            NodeCategory::Playbook,
        )
        .unwrap();
        let sink = CollectingSink::new();
        let mentions = extract_playbook("site.yml", &doc, &sink);

        assert_eq!(targets(&mentions), vec!["a", "b", "c"]);
        assert!(mentions.iter().all(|m| m.source == "site.yml"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_playbook_missing_sections() {
        let doc = parse("- hosts: all\n  tasks:\n", NodeCategory::Playbook).unwrap();
        let sink = CollectingSink::new();
        assert!(extract_playbook("p.yml", &doc, &sink).is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_playbook_only_first_play() {
        let doc = parse(
            "- hosts: a\n  roles: [one]\n- hosts: b\n  roles: [two]\n",
            NodeCategory::Playbook,
        )
        .unwrap();
        let mentions = extract_playbook("p.yml", &doc, &CollectingSink::new());
        assert_eq!(targets(&mentions), vec!["one"]);
    }

    #[test]
    fn test_playbook_ignores_plain_include() {
        let doc = parse(
            "- hosts: all\n  tasks:\n    - include: other.yml\n",
            NodeCategory::Playbook,
        )
        .unwrap();
        assert!(extract_playbook("p.yml", &doc, &CollectingSink::new()).is_empty());
    }

    #[test]
    fn test_playbook_shape_mismatches() {
        let doc = parse(
            r#"
- hosts: all
  roles:
    - { version: 2 }
    - good
  tasks:
    - just a string
    - include_role: not-a-mapping
"#,
            NodeCategory::Playbook,
        )
        .unwrap();
        let sink = CollectingSink::new();
        let mentions = extract_playbook("p.yml", &doc, &sink);

        assert_eq!(targets(&mentions), vec!["good"]);
        assert_eq!(sink.of_kind(DiagnosticKind::ShapeMismatch).len(), 3);
    }

    #[test]
    fn test_role_include_and_block() {
        let doc = parse(
            r#"
- include_role:
    name: x
- block:
    - include: y
"#,
            NodeCategory::Role,
        )
        .unwrap();
        let mentions = extract_role("roles/r/tasks/main.yml", &doc, &CollectingSink::new());
        assert_eq!(targets(&mentions), vec!["x", "y"]);
    }

    #[test]
    fn test_role_block_sections_and_depth() {
        let doc = parse(
            r#"
- name: grouped
  block:
    - include_role: { name: first }
    - block:
        - include_role: { name: too_deep }
  rescue:
    - include: recover.yml
  always:
    - include_role: { name: cleanup }
"#,
            NodeCategory::Role,
        )
        .unwrap();
        let mentions = extract_role("roles/r/tasks/main.yml", &doc, &CollectingSink::new());
        assert_eq!(targets(&mentions), vec!["first", "recover.yml", "cleanup"]);
    }

    #[test]
    fn test_role_block_not_a_list() {
        let doc = parse(
            "- block: oops\n  rescue:\n    - include: recover.yml\n- block:\n",
            NodeCategory::Role,
        )
        .unwrap();
        let sink = CollectingSink::new();
        let mentions = extract_role("roles/r/tasks/main.yml", &doc, &sink);
        assert_eq!(targets(&mentions), vec!["recover.yml"]);

        let mismatches = sink.of_kind(DiagnosticKind::ShapeMismatch);
        assert_eq!(mismatches.len(), 1);
        assert!(mismatches[0].detail.contains("`block` is"));
    }

    #[test]
    fn test_role_unrecognised_entries() {
        let doc = parse(
            "- debug: msg=hi\n- plain string\n- include: [1, 2]\n",
            NodeCategory::Role,
        )
        .unwrap();
        let sink = CollectingSink::new();
        let mentions = extract_role("roles/r/tasks/main.yml", &doc, &sink);
        assert!(mentions.is_empty());
        assert_eq!(sink.of_kind(DiagnosticKind::ShapeMismatch).len(), 1);
    }

    #[test]
    fn test_dispatch_by_shape() {
        let extractors = Extractors::default();
        let role = Document::Role(vec![]);
        let playbook = Document::Playbook(vec![]);
        assert!(extractors.extract("r", &role, &CollectingSink::new()).is_empty());
        assert!(extractors.extract("p", &playbook, &CollectingSink::new()).is_empty());
    }
}
