//! Document loading
//!
//! Reads a task-definition file and parses it into a [`Document`]. The shape
//! is decided once per node from its category: playbooks and role task files
//! are both top-level sequences but their entries mean different things.

use std::path::Path;

use serde_yaml::Value;
use thiserror::Error;

use crate::diagnostics::DiagnosticKind;
use crate::layout::NodeCategory;

/// Header of a whole-file encrypted document.
const VAULT_HEADER: &str = "$ANSIBLE_VAULT";

/// Tag carried by an inline encrypted scalar.
const VAULT_TAG: &str = "vault";

/// Per-node parse failures. None of these abort a run.
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("document contains an encrypted value")]
    Encrypted,

    #[error("document is empty")]
    Empty,

    #[error("malformed document: {0}")]
    Malformed(String),
}

impl ParseFailure {
    /// Diagnostic reason code for this failure.
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            ParseFailure::Io(_) => DiagnosticKind::ReadFailed,
            ParseFailure::Encrypted => DiagnosticKind::Encrypted,
            ParseFailure::Empty => DiagnosticKind::Empty,
            ParseFailure::Malformed(_) => DiagnosticKind::Malformed,
        }
    }
}

/// A parsed task-definition document.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    /// Sequence of plays; only the first one is inspected
    Playbook(Vec<Value>),
    /// Sequence of task entries, possibly grouped into blocks
    Role(Vec<Value>),
}

impl Document {
    pub fn category(&self) -> NodeCategory {
        match self {
            Document::Playbook(_) => NodeCategory::Playbook,
            Document::Role(_) => NodeCategory::Role,
        }
    }

    pub fn entries(&self) -> &[Value] {
        match self {
            Document::Playbook(entries) | Document::Role(entries) => entries,
        }
    }
}

/// Read and parse the document at `path`.
pub fn load(path: &Path, category: NodeCategory) -> Result<Document, ParseFailure> {
    let content = std::fs::read_to_string(path)?;
    parse(&content, category)
}

/// Parse document text.
pub fn parse(content: &str, category: NodeCategory) -> Result<Document, ParseFailure> {
    if content.trim_start().starts_with(VAULT_HEADER) {
        return Err(ParseFailure::Encrypted);
    }
    if is_blank(content) {
        return Err(ParseFailure::Empty);
    }

    let value: Value =
        serde_yaml::from_str(content).map_err(|e| ParseFailure::Malformed(e.to_string()))?;

    if contains_vault_tag(&value) {
        return Err(ParseFailure::Encrypted);
    }

    let entries = match value {
        Value::Null => return Err(ParseFailure::Empty),
        Value::Sequence(entries) if entries.is_empty() => return Err(ParseFailure::Empty),
        Value::Sequence(entries) => entries,
        other => {
            return Err(ParseFailure::Malformed(format!(
                "expected a sequence at top level, found {}",
                value_kind(&other)
            )))
        }
    };

    Ok(match category {
        NodeCategory::Playbook => Document::Playbook(entries),
        NodeCategory::Role => Document::Role(entries),
    })
}

/// Only comments, document markers and whitespace.
fn is_blank(content: &str) -> bool {
    content.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

fn contains_vault_tag(value: &Value) -> bool {
    match value {
        Value::Tagged(tagged) => {
            tagged.tag.to_string().trim_start_matches('!') == VAULT_TAG
                || contains_vault_tag(&tagged.value)
        }
        Value::Sequence(items) => items.iter().any(contains_vault_tag),
        Value::Mapping(map) => map.values().any(contains_vault_tag),
        _ => false,
    }
}

/// Short name of a YAML value's type, for diagnostics.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
