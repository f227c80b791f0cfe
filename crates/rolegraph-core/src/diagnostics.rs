//! Diagnostics sink
//!
//! Every skipped document, malformed task and unresolved mention is reported
//! through a [`DiagnosticSink`] handed to each pipeline stage. This is the only
//! side channel besides the final edge set, so callers can audit which nodes
//! were skipped and why.

use std::fmt;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

// ============================================================================
// Diagnostic
// ============================================================================

/// Reason code attached to a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The document could not be read from disk
    ReadFailed,
    /// The document carries an encrypted-value marker
    Encrypted,
    /// The document is empty or null
    Empty,
    /// The document is not valid YAML or not a sequence
    Malformed,
    /// A task or role entry had an unexpected structure
    ShapeMismatch,
    /// No candidate node matched a mention
    Unresolved,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::ReadFailed => "read_failed",
            DiagnosticKind::Encrypted => "encrypted",
            DiagnosticKind::Empty => "empty",
            DiagnosticKind::Malformed => "malformed",
            DiagnosticKind::ShapeMismatch => "shape_mismatch",
            DiagnosticKind::Unresolved => "unresolved",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single recoverable condition observed while processing a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Path of the node the condition was observed on
    pub node: String,
    /// Reason code
    pub kind: DiagnosticKind,
    /// Human-readable detail
    pub detail: String,
}

impl Diagnostic {
    pub fn new(node: impl Into<String>, kind: DiagnosticKind, detail: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.node, self.kind, self.detail)
    }
}

// ============================================================================
// Sinks
// ============================================================================

/// Receives diagnostics from the pipeline.
///
/// Sinks are shared across worker threads during parallel extraction, so
/// implementations must tolerate concurrent `report` calls.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        let Diagnostic { node, kind, detail } = diagnostic;
        match kind {
            DiagnosticKind::Empty => debug!(node = %node, reason = %kind, "{}", detail),
            DiagnosticKind::Unresolved => info!(node = %node, reason = %kind, "{}", detail),
            _ => warn!(node = %node, reason = %kind, "{}", detail),
        }
    }
}

/// Stores every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    /// Diagnostics of one kind, in report order.
    pub fn of_kind(&self, kind: DiagnosticKind) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .iter()
            .filter(|d| d.kind == kind)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.entries.lock().push(diagnostic);
    }
}

/// Reports to two sinks.
pub struct Tee<'a> {
    first: &'a dyn DiagnosticSink,
    second: &'a dyn DiagnosticSink,
}

impl<'a> Tee<'a> {
    pub fn new(first: &'a dyn DiagnosticSink, second: &'a dyn DiagnosticSink) -> Self {
        Self { first, second }
    }
}

impl DiagnosticSink for Tee<'_> {
    fn report(&self, diagnostic: Diagnostic) {
        self.first.report(diagnostic.clone());
        self.second.report(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_filters_by_kind() {
        let sink = CollectingSink::new();
        sink.report(Diagnostic::new("a.yml", DiagnosticKind::Empty, "empty"));
        sink.report(Diagnostic::new("b.yml", DiagnosticKind::Encrypted, "vault"));
        sink.report(Diagnostic::new("c.yml", DiagnosticKind::Empty, "null"));

        assert_eq!(sink.len(), 3);
        let empty = sink.of_kind(DiagnosticKind::Empty);
        assert_eq!(empty.len(), 2);
        assert_eq!(empty[0].node, "a.yml");
        assert_eq!(empty[1].node, "c.yml");
    }

    #[test]
    fn test_tee_reports_to_both() {
        let a = CollectingSink::new();
        let b = CollectingSink::new();
        let tee = Tee::new(&a, &b);
        tee.report(Diagnostic::new("x.yml", DiagnosticKind::Malformed, "bad"));

        assert_eq!(a.diagnostics(), b.diagnostics());
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::new(
            "roles/x/tasks/main.yml",
            DiagnosticKind::ShapeMismatch,
            "task is a string",
        );
        assert_eq!(
            d.to_string(),
            "roles/x/tasks/main.yml [shape_mismatch] task is a string"
        );
    }
}
