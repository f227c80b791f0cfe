//! Name resolution
//!
//! Rewrites each mention's symbolic target into the concrete role file it
//! refers to. Resolution is a pure transform from `(mentions, nodes)` to a new
//! edge list; nothing is rewritten in place.
//!
//! Rules, first match wins:
//! 1. a candidate containing the name and ending in the main file
//! 2. a candidate containing the name
//! 3. otherwise the edge keeps the raw name
//!
//! Candidates are role nodes sorted lexicographically, restricted to the
//! source's platform when the path scheme carries one. Ties within a rule go
//! to the lexicographically smallest path. Names are matched against the part
//! of each candidate below the scan root, so directories above the root never
//! take part in a match.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::extract::Mention;
use crate::graph::Edge;
use crate::layout::{NodeCategory, PathScheme};

/// Outcome of resolving one mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Matched the role's main task file
    MainFile(String),
    /// Matched some other task file
    AnyFile(String),
    /// No candidate contained the name
    Unresolved,
}

impl Resolution {
    pub fn path(&self) -> Option<&str> {
        match self {
            Resolution::MainFile(p) | Resolution::AnyFile(p) => Some(p),
            Resolution::Unresolved => None,
        }
    }
}

/// Resolves mentions against a fixed, ordered candidate set.
pub struct NameResolver {
    scheme: PathScheme,
    candidates: Vec<String>,
    /// Text each candidate is matched against, index-aligned with `candidates`
    match_keys: Vec<String>,
}

impl NameResolver {
    /// Build a resolver over `nodes`. Only role nodes become candidates.
    pub fn new(scheme: PathScheme, nodes: &[String]) -> Self {
        let mut candidates: Vec<String> = nodes
            .iter()
            .filter(|n| scheme.category(n) == NodeCategory::Role)
            .cloned()
            .collect();
        candidates.sort();
        candidates.dedup();

        debug!("Resolver has {} role candidate(s)", candidates.len());
        Self {
            scheme,
            match_keys: candidates.clone(),
            candidates,
        }
    }

    /// Match names only against the part of each candidate below `root`.
    ///
    /// Without a root the whole candidate path is matched.
    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        self.match_keys = self
            .candidates
            .iter()
            .map(|c| match Path::new(c).strip_prefix(root) {
                Ok(rest) => rest.to_string_lossy().into_owned(),
                Err(_) => c.clone(),
            })
            .collect();
        self
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Apply the resolution rules to a single mention.
    pub fn resolve_one(&self, mention: &Mention) -> Resolution {
        let platform = self.scheme.platform(&mention.source);
        let target = mention.target.as_str();
        let matching: Vec<&String> = self
            .candidates
            .iter()
            .zip(&self.match_keys)
            .filter(|(c, _)| platform.is_none_or(|p| self.scheme.has_segment(c, p)))
            .filter(|(_, key)| key.contains(target))
            .map(|(c, _)| c)
            .collect();

        if let Some(path) = matching.iter().find(|c| self.scheme.is_main_file(c)) {
            return Resolution::MainFile(path.to_string());
        }
        match matching.first() {
            Some(path) => Resolution::AnyFile(path.to_string()),
            None => Resolution::Unresolved,
        }
    }

    /// Resolve every mention into an edge, preserving input order.
    ///
    /// Unresolved mentions become edges whose target is the raw name and are
    /// reported to `sink`.
    pub fn resolve(&self, mentions: &[Mention], sink: &dyn DiagnosticSink) -> Vec<Edge> {
        mentions
            .par_iter()
            .map(|mention| match self.resolve_one(mention) {
                Resolution::MainFile(path) | Resolution::AnyFile(path) => {
                    Edge::new(&mention.source, path)
                }
                Resolution::Unresolved => {
                    sink.report(Diagnostic::new(
                        &mention.source,
                        DiagnosticKind::Unresolved,
                        format!("no role file matches {:?}", mention.target),
                    ));
                    Edge::new(&mention.source, &mention.target)
                }
            })
            .collect()
    }
}

/// Resolve mentions against `nodes` with the default path scheme.
///
/// The scan root is taken to be the deepest directory holding every node and
/// every mention source.
pub fn resolve(mentions: &[Mention], nodes: &[String], sink: &dyn DiagnosticSink) -> Vec<Edge> {
    let paths = nodes
        .iter()
        .chain(mentions.iter().map(|m| &m.source))
        .map(String::as_str);
    let mut resolver = NameResolver::new(PathScheme::default(), nodes);
    if let Some(root) = common_dir(paths) {
        resolver = resolver.with_root(root);
    }
    resolver.resolve(mentions, sink)
}

fn common_dir<'a>(paths: impl IntoIterator<Item = &'a str>) -> Option<PathBuf> {
    let mut common: Option<PathBuf> = None;
    for path in paths {
        let dir = Path::new(path).parent().unwrap_or(Path::new(""));
        common = Some(match common {
            None => dir.to_path_buf(),
            Some(prev) => prev
                .components()
                .zip(dir.components())
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| a)
                .collect(),
        });
    }
    common
}
