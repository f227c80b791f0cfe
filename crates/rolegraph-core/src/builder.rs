//! Graph Builder
//!
//! Composes the pipeline: discover nodes, partition them into playbooks and
//! roles, load and extract mentions from each, resolve mentions into edges
//! and deduplicate.
//!
//! ## Usage
//!
//! ```ignore
//! use rolegraph_core::builder::GraphBuilder;
//! use rolegraph_core::diagnostics::TracingSink;
//! use std::path::Path;
//!
//! let builder = GraphBuilder::with_defaults();
//! let output = builder.build(Path::new("playbooks"), &TracingSink)?;
//! println!("{} edges", output.edges.len());
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::discovery::{DiscoveryConfig, DiscoveryError, NodeDiscovery};
use crate::extract::{ExtractionPolicy, Extractors, Mention};
use crate::graph::{build, EdgeSet};
use crate::layout::{NodeCategory, PathScheme};
use crate::loader::{load, ParseFailure};
use crate::resolver::NameResolver;

// ============================================================================
// Errors
// ============================================================================

/// Errors that abort a build. Everything per-node is a diagnostic instead.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),
}

// ============================================================================
// Builder Configuration
// ============================================================================

/// Configuration for the graph builder.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    pub discovery: DiscoveryConfig,
    pub scheme: PathScheme,
    pub extraction: ExtractionPolicy,
    /// Load and extract nodes on the rayon pool
    pub parallel: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            discovery: DiscoveryConfig::default(),
            scheme: PathScheme::default(),
            extraction: ExtractionPolicy::default(),
            parallel: true,
        }
    }
}

// ============================================================================
// Output
// ============================================================================

/// Counters collected over one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub playbooks: usize,
    pub roles: usize,
    pub mentions: usize,
    pub resolved: usize,
    pub unresolved: usize,
    /// Documents skipped as encrypted, malformed or unreadable
    pub skipped: usize,
    /// Documents that were empty
    pub empty: usize,
}

/// Result of a build.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Discovered nodes in sorted order
    pub nodes: Vec<String>,
    pub edges: EdgeSet,
    pub stats: BuildStats,
}

/// What happened to one node during extraction.
enum NodeOutcome {
    Mentions(Vec<Mention>),
    Empty,
    Skipped,
}

// ============================================================================
// Graph Builder
// ============================================================================

/// Builds the dependency edge set for a directory tree.
pub struct GraphBuilder {
    config: BuilderConfig,
    discovery: NodeDiscovery,
    extractors: Extractors,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl GraphBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self {
            discovery: NodeDiscovery::new(&config.discovery),
            extractors: Extractors::new(config.extraction.clone()),
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(BuilderConfig::default())
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Discover candidate nodes under `root`.
    pub fn discover(&self, root: &Path) -> Result<Vec<String>, DiscoveryError> {
        self.discovery.discover(root)
    }

    /// Run the full pipeline under `root`.
    ///
    /// Only a missing or unreadable root fails; every per-node problem is
    /// reported to `sink` and the node is skipped.
    pub fn build(&self, root: &Path, sink: &dyn DiagnosticSink) -> Result<BuildOutput, BuildError> {
        let start = Instant::now();
        let root = self.discovery.canonical_root(root)?;
        let nodes = self.discover(&root)?;

        let (playbooks, roles): (Vec<&String>, Vec<&String>) = nodes
            .iter()
            .partition(|n| self.config.scheme.category(n) == NodeCategory::Playbook);

        let mut stats = BuildStats {
            playbooks: playbooks.len(),
            roles: roles.len(),
            ..Default::default()
        };
        info!(
            "Processing {} playbook(s) and {} role file(s)",
            stats.playbooks, stats.roles
        );

        let ordered: Vec<&String> = playbooks.into_iter().chain(roles).collect();
        let outcomes = self.extract_all(&ordered, sink);

        let mut mentions = Vec::new();
        for outcome in outcomes {
            match outcome {
                NodeOutcome::Mentions(found) => mentions.extend(found),
                NodeOutcome::Empty => stats.empty += 1,
                NodeOutcome::Skipped => stats.skipped += 1,
            }
        }
        stats.mentions = mentions.len();

        let resolver = NameResolver::new(self.config.scheme.clone(), &nodes).with_root(&root);
        let resolved = resolver.resolve(&mentions, sink);

        let known: HashSet<&str> = nodes.iter().map(String::as_str).collect();
        stats.resolved = resolved
            .iter()
            .filter(|e| known.contains(e.target.as_str()))
            .count();
        stats.unresolved = resolved.len() - stats.resolved;

        let edges = build(resolved);

        info!("Build summary:");
        info!("  - Nodes: {}", nodes.len());
        info!("  - Mentions: {}", stats.mentions);
        info!("  - Resolved: {}", stats.resolved);
        info!("  - Unresolved: {}", stats.unresolved);
        info!("  - Unique edges: {}", edges.len());
        if stats.skipped > 0 {
            info!("  - Skipped documents: {}", stats.skipped);
        }
        debug!("Build took {:.2}s", start.elapsed().as_secs_f64());

        Ok(BuildOutput {
            nodes,
            edges,
            stats,
        })
    }

    /// Extract every node, sequentially or on the rayon pool. Output order
    /// follows `nodes` either way.
    fn extract_all(&self, nodes: &[&String], sink: &dyn DiagnosticSink) -> Vec<NodeOutcome> {
        if self.config.parallel {
            nodes
                .par_iter()
                .map(|n| self.extract_node(n, sink))
                .collect()
        } else {
            nodes.iter().map(|n| self.extract_node(n, sink)).collect()
        }
    }

    /// Load one node and extract its mentions.
    fn extract_node(&self, node: &str, sink: &dyn DiagnosticSink) -> NodeOutcome {
        let category = self.config.scheme.category(node);
        match load(Path::new(node), category) {
            Ok(document) => {
                let mentions = self.extractors.extract(node, &document, sink);
                debug!("{}: {} mention(s)", node, mentions.len());
                NodeOutcome::Mentions(mentions)
            }
            Err(failure) => {
                let kind = failure.kind();
                sink.report(Diagnostic::new(node, kind, failure.to_string()));
                match failure {
                    ParseFailure::Empty => NodeOutcome::Empty,
                    _ => NodeOutcome::Skipped,
                }
            }
        }
    }
}
