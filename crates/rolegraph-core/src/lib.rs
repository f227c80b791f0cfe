//! RoleGraph Core - Dependency graphs for playbook/role task trees
//!
//! This crate provides the resolution pipeline:
//! - Node discovery with reserved-segment exclusion
//! - Document loading with recoverable parse failures
//! - Mention extraction for playbook and role task documents
//! - Platform-scoped name resolution of role mentions
//! - Edge set deduplication and DOT rendering

pub mod builder;
pub mod diagnostics;
pub mod discovery;
pub mod extract;
pub mod graph;
pub mod layout;
pub mod loader;
pub mod render;
pub mod resolver;

// Pipeline re-exports
pub use builder::{BuildError, BuildOutput, BuildStats, BuilderConfig, GraphBuilder};
pub use diagnostics::{
    CollectingSink, Diagnostic, DiagnosticKind, DiagnosticSink, Tee, TracingSink,
};
pub use discovery::{discover, DiscoveryConfig, DiscoveryError, NodeDiscovery};
pub use extract::{
    extract_playbook, extract_role, ExtractionPolicy, Extractors, Mention, MentionExtractor,
    PlaybookExtractor, RoleExtractor,
};
pub use graph::{build, Edge, EdgeSet, GraphSummary};
pub use layout::{Node, NodeCategory, PathScheme};
pub use loader::{load, parse, Document, ParseFailure};
pub use render::{DotRenderer, GraphRenderer, RenderOptions};
pub use resolver::{resolve, NameResolver, Resolution};
