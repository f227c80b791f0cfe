//! Edge set and graph view
//!
//! Resolved edges are deduplicated into an [`EdgeSet`] keyed by the
//! `(source, target)` pair. The set can be turned into a petgraph
//! [`DiGraph`] for structural queries such as entry points and cycles.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;

/// A directed dependency from one node to another.
///
/// The target is a discovered path when resolution succeeded, otherwise the
/// raw mention name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Unique set of edges. Iteration order is lexicographic by pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EdgeSet {
    edges: BTreeSet<Edge>,
}

impl EdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an edge; returns false if the pair was already present.
    pub fn insert(&mut self, edge: Edge) -> bool {
        self.edges.insert(edge)
    }

    pub fn contains(&self, source: &str, target: &str) -> bool {
        self.edges.contains(&Edge::new(source, target))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Edges as `(source, target)` string pairs, the shape renderers consume.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
    }

    /// Targets that are not themselves discovered nodes.
    pub fn unresolved_targets<'a>(&'a self, nodes: &'a [String]) -> BTreeSet<&'a str> {
        let known: HashSet<&str> = nodes.iter().map(String::as_str).collect();
        self.edges
            .iter()
            .map(|e| e.target.as_str())
            .filter(|t| !known.contains(t))
            .collect()
    }

    /// Build a petgraph view with one node per distinct endpoint.
    pub fn to_graph(&self) -> DiGraph<String, ()> {
        let mut graph = DiGraph::new();
        let mut index: HashMap<&str, NodeIndex> = HashMap::new();

        for edge in &self.edges {
            let source = *index
                .entry(edge.source.as_str())
                .or_insert_with(|| graph.add_node(edge.source.clone()));
            let target = *index
                .entry(edge.target.as_str())
                .or_insert_with(|| graph.add_node(edge.target.clone()));
            graph.add_edge(source, target, ());
        }
        graph
    }

    /// Structural summary of the edge set.
    pub fn summary(&self, nodes: &[String]) -> GraphSummary {
        let graph = self.to_graph();
        let entry_points = graph
            .node_indices()
            .filter(|i| {
                graph
                    .neighbors_directed(*i, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|i| graph[i].clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        GraphSummary {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            unresolved: self
                .unresolved_targets(nodes)
                .into_iter()
                .map(str::to_string)
                .collect(),
            entry_points,
            has_cycle: is_cyclic_directed(&graph),
        }
    }
}

impl FromIterator<Edge> for EdgeSet {
    fn from_iter<I: IntoIterator<Item = Edge>>(iter: I) -> Self {
        Self {
            edges: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a EdgeSet {
    type Item = &'a Edge;
    type IntoIter = std::collections::btree_set::Iter<'a, Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

/// Deduplicate resolved edges.
pub fn build<I>(edges: I) -> EdgeSet
where
    I: IntoIterator<Item = Edge>,
{
    edges.into_iter().collect()
}

/// Shape of the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub node_count: usize,
    pub edge_count: usize,
    /// Edge targets that did not resolve to a discovered node
    pub unresolved: Vec<String>,
    /// Nodes nothing depends on
    pub entry_points: Vec<String>,
    pub has_cycle: bool,
}
