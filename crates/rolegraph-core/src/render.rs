//! Graphviz DOT rendering
//!
//! The core hands a finished [`EdgeSet`] and a title to a [`GraphRenderer`].
//! [`DotRenderer`] produces DOT text; laying out and displaying it is left to
//! Graphviz.
//!
//! ```bash
//! rolegraph graph --root playbooks --stdout | dot -Tpng -o roles.png
//! ```

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::graph::EdgeSet;

/// Consumes an edge set and produces a visual artifact.
pub trait GraphRenderer {
    fn render(&self, edges: &EdgeSet, title: &str) -> String;
}

/// Graph-level DOT attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Drawing size in inches, `width,height`
    pub size: String,
    /// Graphviz layout engine
    pub layout: String,
    /// Rank direction (`LR`, `TB`, ...)
    pub rankdir: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            size: "18,50".to_string(),
            layout: "dot".to_string(),
            rankdir: "LR".to_string(),
        }
    }
}

/// Renders edge sets as Graphviz DOT digraphs.
///
/// Node identifiers are the full paths. Labels drop `label_root` when set.
/// Targets outside the known node set are drawn dashed.
#[derive(Debug, Clone, Default)]
pub struct DotRenderer {
    options: RenderOptions,
    label_root: Option<String>,
    known_nodes: Option<HashSet<String>>,
}

impl DotRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            label_root: None,
            known_nodes: None,
        }
    }

    /// Shorten labels by stripping this prefix.
    pub fn with_label_root(mut self, root: impl Into<String>) -> Self {
        self.label_root = Some(root.into());
        self
    }

    /// Nodes that resolution could target; anything else is unresolved.
    pub fn with_known_nodes(mut self, nodes: &[String]) -> Self {
        self.known_nodes = Some(nodes.iter().cloned().collect());
        self
    }

    fn label<'a>(&self, id: &'a str) -> &'a str {
        match &self.label_root {
            Some(root) => id
                .strip_prefix(root.as_str())
                .map(|rest| rest.trim_start_matches(['/', '\\']))
                .filter(|rest| !rest.is_empty())
                .unwrap_or(id),
            None => id,
        }
    }

    fn is_unresolved(&self, id: &str) -> bool {
        self.known_nodes
            .as_ref()
            .is_some_and(|known| !known.contains(id))
    }
}

impl GraphRenderer for DotRenderer {
    fn render(&self, edges: &EdgeSet, title: &str) -> String {
        let mut dot = String::new();
        dot.push_str(&format!("// {}\n", escape_comment(title)));
        dot.push_str("digraph {\n");
        dot.push_str(&format!("  size=\"{}\";\n", escape_dot(&self.options.size)));
        dot.push_str(&format!("  layout=\"{}\";\n", escape_dot(&self.options.layout)));
        dot.push_str(&format!("  rankdir=\"{}\";\n", escape_dot(&self.options.rankdir)));
        dot.push_str("  labelloc=\"t\";\n");
        dot.push_str(&format!("  label=\"{}\";\n", escape_dot(title)));
        dot.push_str("  node [shape=box, style=rounded, fontname=\"Helvetica\"];\n\n");

        let ids: BTreeSet<&str> = edges.pairs().flat_map(|(s, t)| [s, t]).collect();
        for id in ids {
            let style = if self.is_unresolved(id) {
                ", style=\"rounded,dashed\", color=\"#cc0000\""
            } else {
                ""
            };
            dot.push_str(&format!(
                "  \"{}\" [label=\"{}\"{}];\n",
                escape_dot(id),
                escape_dot(self.label(id)),
                style
            ));
        }

        if !edges.is_empty() {
            dot.push('\n');
        }
        for (source, target) in edges.pairs() {
            dot.push_str(&format!(
                "  \"{}\" -> \"{}\";\n",
                escape_dot(source),
                escape_dot(target)
            ));
        }

        dot.push_str("}\n");
        dot
    }
}

/// Escape a string for use inside a quoted DOT identifier.
pub fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn escape_comment(s: &str) -> String {
    s.replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build, Edge};

    fn edges() -> EdgeSet {
        build(vec![
            Edge::new("/p/site.yml", "/p/roles/a/tasks/main.yml"),
            Edge::new("/p/site.yml", "ghost"),
        ])
    }

    #[test]
    fn test_escape_dot_quotes() {
        assert_eq!(escape_dot(r#"say "hello""#), r#"say \"hello\""#);
        assert_eq!(escape_dot("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_render_graph_attributes() {
        let dot = DotRenderer::default().render(&edges(), "The Round Table");
        assert!(dot.starts_with("// The Round Table\ndigraph {"));
        assert!(dot.contains("size=\"18,50\";"));
        assert!(dot.contains("layout=\"dot\";"));
        assert!(dot.contains("rankdir=\"LR\";"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_configured_attributes_are_quoted() {
        let options = RenderOptions {
            layout: "dot\"; evil=\"1".to_string(),
            rankdir: "TB ]".to_string(),
            ..Default::default()
        };
        let dot = DotRenderer::new(options).render(&edges(), "t");
        assert!(dot.contains("  layout=\"dot\\\"; evil=\\\"1\";\n"));
        assert!(dot.contains("  rankdir=\"TB ]\";\n"));
    }

    #[test]
    fn test_render_edges() {
        let dot = DotRenderer::default().render(&edges(), "t");
        assert!(dot.contains("\"/p/site.yml\" -> \"/p/roles/a/tasks/main.yml\";"));
        assert!(dot.contains("\"/p/site.yml\" -> \"ghost\";"));
        assert_eq!(dot.matches("->").count(), 2);
    }

    #[test]
    fn test_render_labels_and_unresolved() {
        let nodes = vec![
            "/p/site.yml".to_string(),
            "/p/roles/a/tasks/main.yml".to_string(),
        ];
        let dot = DotRenderer::default()
            .with_label_root("/p")
            .with_known_nodes(&nodes)
            .render(&edges(), "t");

        assert!(dot.contains("\"/p/site.yml\" [label=\"site.yml\"];"));
        assert!(dot.contains("\"ghost\" [label=\"ghost\", style=\"rounded,dashed\""));
    }

    #[test]
    fn test_render_empty() {
        let dot = DotRenderer::default().render(&EdgeSet::new(), "empty");
        assert!(!dot.contains("->"));
    }
}
