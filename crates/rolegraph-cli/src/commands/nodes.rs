//! Nodes command - List discovered nodes

use anyhow::{Context, Result};
use clap::Args;
use rolegraph_config::RoleGraphConfig;
use rolegraph_core::{Node, NodeCategory, NodeDiscovery};

use crate::GlobalOptions;

/// Arguments for the nodes command
#[derive(Args, Debug)]
pub struct NodesArgs {
    /// Only list nodes of this category
    #[arg(long, value_parser = parse_category)]
    category: Option<NodeCategory>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

fn parse_category(s: &str) -> Result<NodeCategory, String> {
    match s.to_lowercase().as_str() {
        "playbook" | "playbooks" => Ok(NodeCategory::Playbook),
        "role" | "roles" => Ok(NodeCategory::Role),
        _ => Err(format!(
            "Unknown category: '{}'. Valid values: playbook, role",
            s
        )),
    }
}

/// Execute the nodes command
pub fn execute(args: NodesArgs, global: &GlobalOptions, config: &RoleGraphConfig) -> Result<()> {
    let paths = NodeDiscovery::new(&config.discovery)
        .discover(&global.root)
        .with_context(|| format!("Failed to discover nodes under {}", global.root.display()))?;

    let nodes: Vec<Node> = paths
        .iter()
        .map(|p| config.layout.describe(p))
        .filter(|n| args.category.is_none_or(|c| n.category == c))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
        return Ok(());
    }

    for node in &nodes {
        println!(
            "{:<8} {:<12} {}",
            node.category.as_str(),
            node.platform.as_deref().unwrap_or("-"),
            node.path
        );
    }
    Ok(())
}
