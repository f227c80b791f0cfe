//! Edges command - List resolved edges

use anyhow::Result;
use clap::Args;
use rolegraph_config::RoleGraphConfig;

use super::run_build;
use crate::GlobalOptions;

/// Arguments for the edges command
#[derive(Args, Debug)]
pub struct EdgesArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Only show edges whose target did not resolve to a file
    #[arg(long)]
    unresolved: bool,
}

/// Execute the edges command
pub fn execute(args: EdgesArgs, global: &GlobalOptions, config: &RoleGraphConfig) -> Result<()> {
    let output = run_build(global, config)?;
    let unresolved = output.edges.unresolved_targets(&output.nodes);

    let edges: Vec<_> = output
        .edges
        .iter()
        .filter(|e| !args.unresolved || unresolved.contains(e.target.as_str()))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&edges)?);
        return Ok(());
    }

    for edge in edges {
        println!("{} -> {}", edge.source, edge.target);
    }
    Ok(())
}
