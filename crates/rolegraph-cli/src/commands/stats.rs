//! Stats command - Show graph statistics

use anyhow::Result;
use clap::Args;
use rolegraph_config::RoleGraphConfig;

use super::run_build;
use crate::GlobalOptions;

/// Arguments for the stats command
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the stats command
pub fn execute(args: StatsArgs, global: &GlobalOptions, config: &RoleGraphConfig) -> Result<()> {
    let output = run_build(global, config)?;
    let summary = output.edges.summary(&output.nodes);
    let stats = &output.stats;

    if args.json {
        let json = serde_json::json!({
            "build": stats,
            "graph": summary,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    println!("Documents:");
    println!("  Playbooks: {}", stats.playbooks);
    println!("  Role files: {}", stats.roles);
    println!("  Empty: {}", stats.empty);
    println!("  Skipped: {}", stats.skipped);
    println!();
    println!("Mentions: {}", stats.mentions);
    println!("  Resolved: {}", stats.resolved);
    println!("  Unresolved: {}", stats.unresolved);
    println!();
    println!("Graph:");
    println!("  Nodes: {}", summary.node_count);
    println!("  Edges: {}", summary.edge_count);
    println!("  Entry points: {}", summary.entry_points.len());
    println!("  Cycle: {}", if summary.has_cycle { "yes" } else { "no" });

    if !summary.unresolved.is_empty() {
        println!();
        println!("Unresolved targets:");
        for target in &summary.unresolved {
            println!("  {}", target);
        }
    }
    Ok(())
}
