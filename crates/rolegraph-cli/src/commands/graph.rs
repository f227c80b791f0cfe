//! Graph command - Render the dependency graph as Graphviz DOT

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rolegraph_config::RoleGraphConfig;
use rolegraph_core::{DotRenderer, GraphRenderer};

use super::{print_info, run_build};
use crate::GlobalOptions;

/// Arguments for the graph command
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Output file for the DOT text
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Graph title
    #[arg(short, long)]
    title: Option<String>,

    /// Write DOT to stdout instead of a file
    #[arg(long, conflicts_with = "output")]
    stdout: bool,
}

/// Execute the graph command
pub fn execute(args: GraphArgs, global: &GlobalOptions, config: &RoleGraphConfig) -> Result<()> {
    let output = run_build(global, config)?;

    let title = args.title.unwrap_or_else(|| config.render.title.clone());
    // Node paths are canonical, so labels must be stripped of the canonical root
    let label_root = std::fs::canonicalize(&global.root).unwrap_or_else(|_| global.root.clone());
    let dot = DotRenderer::new(config.render.options.clone())
        .with_label_root(label_root.to_string_lossy())
        .with_known_nodes(&output.nodes)
        .render(&output.edges, &title);

    if args.stdout {
        print!("{}", dot);
        return Ok(());
    }

    let path = args.output.unwrap_or_else(|| config.render.output.clone());
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(&path, dot).with_context(|| format!("Failed to write {}", path.display()))?;

    print_info(
        &format!(
            "Wrote {} edge(s) between {} node(s) to {}",
            output.edges.len(),
            output.nodes.len(),
            path.display()
        ),
        global.quiet,
    );
    Ok(())
}
