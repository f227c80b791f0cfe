//! CLI command implementations

pub mod config;
pub mod edges;
pub mod graph;
pub mod nodes;
pub mod stats;

use anyhow::{Context, Result};
use rolegraph_config::{ConfigLoader, RoleGraphConfig};
use rolegraph_core::{BuildOutput, CollectingSink, GraphBuilder, Tee, TracingSink};

use crate::GlobalOptions;

/// Load configuration: an explicit file, or global → local merge, then CLI overrides.
pub fn load_config(global: &GlobalOptions) -> Result<RoleGraphConfig> {
    let mut loader = ConfigLoader::new();
    let overrides = global.to_config_overrides();

    let mut config = match global.config {
        Some(ref path) => loader
            .load_file(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => loader
            .load(&global.root, None)
            .context("Failed to load configuration")?,
    };

    config.apply_overrides(&overrides);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Run the pipeline under the global root.
///
/// Diagnostics go to the log and, with `--report`, are printed afterwards.
pub fn run_build(global: &GlobalOptions, config: &RoleGraphConfig) -> Result<BuildOutput> {
    let builder = GraphBuilder::new(config.builder_config());
    let collected = CollectingSink::new();
    let sink = Tee::new(&TracingSink, &collected);

    let output = builder
        .build(&global.root, &sink)
        .with_context(|| format!("Failed to build graph for {}", global.root.display()))?;

    if global.report {
        print_report(&collected);
    }

    Ok(output)
}

/// Print collected diagnostics to stderr.
fn print_report(sink: &CollectingSink) {
    let diagnostics = sink.diagnostics();
    if diagnostics.is_empty() {
        eprintln!("No diagnostics.");
        return;
    }
    eprintln!("Diagnostics ({}):", diagnostics.len());
    for diagnostic in diagnostics {
        eprintln!("  {}", diagnostic);
    }
}

/// Print an info message (respects quiet flag).
pub fn print_info(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", message);
    }
}
