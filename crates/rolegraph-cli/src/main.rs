//! RoleGraph CLI - Dependency graphs for playbook and role task trees
//!
//! Scans a directory of playbooks and roles, resolves which file includes
//! which role, and renders the result as a Graphviz DOT graph.
//!
//! # Usage
//!
//! ```bash
//! # Write rolegraph.gv for the current tree
//! rolegraph graph
//!
//! # Pipe DOT straight into Graphviz
//! rolegraph --root playbooks graph --stdout | dot -Tpng -o roles.png
//!
//! # Inspect what was found
//! rolegraph --root playbooks edges --json
//! rolegraph --root playbooks stats
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

/// RoleGraph - Playbook and role dependency graphs
#[derive(Parser, Debug)]
#[command(name = "rolegraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Args, Debug, Clone)]
struct GlobalOptions {
    /// Root directory to scan
    #[arg(long, short = 'r', global = true, env = "ROLEGRAPH_ROOT", default_value = ".")]
    root: PathBuf,

    /// Path to configuration file
    #[arg(long, short = 'c', global = true, env = "ROLEGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Process documents on a single thread
    #[arg(long, global = true)]
    sequential: bool,

    /// Print every skipped node and unresolved mention after the run
    #[arg(long, global = true)]
    report: bool,
}

impl GlobalOptions {
    /// Convert global options to config overrides
    fn to_config_overrides(&self) -> rolegraph_config::ConfigOverrides {
        rolegraph_config::ConfigOverrides {
            parallel: self.sequential.then_some(false),
            log_level: if self.verbose {
                Some("debug".to_string())
            } else if self.quiet {
                Some("error".to_string())
            } else {
                None
            },
            ..Default::default()
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the graph and write it as Graphviz DOT
    Graph(commands::graph::GraphArgs),

    /// List resolved edges
    Edges(commands::edges::EdgesArgs),

    /// List discovered nodes with category and platform
    Nodes(commands::nodes::NodesArgs),

    /// Show statistics about the graph
    Stats(commands::stats::StatsArgs),

    /// View and manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = commands::load_config(&cli.global)?;

    let log_level = match config.logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Graph(args) => commands::graph::execute(args, &cli.global, &config),
        Commands::Edges(args) => commands::edges::execute(args, &cli.global, &config),
        Commands::Nodes(args) => commands::nodes::execute(args, &cli.global, &config),
        Commands::Stats(args) => commands::stats::execute(args, &cli.global, &config),
        Commands::Config(cmd) => commands::config::execute(cmd, &cli.global, &config),
    }
}
