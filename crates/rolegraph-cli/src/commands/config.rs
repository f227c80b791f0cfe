//! Config command - View and manage configuration

use anyhow::{Context, Result};
use clap::Subcommand;
use rolegraph_config::{ConfigLoader, RoleGraphConfig};

use super::print_info;
use crate::GlobalOptions;

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a default `.rolegraph/config.toml` under the root
    Init,

    /// Print the effective configuration as TOML
    Show,
}

/// Execute a config subcommand
pub fn execute(
    cmd: ConfigCommand,
    global: &GlobalOptions,
    config: &RoleGraphConfig,
) -> Result<()> {
    match cmd {
        ConfigCommand::Init => {
            let path = ConfigLoader::new()
                .init_local(&global.root)
                .context("Failed to initialize configuration")?;
            print_info(&format!("Configuration at {}", path.display()), global.quiet);
        }
        ConfigCommand::Show => {
            let text = toml::to_string_pretty(config).context("Failed to serialize config")?;
            print!("{}", text);
        }
    }
    Ok(())
}
