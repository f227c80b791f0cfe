//! RoleGraph Configuration Management
//!
//! Provides configuration loading with support for:
//! - Global config: `~/.rolegraph/config.toml`
//! - Local config: `.rolegraph/config.toml` (under the scanned root)
//! - CLI overrides via `ConfigOverrides`
//!
//! Configuration is merged in order: global → local → CLI overrides.

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::ConfigLoader;

use rolegraph_core::{
    BuilderConfig, DiscoveryConfig, ExtractionPolicy, PathScheme, RenderOptions,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Log levels accepted by `[logging] level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Root configuration for RoleGraph.
///
/// Represents the fully merged configuration from all sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RoleGraphConfig {
    /// Which files become nodes
    pub discovery: DiscoveryConfig,

    /// Reserved path segments
    pub layout: PathScheme,

    /// Which task keys count as inclusions
    pub extraction: ExtractionPolicy,

    /// DOT output settings
    pub render: RenderConfig,

    /// Pipeline execution settings
    pub analysis: AnalysisConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// DOT output settings.
///
/// # Example TOML
///
/// ```toml
/// [render]
/// title = "Site roles"
/// output = "out/roles.gv"
/// size = "18,50"
/// rankdir = "LR"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Graph title
    pub title: String,

    /// Output file for the DOT text
    pub output: PathBuf,

    /// Graph-level attributes
    #[serde(flatten)]
    pub options: RenderOptions,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: "Role dependencies".to_string(),
            output: PathBuf::from("rolegraph.gv"),
            options: RenderOptions::default(),
        }
    }
}

/// Pipeline execution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Load and extract documents in parallel
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// CLI overrides for configuration values.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override graph title
    pub title: Option<String>,

    /// Override DOT output file
    pub output: Option<PathBuf>,

    /// Override parallel extraction
    pub parallel: Option<bool>,

    /// Override log level
    pub log_level: Option<String>,
}

impl RoleGraphConfig {
    /// Apply CLI overrides to this configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref title) = overrides.title {
            self.render.title = title.clone();
        }

        if let Some(ref output) = overrides.output {
            self.render.output = output.clone();
        }

        if let Some(parallel) = overrides.parallel {
            self.analysis.parallel = parallel;
        }

        if let Some(ref level) = overrides.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.discovery.extensions.is_empty() {
            return Err(ConfigError::invalid_value(
                "discovery.extensions",
                "at least one extension is required",
            ));
        }

        for (key, value) in [
            ("layout.roles_segment", &self.layout.roles_segment),
            ("layout.platform_marker", &self.layout.platform_marker),
            ("layout.main_file", &self.layout.main_file),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::invalid_value(key, "must not be empty"));
            }
            if value.contains(['/', '\\']) {
                return Err(ConfigError::invalid_value(
                    key,
                    format!("'{}' must be a single path segment", value),
                ));
            }
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!(
                    "unknown level '{}'. Valid values: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Pipeline configuration for the core builder.
    pub fn builder_config(&self) -> BuilderConfig {
        BuilderConfig {
            discovery: self.discovery.clone(),
            scheme: self.layout.clone(),
            extraction: self.extraction.clone(),
            parallel: self.analysis.parallel,
        }
    }
}
