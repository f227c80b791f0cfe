//! Configuration loader with inheritance support.
//!
//! Loads configuration from multiple sources and merges them:
//! 1. Global config: `~/.rolegraph/config.toml`
//! 2. Local config: `.rolegraph/config.toml` (under the scanned root)
//! 3. CLI overrides
//!
//! Later sources override earlier ones.

use crate::error::ConfigError;
use crate::{
    AnalysisConfig, ConfigOverrides, LoggingConfig, RenderConfig, RoleGraphConfig,
};
use rolegraph_core::{DiscoveryConfig, ExtractionPolicy, PathScheme, RenderOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Global configuration directory name.
const GLOBAL_CONFIG_DIR: &str = ".rolegraph";

/// Local configuration directory name.
const LOCAL_CONFIG_DIR: &str = ".rolegraph";

/// Configuration loader with caching and inheritance support.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Global config directory (e.g., `~/.rolegraph`)
    global_config_dir: Option<PathBuf>,

    /// Cached global config
    global_config: Option<RoleGraphConfig>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    ///
    /// Automatically detects the global config directory (`~/.rolegraph`).
    pub fn new() -> Self {
        let global_config_dir = dirs::home_dir().map(|h| h.join(GLOBAL_CONFIG_DIR));

        Self {
            global_config_dir,
            global_config: None,
        }
    }

    /// Create a loader with a custom global config directory.
    ///
    /// Useful for testing.
    pub fn with_global_dir(global_dir: impl Into<PathBuf>) -> Self {
        Self {
            global_config_dir: Some(global_dir.into()),
            global_config: None,
        }
    }

    /// Get the global config file path.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.global_config_dir
            .as_ref()
            .map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Get the local config file path for a root.
    pub fn local_config_path(&self, root: &Path) -> PathBuf {
        root.join(LOCAL_CONFIG_DIR).join(CONFIG_FILE_NAME)
    }

    /// Load configuration for a root with optional CLI overrides.
    ///
    /// Merges config in order: global → local → overrides, then validates.
    pub fn load(
        &mut self,
        root: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<RoleGraphConfig, ConfigError> {
        let mut config = RoleGraphConfig::default();

        if let Some(global_config) = self.load_global()? {
            config = merge_configs(config, global_config);
        }

        if let Some(local_config) = self.load_local(root)? {
            config = merge_configs(config, local_config);
        }

        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load only the global configuration.
    pub fn load_global(&mut self) -> Result<Option<RoleGraphConfig>, ConfigError> {
        if let Some(ref config) = self.global_config {
            return Ok(Some(config.clone()));
        }

        let Some(global_path) = self.global_config_path() else {
            debug!("No home directory found, skipping global config");
            return Ok(None);
        };

        if !global_path.exists() {
            trace!("Global config not found at {:?}", global_path);
            return Ok(None);
        }

        debug!("Loading global config from {:?}", global_path);
        let config = load_config_file(&global_path)?;

        self.global_config = Some(config.clone());

        Ok(Some(config))
    }

    /// Load only the local configuration for a root.
    pub fn load_local(&self, root: &Path) -> Result<Option<RoleGraphConfig>, ConfigError> {
        let local_path = self.local_config_path(root);

        if !local_path.exists() {
            trace!("Local config not found at {:?}", local_path);
            return Ok(None);
        }

        debug!("Loading local config from {:?}", local_path);
        load_config_file(&local_path).map(Some)
    }

    /// Load a configuration file at an explicit path.
    pub fn load_file(&self, path: &Path) -> Result<RoleGraphConfig, ConfigError> {
        let config = merge_configs(RoleGraphConfig::default(), load_config_file(path)?);
        config.validate()?;
        Ok(config)
    }

    /// Initialize local configuration for a root.
    ///
    /// Creates `.rolegraph/config.toml` with default configuration. An
    /// existing file is left untouched.
    pub fn init_local(&self, root: &Path) -> Result<PathBuf, ConfigError> {
        let local_dir = root.join(LOCAL_CONFIG_DIR);

        if !local_dir.exists() {
            std::fs::create_dir_all(&local_dir)
                .map_err(|e| ConfigError::create_dir(&local_dir, e))?;
        }

        let config_path = local_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            save_config_file(&config_path, &RoleGraphConfig::default())?;
        }

        Ok(config_path)
    }

    /// Clear cached global configuration.
    ///
    /// Forces reload on next `load_global()` call.
    pub fn clear_cache(&mut self) {
        self.global_config = None;
    }
}

/// Load a configuration file from disk.
fn load_config_file(path: &Path) -> Result<RoleGraphConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

    toml::from_str(&content).map_err(|e| ConfigError::parse_toml(path, e))
}

/// Save a configuration file to disk.
fn save_config_file(path: &Path, config: &RoleGraphConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
}

/// Pick `overlay` when it differs from the default, otherwise keep `base`.
fn pick<T: PartialEq>(base: T, overlay: T, default: T) -> T {
    if overlay != default {
        overlay
    } else {
        base
    }
}

/// Merge two configurations, with `overlay` taking precedence.
///
/// This performs a field-by-field merge, allowing partial configs.
fn merge_configs(base: RoleGraphConfig, overlay: RoleGraphConfig) -> RoleGraphConfig {
    RoleGraphConfig {
        discovery: merge_discovery(base.discovery, overlay.discovery),
        layout: merge_layout(base.layout, overlay.layout),
        extraction: merge_extraction(base.extraction, overlay.extraction),
        render: merge_render(base.render, overlay.render),
        analysis: merge_analysis(base.analysis, overlay.analysis),
        logging: merge_logging(base.logging, overlay.logging),
    }
}

/// Merge discovery config; exclude patterns accumulate.
fn merge_discovery(base: DiscoveryConfig, overlay: DiscoveryConfig) -> DiscoveryConfig {
    let default = DiscoveryConfig::default();
    let mut exclude_patterns = base.exclude_patterns;
    for pattern in overlay.exclude_patterns {
        if !exclude_patterns.contains(&pattern) {
            exclude_patterns.push(pattern);
        }
    }

    DiscoveryConfig {
        extensions: pick(base.extensions, overlay.extensions, default.extensions),
        exclude_segments: pick(
            base.exclude_segments,
            overlay.exclude_segments,
            default.exclude_segments,
        ),
        exclude_patterns,
    }
}

/// Merge layout config.
fn merge_layout(base: PathScheme, overlay: PathScheme) -> PathScheme {
    let default = PathScheme::default();
    PathScheme {
        roles_segment: pick(base.roles_segment, overlay.roles_segment, default.roles_segment),
        platform_marker: pick(
            base.platform_marker,
            overlay.platform_marker,
            default.platform_marker,
        ),
        main_file: pick(base.main_file, overlay.main_file, default.main_file),
    }
}

/// Merge extraction config.
fn merge_extraction(base: ExtractionPolicy, overlay: ExtractionPolicy) -> ExtractionPolicy {
    let default = ExtractionPolicy::default();
    ExtractionPolicy {
        playbook_include_keys: pick(
            base.playbook_include_keys,
            overlay.playbook_include_keys,
            default.playbook_include_keys,
        ),
        role_include_keys: pick(
            base.role_include_keys,
            overlay.role_include_keys,
            default.role_include_keys,
        ),
        block_keys: pick(base.block_keys, overlay.block_keys, default.block_keys),
    }
}

/// Merge render config.
fn merge_render(base: RenderConfig, overlay: RenderConfig) -> RenderConfig {
    let default = RenderConfig::default();
    let default_options = RenderOptions::default();
    RenderConfig {
        title: pick(base.title, overlay.title, default.title),
        output: pick(base.output, overlay.output, default.output),
        options: RenderOptions {
            size: pick(base.options.size, overlay.options.size, default_options.size),
            layout: pick(
                base.options.layout,
                overlay.options.layout,
                default_options.layout,
            ),
            rankdir: pick(
                base.options.rankdir,
                overlay.options.rankdir,
                default_options.rankdir,
            ),
        },
    }
}

/// Merge analysis config.
fn merge_analysis(base: AnalysisConfig, overlay: AnalysisConfig) -> AnalysisConfig {
    AnalysisConfig {
        parallel: pick(base.parallel, overlay.parallel, AnalysisConfig::default().parallel),
    }
}

/// Merge logging config.
fn merge_logging(base: LoggingConfig, overlay: LoggingConfig) -> LoggingConfig {
    LoggingConfig {
        level: pick(base.level, overlay.level, LoggingConfig::default().level),
    }
}
