//! Node Discovery Module
//!
//! Walks a root directory and returns every task-definition file (YAML) that
//! can act as a dependency source or target. Role sub-content such as
//! templates, variables and handlers is excluded by path segment.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Errors during node discovery. Both are fatal for a run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Root path does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("Root path is not readable: {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Segments that mark role sub-content which is never a dependency node.
pub const DEFAULT_EXCLUDE_SEGMENTS: &[&str] =
    &["templates", "vars", "defaults", "handlers", "meta", "shared"];

/// Configuration for node discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// File extensions accepted as task definitions (without the dot)
    pub extensions: Vec<String>,
    /// Path segments that exclude a file when present anywhere below the root
    pub exclude_segments: Vec<String>,
    /// Additional glob patterns matched against the path relative to the root
    pub exclude_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["yml".to_string(), "yaml".to_string()],
            exclude_segments: DEFAULT_EXCLUDE_SEGMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// Node discovery service
pub struct NodeDiscovery {
    extensions: HashSet<String>,
    exclude_segments: HashSet<String>,
    exclude_patterns: Vec<glob::Pattern>,
}

impl Default for NodeDiscovery {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl NodeDiscovery {
    /// Create a discovery service from configuration.
    ///
    /// Invalid glob patterns are logged and ignored.
    pub fn new(config: &DiscoveryConfig) -> Self {
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Ignoring invalid exclude pattern {:?}: {}", p, e);
                    None
                }
            })
            .collect();

        Self {
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            exclude_segments: config.exclude_segments.iter().cloned().collect(),
            exclude_patterns,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(&DiscoveryConfig::default())
    }

    /// Absolute, symlink-free form of `root`.
    ///
    /// Platform and name matching read path segments, so `.` and
    /// `../playbooks` must produce the same node paths as the absolute root.
    pub fn canonical_root(&self, root: &Path) -> Result<PathBuf> {
        if !root.exists() {
            return Err(DiscoveryError::RootNotFound(root.to_path_buf()));
        }
        std::fs::canonicalize(root).map_err(|source| DiscoveryError::Unreadable {
            path: root.to_path_buf(),
            source,
        })
    }

    /// Discover all candidate nodes under `root`.
    ///
    /// Paths are absolute (see [`canonical_root`](Self::canonical_root)) and
    /// sorted lexicographically so that every later first-match decision is
    /// reproducible across filesystems. Exclusion segments are checked on the
    /// part of the path below `root`.
    pub fn discover(&self, root: &Path) -> Result<Vec<String>> {
        let root = self.canonical_root(root)?;
        let root = root.as_path();
        std::fs::read_dir(root).map_err(|source| DiscoveryError::Unreadable {
            path: root.to_path_buf(),
            source,
        })?;

        info!("Discovering nodes under {:?}", root);

        let mut nodes = Vec::new();
        let walker = WalkDir::new(root).into_iter().filter_entry(|e| {
            // Prune excluded directories early; the root itself is always walked
            e.depth() == 0
                || !e.file_type().is_dir()
                || !self
                    .exclude_segments
                    .contains(e.file_name().to_string_lossy().as_ref())
        });

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Error walking directory: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !self.has_accepted_extension(path) {
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(path);
            if self.is_excluded(relative) {
                debug!("Excluding {:?}", path);
                continue;
            }

            nodes.push(path.to_string_lossy().into_owned());
        }

        nodes.sort();
        info!("Discovered {} node(s)", nodes.len());
        Ok(nodes)
    }

    fn has_accepted_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| {
                self.extensions
                    .contains(&ext.to_string_lossy().to_ascii_lowercase())
            })
            .unwrap_or(false)
    }

    fn is_excluded(&self, relative: &Path) -> bool {
        let in_excluded_segment = relative.components().any(|c| match c {
            Component::Normal(name) => self
                .exclude_segments
                .contains(name.to_string_lossy().as_ref()),
            _ => false,
        });

        in_excluded_segment
            || self
                .exclude_patterns
                .iter()
                .any(|p| p.matches_path(relative))
    }
}

/// Discover nodes under `root` with the default configuration.
pub fn discover(root: &Path) -> Result<Vec<String>> {
    NodeDiscovery::with_defaults().discover(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "---\n").unwrap();
    }

    fn relative(root: &Path, nodes: &[String]) -> Vec<String> {
        let root = std::fs::canonicalize(root).unwrap();
        nodes
            .iter()
            .map(|n| {
                Path::new(n)
                    .strip_prefix(&root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_discovery_config_defaults() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.extensions, vec!["yml", "yaml"]);
        assert_eq!(config.exclude_segments.len(), 6);
        assert!(config.exclude_patterns.is_empty());
    }

    #[test]
    fn test_discover_only_yaml() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "site.yml");
        touch(temp.path(), "other.yaml");
        touch(temp.path(), "README.md");
        touch(temp.path(), "inventory.ini");

        let nodes = discover(temp.path()).unwrap();
        assert_eq!(relative(temp.path(), &nodes), vec!["other.yaml", "site.yml"]);
        assert!(nodes
            .iter()
            .all(|n| n.ends_with(".yml") || n.ends_with(".yaml")));
    }

    #[test]
    fn test_discover_excludes_reserved_segments() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "roles/web/tasks/main.yml");
        for segment in DEFAULT_EXCLUDE_SEGMENTS {
            touch(temp.path(), &format!("roles/web/{}/main.yml", segment));
        }
        touch(temp.path(), "shared/common.yml");

        let nodes = discover(temp.path()).unwrap();
        let rel = relative(temp.path(), &nodes);
        assert_eq!(rel, vec!["roles/web/tasks/main.yml"]);
        for node in &rel {
            for segment in node.split('/') {
                assert!(!DEFAULT_EXCLUDE_SEGMENTS.contains(&segment));
            }
        }
    }

    #[test]
    fn test_discover_sorted() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "b.yml");
        touch(temp.path(), "a/z.yml");
        touch(temp.path(), "a.yml");

        let nodes = discover(temp.path()).unwrap();
        let mut sorted = nodes.clone();
        sorted.sort();
        assert_eq!(nodes, sorted);
    }

    #[test]
    fn test_discover_custom_patterns() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "site.yml");
        touch(temp.path(), "group_vars/all.yml");

        let config = DiscoveryConfig {
            exclude_patterns: vec!["group_vars/*".to_string(), "[".to_string()],
            ..Default::default()
        };
        let nodes = NodeDiscovery::new(&config).discover(temp.path()).unwrap();
        assert_eq!(relative(temp.path(), &nodes), vec!["site.yml"]);
    }

    #[test]
    fn test_discover_empty_root() {
        let temp = TempDir::new().unwrap();
        let nodes = discover(temp.path()).unwrap();
        assert!(nodes.is_empty());
    }

    #[test]
    fn test_root_not_found() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");
        let result = discover(&missing);
        assert!(matches!(result, Err(DiscoveryError::RootNotFound(_))));
    }

    #[test]
    fn test_relative_root_yields_absolute_paths() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "site/roles/web/tasks/main.yml");
        let root = temp.path().join("site");

        let spelled = root.join("roles").join("..");
        let nodes = discover(&spelled).unwrap();
        assert_eq!(nodes, discover(&root).unwrap());
        assert!(nodes.iter().all(|n| Path::new(n).is_absolute()));
        assert!(nodes.iter().all(|n| !n.contains("..")));
    }

    #[test]
    fn test_root_is_a_file() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "site.yml");
        let result = discover(&temp.path().join("site.yml"));
        assert!(matches!(result, Err(DiscoveryError::Unreadable { .. })));
    }
}
