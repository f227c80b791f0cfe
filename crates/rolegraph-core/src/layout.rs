//! Path layout conventions
//!
//! A node is identified by its path alone. Everything else about it, whether
//! it is a playbook or a role task file and which platform it belongs to, is
//! derived from reserved path segments described by a [`PathScheme`].

use serde::{Deserialize, Serialize};

/// Category of a discovered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    /// Entry-point task list
    Playbook,
    /// Task file inside a role
    Role,
}

impl NodeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeCategory::Playbook => "playbook",
            NodeCategory::Role => "role",
        }
    }
}

/// Reserved segment names that give meaning to a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathScheme {
    /// Segment marking role content (`roles`)
    pub roles_segment: String,
    /// Segment whose next directory names the platform (`playbooks`)
    pub platform_marker: String,
    /// Conventional entry file of a role's task directory (`main.yml`)
    pub main_file: String,
}

impl Default for PathScheme {
    fn default() -> Self {
        Self {
            roles_segment: "roles".to_string(),
            platform_marker: "playbooks".to_string(),
            main_file: "main.yml".to_string(),
        }
    }
}

/// A discovered path together with its derived attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub path: String,
    pub category: NodeCategory,
    pub platform: Option<String>,
}

impl PathScheme {
    /// Role if any segment equals the roles segment, otherwise Playbook.
    pub fn category(&self, path: &str) -> NodeCategory {
        if segments(path).any(|s| s == self.roles_segment) {
            NodeCategory::Role
        } else {
            NodeCategory::Playbook
        }
    }

    /// The directory immediately following the platform marker.
    ///
    /// Returns `None` when the marker is absent, when the next segment is the
    /// file name itself, or when the next segment is the roles segment: in
    /// all three cases the tree carries no platform partitioning.
    pub fn platform<'a>(&self, path: &'a str) -> Option<&'a str> {
        let segs: Vec<&'a str> = segments(path).collect();
        let marker = segs.iter().position(|s| *s == self.platform_marker)?;
        let next = marker + 1;
        if next + 1 >= segs.len() {
            return None;
        }
        let platform = segs[next];
        if platform == self.roles_segment {
            return None;
        }
        Some(platform)
    }

    /// True if `path` has `segment` as one of its components.
    pub fn has_segment(&self, path: &str, segment: &str) -> bool {
        segments(path).any(|s| s == segment)
    }

    /// True if the file name of `path` is the conventional main file.
    pub fn is_main_file(&self, path: &str) -> bool {
        segments(path).last() == Some(self.main_file.as_str())
    }

    pub fn describe(&self, path: &str) -> Node {
        Node {
            path: path.to_string(),
            category: self.category(path),
            platform: self.platform(path).map(str::to_string),
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['/', '\\']).filter(|s| !s.is_empty())
}
