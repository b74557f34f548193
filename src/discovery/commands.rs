//! Command discovery.
//!
//! Commands are markdown templates under `command`/`commands`. Unlike
//! agents, front matter is optional: a bare markdown file is a valid
//! command whose entire body is the template text.

use crate::discovery::frontmatter;
use crate::discovery::walker::{BoundedWalker, WalkLimits};
use crate::discovery::{identity_from_rel_path, resolve_kind_root};
use crate::manifest::is_valid_artifact_name;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Validated command configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Model override when the command runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Disable without removing the definition
    #[serde(default)]
    pub disabled: bool,

    /// Template text (the markdown body)
    #[serde(default)]
    pub template: String,
}

/// One discovered command.
#[derive(Debug, Clone)]
pub struct CommandInfo {
    /// Slash-segmented identity derived from the file's location
    pub name: String,
    /// Absolute source path
    pub path: PathBuf,
    /// Validated configuration
    pub config: CommandConfig,
}

/// Discover commands under a repository root.
pub fn discover_commands(repo_root: &Path) -> Vec<CommandInfo> {
    let root = match resolve_kind_root(repo_root, "command", "commands") {
        Some(root) => root,
        None => return Vec::new(),
    };
    let mut walker = BoundedWalker::new(WalkLimits::default());
    let mut found = Vec::new();
    walker.walk_files(&root, &["md"], |path, rel| {
        if let Some(command) = parse_command_file(path, rel) {
            found.push(command);
        }
    });
    debug!(root = %root.display(), count = found.len(), "Command discovery complete");
    found
}

fn parse_command_file(path: &Path, rel: &Path) -> Option<CommandInfo> {
    let name = match identity_from_rel_path(rel, ".md") {
        Some(name) => name,
        None => {
            warn!(path = %path.display(), "Command path is not valid UTF-8, skipping");
            return None;
        }
    };
    if !is_valid_artifact_name(&name) {
        warn!(path = %path.display(), name = %name, "Command name has invalid characters, skipping");
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), "Failed to read command file, skipping: {}", e);
            return None;
        }
    };
    let extracted = match frontmatter::extract(&content) {
        Ok(extracted) => extracted,
        Err(e) => {
            warn!(path = %path.display(), "Command front matter rejected, skipping: {}", e);
            return None;
        }
    };
    let mut config = match extracted.data {
        Some(data) => {
            let data = if data.is_null() {
                serde_yaml::Value::Mapping(Default::default())
            } else {
                data
            };
            match frontmatter::deserialize_data::<CommandConfig>(data) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), "Command front matter shape rejected, skipping: {}", e);
                    return None;
                }
            }
        }
        // No front matter: the whole file is the template.
        None => CommandConfig {
            description: None,
            model: None,
            disabled: false,
            template: String::new(),
        },
    };
    config.template = extracted.body.trim().to_string();
    Some(CommandInfo {
        name,
        path: path.to_path_buf(),
        config,
    })
}
