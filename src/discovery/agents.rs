//! Agent discovery.
//!
//! Agents are markdown files under the repository's `agent`/`agents`
//! directory. Front matter is mandatory: a markdown file without it is not
//! an agent definition and is rejected. The body becomes the agent's
//! prompt.

use crate::discovery::frontmatter;
use crate::discovery::walker::{BoundedWalker, WalkLimits};
use crate::discovery::{identity_from_rel_path, resolve_kind_root};
use crate::manifest::is_valid_artifact_name;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Validated agent configuration from front matter plus prompt body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Model override for this agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Tool or capability permissions granted to the agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,

    /// Disable without removing the definition
    #[serde(default)]
    pub disabled: bool,

    /// System prompt (the markdown body)
    #[serde(default)]
    pub prompt: String,
}

/// One discovered agent.
#[derive(Debug, Clone)]
pub struct AgentInfo {
    /// Slash-segmented identity derived from the file's location
    pub name: String,
    /// Absolute source path
    pub path: PathBuf,
    /// Validated configuration
    pub config: AgentConfig,
}

/// Discover agents under a repository root.
pub fn discover_agents(repo_root: &Path) -> Vec<AgentInfo> {
    let root = match resolve_kind_root(repo_root, "agent", "agents") {
        Some(root) => root,
        None => return Vec::new(),
    };
    let mut walker = BoundedWalker::new(WalkLimits::default());
    let mut found = Vec::new();
    walker.walk_files(&root, &["md"], |path, rel| {
        if let Some(agent) = parse_agent_file(path, rel) {
            found.push(agent);
        }
    });
    debug!(root = %root.display(), count = found.len(), "Agent discovery complete");
    found
}

fn parse_agent_file(path: &Path, rel: &Path) -> Option<AgentInfo> {
    let name = match identity_from_rel_path(rel, ".md") {
        Some(name) => name,
        None => {
            warn!(path = %path.display(), "Agent path is not valid UTF-8, skipping");
            return None;
        }
    };
    if !is_valid_artifact_name(&name) {
        warn!(path = %path.display(), name = %name, "Agent name has invalid characters, skipping");
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), "Failed to read agent file, skipping: {}", e);
            return None;
        }
    };
    let extracted = match frontmatter::extract(&content) {
        Ok(extracted) => extracted,
        Err(e) => {
            warn!(path = %path.display(), "Agent front matter rejected, skipping: {}", e);
            return None;
        }
    };
    let data = match extracted.data {
        Some(data) => data,
        None => {
            warn!(path = %path.display(), "Markdown file has no front matter, not an agent definition");
            return None;
        }
    };
    let data = if data.is_null() {
        serde_yaml::Value::Mapping(Default::default())
    } else {
        data
    };
    let mut config: AgentConfig = match frontmatter::deserialize_data(data) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), "Agent front matter shape rejected, skipping: {}", e);
            return None;
        }
    };
    config.prompt = extracted.body.trim().to_string();
    Some(AgentInfo {
        name,
        path: path.to_path_buf(),
        config,
    })
}
