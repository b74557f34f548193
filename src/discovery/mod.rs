//! Artifact discovery.
//!
//! Each discoverer turns one repository root into a typed list of artifact
//! records by composing the bounded tree walker with schema validation.
//! Individual invalid artifacts are logged and dropped; a discovery pass
//! itself never fails.

pub mod agents;
pub mod commands;
pub mod frontmatter;
pub mod instructions;
pub mod plugins;
pub mod skills;
pub mod walker;

pub use agents::{discover_agents, AgentConfig, AgentInfo};
pub use commands::{discover_commands, CommandConfig, CommandInfo};
pub use instructions::{discover_instructions, InstructionInfo};
pub use plugins::{discover_plugins, PluginInfo};
pub use skills::{discover_skills, SkillInfo};
pub use walker::{BoundedWalker, WalkLimits};

use std::path::{Path, PathBuf};

/// Resolve an artifact kind's root directory inside a repository.
///
/// The singular directory name is tried before the plural; the singular
/// wins when both exist (the two are never merged).
pub fn resolve_kind_root(repo_root: &Path, singular: &str, plural: &str) -> Option<PathBuf> {
    let singular_path = repo_root.join(singular);
    if singular_path.is_dir() {
        return Some(singular_path);
    }
    let plural_path = repo_root.join(plural);
    if plural_path.is_dir() {
        return Some(plural_path);
    }
    None
}

/// Derive a slash-segmented identity from a relative file path, dropping
/// the given extension. Returns None for paths that do not render as UTF-8.
pub(crate) fn identity_from_rel_path(rel: &Path, strip_ext: &str) -> Option<String> {
    let mut segments = Vec::new();
    for component in rel.components() {
        segments.push(component.as_os_str().to_str()?);
    }
    let joined = segments.join("/");
    let lower = joined.to_ascii_lowercase();
    let stripped = if lower.ends_with(&strip_ext.to_ascii_lowercase()) {
        &joined[..joined.len() - strip_ext.len()]
    } else {
        &joined
    };
    Some(stripped.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn singular_root_wins_over_plural() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("agent")).unwrap();
        fs::create_dir(dir.path().join("agents")).unwrap();
        let resolved = resolve_kind_root(dir.path(), "agent", "agents").unwrap();
        assert!(resolved.ends_with("agent"));
    }

    #[test]
    fn plural_root_used_when_singular_absent() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("skills")).unwrap();
        let resolved = resolve_kind_root(dir.path(), "skill", "skills").unwrap();
        assert!(resolved.ends_with("skills"));
    }

    #[test]
    fn missing_roots_resolve_to_none() {
        let dir = TempDir::new().unwrap();
        assert!(resolve_kind_root(dir.path(), "plugin", "plugins").is_none());
    }

    #[test]
    fn identity_strips_extension_case_insensitively() {
        assert_eq!(
            identity_from_rel_path(Path::new("cat/sub/name.md"), ".md").unwrap(),
            "cat/sub/name"
        );
        assert_eq!(
            identity_from_rel_path(Path::new("hook.TS"), ".ts").unwrap(),
            "hook"
        );
    }
}
