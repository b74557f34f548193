//! Plugin discovery.
//!
//! Plugins are executable hook sources (`.ts`/`.js`, case-insensitive)
//! under `plugin`/`plugins`. Discovery only locates them; nothing is ever
//! executed. Nested paths are flattened with `_` because plugins install
//! flat into a shared directory.

use crate::discovery::resolve_kind_root;
use crate::discovery::walker::{BoundedWalker, WalkLimits};
use crate::manifest::is_valid_artifact_name;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One discovered plugin.
#[derive(Debug, Clone)]
pub struct PluginInfo {
    /// Flattened identity (`hooks/on_start` becomes `hooks_on_start`)
    pub name: String,
    /// Absolute source path
    pub path: PathBuf,
    /// Lowercased extension including the dot (`.ts` or `.js`)
    pub extension: String,
    /// Short name of the owning repository
    pub repo_short_name: String,
}

/// Discover plugins under a repository root.
pub fn discover_plugins(repo_root: &Path, repo_short_name: &str) -> Vec<PluginInfo> {
    let root = match resolve_kind_root(repo_root, "plugin", "plugins") {
        Some(root) => root,
        None => return Vec::new(),
    };
    let mut walker = BoundedWalker::new(WalkLimits::default());
    let mut found = Vec::new();
    walker.walk_files(&root, &["ts", "js"], |path, rel| {
        if let Some(plugin) = plugin_record(path, rel, repo_short_name) {
            found.push(plugin);
        }
    });
    debug!(root = %root.display(), count = found.len(), "Plugin discovery complete");
    found
}

fn plugin_record(path: &Path, rel: &Path, repo_short_name: &str) -> Option<PluginInfo> {
    let ext_raw = path.extension().and_then(|e| e.to_str())?;
    let extension = format!(".{}", ext_raw.to_ascii_lowercase());
    let mut segments = Vec::new();
    for component in rel.components() {
        match component.as_os_str().to_str() {
            Some(segment) => segments.push(segment),
            None => {
                warn!(path = %path.display(), "Plugin path is not valid UTF-8, skipping");
                return None;
            }
        }
    }
    let joined = segments.join("_");
    let suffix = format!(".{}", ext_raw);
    let name = joined.strip_suffix(&suffix).unwrap_or(&joined).to_string();
    if !is_valid_artifact_name(&name) {
        warn!(path = %path.display(), name = %name, "Plugin name has invalid characters, skipping");
        return None;
    }
    Some(PluginInfo {
        name,
        path: path.to_path_buf(),
        extension,
        repo_short_name: repo_short_name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_plugin(root: &Path, rel: &str) {
        let path = root.join("plugins").join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "export default {}\n").unwrap();
    }

    #[test]
    fn discovers_by_extension_case_insensitively() {
        let repo = TempDir::new().unwrap();
        write_plugin(repo.path(), "on_start.ts");
        write_plugin(repo.path(), "legacy.JS");
        write_plugin(repo.path(), "readme.md");
        let mut plugins = discover_plugins(repo.path(), "acme");
        plugins.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(plugins.len(), 2);
        assert_eq!(plugins[0].name, "legacy");
        assert_eq!(plugins[0].extension, ".js");
        assert_eq!(plugins[1].name, "on_start");
        assert_eq!(plugins[1].extension, ".ts");
        assert_eq!(plugins[1].repo_short_name, "acme");
    }

    #[test]
    fn nested_paths_flatten_with_underscore() {
        let repo = TempDir::new().unwrap();
        write_plugin(repo.path(), "hooks/session/end.ts");
        let plugins = discover_plugins(repo.path(), "acme");
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0].name, "hooks_session_end");
    }

    #[test]
    fn invalid_name_is_dropped() {
        let repo = TempDir::new().unwrap();
        write_plugin(repo.path(), "has space.ts");
        assert!(discover_plugins(repo.path(), "acme").is_empty());
    }
}
