//! Plugin installation and reconciliation.
//!
//! Plugins install flat into the shared host plugin directory. The
//! filename `_remote_<repo>_<name><ext>` both avoids collisions across
//! repositories and marks the entry as managed: cleanup only ever touches
//! files carrying the prefix.

use crate::config::{InstallMethod, SyncContext};
use crate::discovery::PluginInfo;
use crate::install::{create_symlink, remove_occupant, symlink_points_at, InstallResult};
use crate::repo::SyncResult;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Filename prefix marking a plugin file as managed by this tool.
pub const PLUGIN_PREFIX: &str = "_remote_";

/// Installs and reconciles plugins for all synced repositories.
pub struct PluginInstaller<'a> {
    context: &'a SyncContext,
}

impl<'a> PluginInstaller<'a> {
    pub fn new(context: &'a SyncContext) -> Self {
        Self { context }
    }

    /// Managed filename for one plugin.
    pub fn target_file_name(plugin: &PluginInfo) -> String {
        format!(
            "{}{}_{}{}",
            PLUGIN_PREFIX, plugin.repo_short_name, plugin.name, plugin.extension
        )
    }

    /// Install the desired plugin set, then remove stale managed files.
    pub fn reconcile(&self, results: &[SyncResult]) -> Vec<InstallResult> {
        let mut outcomes = Vec::new();
        let mut desired: HashSet<String> = HashSet::new();

        for result in results {
            for plugin in &result.plugins {
                let file_name = Self::target_file_name(plugin);
                desired.insert(file_name.clone());
                outcomes.push(self.install_one(plugin, &file_name));
            }
        }

        self.cleanup_stale(&desired);
        outcomes
    }

    fn install_one(&self, plugin: &PluginInfo, file_name: &str) -> InstallResult {
        let target = self.context.plugins_dir.join(file_name);
        if let Err(e) = std::fs::create_dir_all(&self.context.plugins_dir) {
            return InstallResult::failed(
                &plugin.name,
                &plugin.path,
                &target,
                format!("failed to create plugin directory: {}", e),
            );
        }
        match self.context.install_method {
            InstallMethod::Link => self.install_link(plugin, &target),
            InstallMethod::Copy => self.install_copy(plugin, &target),
        }
    }

    fn install_link(&self, plugin: &PluginInfo, target: &Path) -> InstallResult {
        if let Ok(meta) = std::fs::symlink_metadata(target) {
            if meta.file_type().is_symlink() {
                if symlink_points_at(target, &plugin.path) {
                    return InstallResult::ok(&plugin.name, &plugin.path, target, false);
                }
                if let Err(e) = remove_occupant(target) {
                    return InstallResult::failed(
                        &plugin.name,
                        &plugin.path,
                        target,
                        format!("failed to replace symlink: {}", e),
                    );
                }
            } else {
                // A prefixed regular file is a prior copy-mode install;
                // switching method replaces it.
                if let Err(e) = remove_occupant(target) {
                    return InstallResult::failed(
                        &plugin.name,
                        &plugin.path,
                        target,
                        format!("failed to replace copied install: {}", e),
                    );
                }
            }
        }
        match create_symlink(&plugin.path, target) {
            Ok(()) => {
                debug!(plugin = %plugin.name, target = %target.display(), "Plugin linked");
                InstallResult::ok(&plugin.name, &plugin.path, target, true)
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                info!(plugin = %plugin.name, "Symlink not permitted, falling back to copy");
                self.install_copy(plugin, target)
            }
            Err(e) => InstallResult::failed(
                &plugin.name,
                &plugin.path,
                target,
                format!("failed to create symlink: {}", e),
            ),
        }
    }

    fn install_copy(&self, plugin: &PluginInfo, target: &Path) -> InstallResult {
        if let Ok(meta) = std::fs::symlink_metadata(target) {
            if meta.file_type().is_symlink() {
                if let Err(e) = remove_occupant(target) {
                    return InstallResult::failed(
                        &plugin.name,
                        &plugin.path,
                        target,
                        format!("failed to replace symlink: {}", e),
                    );
                }
            } else if file_contents_match(&plugin.path, target) {
                return InstallResult::ok(&plugin.name, &plugin.path, target, false);
            }
        }
        match std::fs::copy(&plugin.path, target) {
            Ok(_) => {
                debug!(plugin = %plugin.name, target = %target.display(), "Plugin copied");
                InstallResult::ok(&plugin.name, &plugin.path, target, true)
            }
            Err(e) => InstallResult::failed(
                &plugin.name,
                &plugin.path,
                target,
                format!("failed to copy plugin: {}", e),
            ),
        }
    }

    /// Remove managed (prefixed) files not in the desired set. Files
    /// without the prefix are user content and are never touched.
    fn cleanup_stale(&self, desired: &HashSet<String>) {
        let entries = match std::fs::read_dir(&self.context.plugins_dir) {
            Ok(entries) => entries,
            Err(_) => return,
        };
        for entry in entries.flatten() {
            let file_name = match entry.file_name().to_str() {
                Some(name) => name.to_string(),
                None => continue,
            };
            if !file_name.starts_with(PLUGIN_PREFIX) || desired.contains(&file_name) {
                continue;
            }
            match remove_occupant(&entry.path()) {
                Ok(()) => info!(file = %file_name, "Removed stale managed plugin"),
                Err(e) => {
                    warn!(path = %entry.path().display(), "Failed to remove stale plugin: {}", e)
                }
            }
        }
    }
}

fn file_contents_match(a: &Path, b: &Path) -> bool {
    match (std::fs::read(a), std::fs::read(b)) {
        (Ok(contents_a), Ok(contents_b)) => contents_a == contents_b,
        _ => false,
    }
}
