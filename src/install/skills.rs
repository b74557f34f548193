//! Skill installation and reconciliation.
//!
//! Skills install under a per-repository subdirectory of the managed root
//! (`<skills_root>/remote/<repo>/<skill>`). Everything under the managed
//! root is owned by this tool and may be replaced or removed; anything
//! directly under the skills root belongs to the user and is never
//! touched — a same-named user skill turns into a reported conflict
//! instead of an overwrite.

use crate::config::{InstallMethod, SyncContext};
use crate::discovery::SkillInfo;
use crate::install::gitignore::{ensure_gitignore_entry, find_vcs_root};
use crate::install::{
    create_symlink, mirror_copy_dir, remove_occupant, symlink_points_at, InstallResult,
};
use crate::repo::SyncResult;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Managed subdirectory under the host skills root.
pub const MANAGED_SKILLS_DIR: &str = "remote";

/// Installs and reconciles skills for all synced repositories.
pub struct SkillInstaller<'a> {
    context: &'a SyncContext,
}

impl<'a> SkillInstaller<'a> {
    pub fn new(context: &'a SyncContext) -> Self {
        Self { context }
    }

    /// The managed root; nothing above it is ever deleted.
    pub fn managed_root(&self) -> PathBuf {
        self.context.skills_root.join(MANAGED_SKILLS_DIR)
    }

    /// Install the desired skill set, then remove stale managed entries.
    ///
    /// Install-then-delete ordering guarantees a window where old and new
    /// artifacts coexist rather than a window with neither.
    pub fn reconcile(&self, results: &[SyncResult]) -> Vec<InstallResult> {
        let mut outcomes = Vec::new();
        let mut desired: HashSet<(String, String)> = HashSet::new();

        for result in results {
            for skill in &result.skills {
                if let Some(conflict) = self.user_conflict(skill) {
                    warn!(skill = %skill.name, path = %conflict.display(), "Skill conflicts with user content, skipping");
                    outcomes.push(InstallResult::failed(
                        &skill.name,
                        &skill.path,
                        &conflict,
                        format!("conflicts with existing user skill at {}", conflict.display()),
                    ));
                    continue;
                }
                // Desired regardless of install outcome: a failed install
                // must not cause cleanup to delete a prior working entry.
                desired.insert((result.short_name.clone(), skill.name.clone()));
                outcomes.push(self.install_one(&result.short_name, skill));
            }
        }

        self.cleanup_stale(&desired);
        self.ensure_gitignore();
        outcomes
    }

    /// A same-named path outside the managed root means the user owns that
    /// skill name.
    fn user_conflict(&self, skill: &SkillInfo) -> Option<PathBuf> {
        let user_path = self.context.skills_root.join(&skill.name);
        if user_path.exists() {
            Some(user_path)
        } else {
            None
        }
    }

    fn install_one(&self, repo_short_name: &str, skill: &SkillInfo) -> InstallResult {
        let target = self.managed_root().join(repo_short_name).join(&skill.name);
        if let Some(parent) = target.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return InstallResult::failed(
                    &skill.name,
                    &skill.path,
                    &target,
                    format!("failed to create install directory: {}", e),
                );
            }
        }
        match self.context.install_method {
            InstallMethod::Link => self.install_link(&skill.name, &skill.path, &target),
            InstallMethod::Copy => self.install_copy(&skill.name, &skill.path, &target),
        }
    }

    fn install_link(&self, name: &str, source: &Path, target: &Path) -> InstallResult {
        if let Ok(meta) = std::fs::symlink_metadata(target) {
            if meta.file_type().is_symlink() {
                if symlink_points_at(target, source) {
                    return InstallResult::ok(name, source, target, false);
                }
                // Update path: the source moved, retarget the link.
                if let Err(e) = remove_occupant(target) {
                    return InstallResult::failed(
                        name,
                        source,
                        target,
                        format!("failed to replace symlink: {}", e),
                    );
                }
            } else {
                // Non-symlink inside the managed root is a prior copy-mode
                // install; switching method replaces it.
                if let Err(e) = remove_occupant(target) {
                    return InstallResult::failed(
                        name,
                        source,
                        target,
                        format!("failed to replace copied install: {}", e),
                    );
                }
            }
        }
        match create_symlink(source, target) {
            Ok(()) => {
                debug!(skill = name, target = %target.display(), "Skill linked");
                InstallResult::ok(name, source, target, true)
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                // Symlink creation needs elevated privilege on some
                // platforms; fall back to copying this one artifact.
                info!(skill = name, "Symlink not permitted, falling back to copy");
                self.install_copy(name, source, target)
            }
            Err(e) => InstallResult::failed(
                name,
                source,
                target,
                format!("failed to create symlink: {}", e),
            ),
        }
    }

    fn install_copy(&self, name: &str, source: &Path, target: &Path) -> InstallResult {
        let existed = std::fs::symlink_metadata(target).is_ok();
        let mut replaced = false;
        if let Ok(meta) = std::fs::symlink_metadata(target) {
            if meta.file_type().is_symlink() {
                // Method switch from link to copy.
                if let Err(e) = remove_occupant(target) {
                    return InstallResult::failed(
                        name,
                        source,
                        target,
                        format!("failed to replace symlink: {}", e),
                    );
                }
                replaced = true;
            }
        }
        match mirror_copy_dir(self.context, source, target) {
            Ok(()) => {
                debug!(skill = name, target = %target.display(), "Skill copied");
                // A refreshed mirror of an existing copy is not a mutation;
                // replacing a symlink with a copy is.
                InstallResult::ok(name, source, target, !existed || replaced)
            }
            Err(e) => InstallResult::failed(name, source, target, e.to_string()),
        }
    }

    /// Delete managed entries absent from the desired set, pruning emptied
    /// repository directories but never the managed root itself.
    fn cleanup_stale(&self, desired: &HashSet<(String, String)>) {
        let root = self.managed_root();
        let repo_entries = match std::fs::read_dir(&root) {
            Ok(entries) => entries,
            Err(_) => return,
        };
        for repo_entry in repo_entries.flatten() {
            let repo_name = match repo_entry.file_name().to_str() {
                Some(name) => name.to_string(),
                None => continue,
            };
            let repo_dir = repo_entry.path();
            if !repo_dir.is_dir() {
                continue;
            }
            let skill_entries = match std::fs::read_dir(&repo_dir) {
                Ok(entries) => entries,
                Err(_) => continue,
            };
            for skill_entry in skill_entries.flatten() {
                let skill_name = match skill_entry.file_name().to_str() {
                    Some(name) => name.to_string(),
                    None => continue,
                };
                if desired.contains(&(repo_name.clone(), skill_name.clone())) {
                    continue;
                }
                match remove_occupant(&skill_entry.path()) {
                    Ok(()) => {
                        info!(repo = %repo_name, skill = %skill_name, "Removed stale managed skill")
                    }
                    Err(e) => {
                        warn!(path = %skill_entry.path().display(), "Failed to remove stale skill: {}", e)
                    }
                }
            }
            // Prune the repository directory when the cleanup emptied it.
            if std::fs::read_dir(&repo_dir)
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false)
            {
                if let Err(e) = std::fs::remove_dir(&repo_dir) {
                    warn!(path = %repo_dir.display(), "Failed to prune empty directory: {}", e);
                }
            }
        }
    }

    fn ensure_gitignore(&self) {
        let vcs_root = match find_vcs_root(&self.context.skills_root) {
            Some(root) => root,
            None => return,
        };
        let rel = match self.managed_root().strip_prefix(&vcs_root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => return,
        };
        let entry = format!("{}/", rel.to_string_lossy().replace('\\', "/"));
        if let Err(e) = ensure_gitignore_entry(&vcs_root, &entry) {
            warn!(root = %vcs_root.display(), "Failed to update .gitignore: {}", e);
        }
    }
}
