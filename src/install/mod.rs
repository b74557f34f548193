//! Installation Reconciler.
//!
//! Materializes discovered artifacts into managed target directories via
//! symlink or copy, replaces stale entries, and cleans up managed entries
//! no longer desired. The reconciler never destroys content it did not
//! create: anything outside its managed namespace (the managed skills
//! subdirectory, the plugin filename prefix) is off limits.

pub mod gitignore;
pub mod plugins;
pub mod skills;

pub use plugins::PluginInstaller;
pub use skills::{SkillInstaller, MANAGED_SKILLS_DIR};

use crate::config::SyncContext;
use crate::error::SyncError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Outcome of materializing one artifact.
#[derive(Debug, Clone)]
pub struct InstallResult {
    /// Artifact name
    pub name: String,
    /// Source location inside the repository working copy
    pub source_path: PathBuf,
    /// Target location inside the managed directory
    pub target_path: PathBuf,
    /// Whether the filesystem was mutated for this artifact
    pub created: bool,
    /// Per-artifact failure or conflict diagnostic
    pub error: Option<String>,
}

impl InstallResult {
    pub fn ok(name: &str, source: &Path, target: &Path, created: bool) -> Self {
        Self {
            name: name.to_string(),
            source_path: source.to_path_buf(),
            target_path: target.to_path_buf(),
            created,
            error: None,
        }
    }

    pub fn failed(name: &str, source: &Path, target: &Path, error: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            source_path: source.to_path_buf(),
            target_path: target.to_path_buf(),
            created: false,
            error: Some(error.into()),
        }
    }
}

/// Create a symlink at `target` pointing to `source`.
#[cfg(unix)]
pub(crate) fn create_symlink(source: &Path, target: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(source, target)
}

#[cfg(windows)]
pub(crate) fn create_symlink(source: &Path, target: &Path) -> std::io::Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, target)
    } else {
        std::os::windows::fs::symlink_file(source, target)
    }
}

/// Whether an existing symlink at `target` already points at `source`.
pub(crate) fn symlink_points_at(target: &Path, source: &Path) -> bool {
    match std::fs::read_link(target) {
        Ok(current) => {
            if current == source {
                return true;
            }
            // Compare canonical forms when the raw link text differs.
            match (dunce::canonicalize(&current), dunce::canonicalize(source)) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            }
        }
        Err(_) => false,
    }
}

/// Remove whatever occupies `path`: symlink, file, or directory tree.
pub(crate) fn remove_occupant(path: &Path) -> std::io::Result<()> {
    let meta = std::fs::symlink_metadata(path)?;
    if meta.file_type().is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}

/// Mirror-sync a directory: after this call `target` has exactly the
/// content of `source`, stale target files removed. Prefers rsync when
/// available; the portable fallback deletes and recreates the target. Both
/// paths remove a partially-written target on failure.
pub(crate) fn mirror_copy_dir(
    context: &SyncContext,
    source: &Path,
    target: &Path,
) -> Result<(), SyncError> {
    if context.rsync_available() {
        return rsync_mirror(source, target);
    }
    if target.exists() {
        remove_occupant(target)?;
    }
    if let Err(e) = copy_dir_recursive(source, target) {
        // Do not leave a half-written skill behind.
        if target.exists() {
            if let Err(cleanup) = remove_occupant(target) {
                warn!(target = %target.display(), "Failed to clean up partial copy: {}", cleanup);
            }
        }
        return Err(e);
    }
    Ok(())
}

fn rsync_mirror(source: &Path, target: &Path) -> Result<(), SyncError> {
    // Trailing slash on the source means "contents of", matching the
    // fallback's semantics.
    let mut source_arg = source.to_string_lossy().to_string();
    if !source_arg.ends_with('/') {
        source_arg.push('/');
    }
    let target_arg = target.to_string_lossy().to_string();
    debug!(source = %source_arg, target = %target_arg, "Mirroring with rsync");
    let output = std::process::Command::new("rsync")
        .args(["-a", "--delete", &source_arg, &target_arg])
        .output()
        .map_err(|e| SyncError::Install(format!("failed to spawn rsync: {}", e)))?;
    if !output.status.success() {
        if target.exists() {
            if let Err(cleanup) = remove_occupant(target) {
                warn!(target = %target.display(), "Failed to clean up partial mirror: {}", cleanup);
            }
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SyncError::Install(format!(
            "rsync failed: {}",
            stderr.trim()
        )));
    }
    Ok(())
}

pub(crate) fn copy_dir_recursive(source: &Path, target: &Path) -> Result<(), SyncError> {
    std::fs::create_dir_all(target)?;
    for entry in std::fs::read_dir(source)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let dest = target.join(entry.file_name());
        if file_type.is_dir() {
            copy_dir_recursive(&entry.path(), &dest)?;
        } else if file_type.is_file() {
            std::fs::copy(entry.path(), &dest)?;
        }
        // Symlinks inside repository content are not carried over.
    }
    Ok(())
}
