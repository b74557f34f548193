//! Gitignore guard for the managed skills directory.
//!
//! Managed artifacts must never be committed accidentally. After
//! installation, a `.gitignore` entry pointing at the managed subdirectory
//! is ensured at the nearest enclosing version-control root: added when
//! missing, never duplicated.

use crate::error::SyncError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Walk up from `start` looking for a directory containing `.git`.
pub fn find_vcs_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

/// Ensure `entry` is present in the `.gitignore` at `vcs_root`.
pub fn ensure_gitignore_entry(vcs_root: &Path, entry: &str) -> Result<(), SyncError> {
    let gitignore = vcs_root.join(".gitignore");
    let existing = if gitignore.is_file() {
        std::fs::read_to_string(&gitignore)?
    } else {
        String::new()
    };
    if existing.lines().any(|line| line.trim() == entry) {
        return Ok(());
    }
    let mut updated = existing;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(entry);
    updated.push('\n');
    std::fs::write(&gitignore, updated)?;
    debug!(root = %vcs_root.display(), entry, "Added gitignore entry");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn finds_nearest_enclosing_root() {
        let base = TempDir::new().unwrap();
        fs::create_dir_all(base.path().join(".git")).unwrap();
        let nested = base.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        let root = find_vcs_root(&nested).unwrap();
        assert_eq!(root, base.path());
    }

    #[test]
    fn entry_added_once_and_never_duplicated() {
        let base = TempDir::new().unwrap();
        fs::create_dir_all(base.path().join(".git")).unwrap();

        ensure_gitignore_entry(base.path(), "skills/remote/").unwrap();
        ensure_gitignore_entry(base.path(), "skills/remote/").unwrap();

        let content = fs::read_to_string(base.path().join(".gitignore")).unwrap();
        assert_eq!(
            content.lines().filter(|l| *l == "skills/remote/").count(),
            1
        );
    }

    #[test]
    fn appends_to_existing_file_without_clobbering() {
        let base = TempDir::new().unwrap();
        fs::write(base.path().join(".gitignore"), "target/").unwrap();
        ensure_gitignore_entry(base.path(), "skills/remote/").unwrap();
        let content = fs::read_to_string(base.path().join(".gitignore")).unwrap();
        assert!(content.contains("target/"));
        assert!(content.contains("skills/remote/"));
    }
}
