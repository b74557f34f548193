//! Git subprocess wrapper.
//!
//! The transport itself is an external collaborator: every operation shells
//! out to the system `git` and either succeeds or returns a diagnostic
//! built from the captured stderr. No git internals are interpreted here.

use crate::error::SyncError;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Thin client over the system git binary.
#[derive(Debug, Clone, Default)]
pub struct GitClient;

impl GitClient {
    pub fn new() -> Self {
        GitClient
    }

    fn run(&self, operation: &str, cwd: Option<&Path>, args: &[&str]) -> Result<String, SyncError> {
        let mut command = Command::new("git");
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }
        command.args(args);
        debug!(operation, ?args, "Running git");
        let output = command
            .output()
            .map_err(|e| SyncError::git(operation, format!("failed to spawn git: {}", e)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SyncError::git(operation, stderr.trim().to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Clone a repository into `dest`.
    pub fn clone(&self, url: &str, dest: &Path) -> Result<(), SyncError> {
        let dest_str = dest.to_string_lossy();
        self.run("clone", None, &["clone", url, dest_str.as_ref()])?;
        Ok(())
    }

    /// Fetch all remote refs.
    pub fn fetch(&self, repo: &Path) -> Result<(), SyncError> {
        self.run("fetch", Some(repo), &["fetch", "--all", "--prune"])?;
        Ok(())
    }

    /// Check out a branch, tag, or commit.
    pub fn checkout(&self, repo: &Path, refname: &str) -> Result<(), SyncError> {
        self.run("checkout", Some(repo), &["checkout", refname])?;
        Ok(())
    }

    /// Fast-forward pull; only meaningful when HEAD is on a branch.
    pub fn pull_ff(&self, repo: &Path) -> Result<(), SyncError> {
        self.run("pull", Some(repo), &["pull", "--ff-only"])?;
        Ok(())
    }

    /// Resolved HEAD commit hash, or None when it cannot be resolved
    /// (no working copy, empty repository).
    pub fn rev_parse_head(&self, repo: &Path) -> Option<String> {
        self.run("rev-parse", Some(repo), &["rev-parse", "HEAD"]).ok()
    }

    /// Whether HEAD currently points at a branch (vs detached).
    pub fn is_on_branch(&self, repo: &Path) -> bool {
        self.run("symbolic-ref", Some(repo), &["symbolic-ref", "-q", "HEAD"])
            .is_ok()
    }

    /// The remote's default branch name, falling back to `main`.
    pub fn default_branch(&self, repo: &Path) -> String {
        match self.run(
            "symbolic-ref",
            Some(repo),
            &["symbolic-ref", "refs/remotes/origin/HEAD"],
        ) {
            Ok(full) => full
                .rsplit('/')
                .next()
                .filter(|s| !s.is_empty())
                .unwrap_or("main")
                .to_string(),
            Err(_) => "main".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_operation_carries_diagnostic() {
        let git = GitClient::new();
        let err = git
            .clone("not-a-real-url", Path::new("/nonexistent/target/dir"))
            .unwrap_err();
        match err {
            SyncError::Git { operation, .. } => assert_eq!(operation, "clone"),
            other => panic!("expected git error, got {:?}", other),
        }
    }

    #[test]
    fn rev_parse_outside_repo_is_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let git = GitClient::new();
        assert!(git.rev_parse_head(dir.path()).is_none());
    }
}
