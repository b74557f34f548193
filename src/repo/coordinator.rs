//! Repository Sync Coordinator.
//!
//! Drives the per-repository state machine: make the working copy current
//! (clone or fetch+checkout for remotes, a direct path for local sources),
//! run every discoverer against it, then apply the configured filters.
//! Repositories are processed strictly one at a time in configuration
//! order; that ordering is what gives first-wins merge semantics and keeps
//! the cache free of concurrent git operations.

use crate::config::{ArtifactFilter, RepositoryConfig, SyncContext};
use crate::discovery::{
    discover_agents, discover_commands, discover_instructions, discover_plugins, discover_skills,
    AgentInfo, CommandInfo, InstructionInfo, PluginInfo, SkillInfo,
};
use crate::repo::git::GitClient;
use crate::repo::identity::{cache_id, is_local_source, local_path, short_name};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of syncing one repository.
///
/// Best-effort: `error` records why the working copy could not be made
/// current, but discovery still ran against whatever content exists.
#[derive(Debug)]
pub struct SyncResult {
    /// Cache identifier derived from the URL
    pub repo_id: String,
    /// Working copy location (cache subtree or the local source itself)
    pub repo_path: PathBuf,
    /// Short display name
    pub short_name: String,
    /// Configured ref, if any
    pub r#ref: Option<String>,
    pub skills: Vec<SkillInfo>,
    pub agents: Vec<AgentInfo>,
    pub commands: Vec<CommandInfo>,
    pub plugins: Vec<PluginInfo>,
    pub instructions: Vec<InstructionInfo>,
    /// Whether the working copy's content changed during this sync
    pub updated: bool,
    /// Transport/VCS failure diagnostic, non-fatal
    pub error: Option<String>,
}

/// Coordinates sync and discovery across all configured repositories.
pub struct SyncCoordinator<'a> {
    context: &'a SyncContext,
    git: GitClient,
}

impl<'a> SyncCoordinator<'a> {
    pub fn new(context: &'a SyncContext) -> Self {
        Self {
            context,
            git: GitClient::new(),
        }
    }

    /// Sync every repository, strictly sequentially, in configuration order.
    pub fn sync_all(&self, repositories: &[RepositoryConfig]) -> Vec<SyncResult> {
        repositories
            .iter()
            .map(|repo| self.sync_repository(repo))
            .collect()
    }

    /// Sync one repository and discover its artifacts.
    pub fn sync_repository(&self, repo: &RepositoryConfig) -> SyncResult {
        let name = short_name(&repo.url);
        let id = cache_id(&repo.url);

        let (repo_path, updated, error) = if is_local_source(&repo.url) {
            self.prepare_local(&repo.url)
        } else {
            self.prepare_remote(repo, &id)
        };

        if let Some(ref e) = error {
            warn!(repo = %repo.url, "Repository sync failed, discovering existing content: {}", e);
        }

        // Discovery is best-effort against whatever is on disk.
        let discovery_root = dunce::canonicalize(&repo_path).unwrap_or_else(|_| repo_path.clone());
        let skills = apply_filter(discover_skills(&discovery_root), &repo.skills, |s| &s.name);
        let agents = apply_filter(discover_agents(&discovery_root), &repo.agents, |a| &a.name);
        let commands = apply_filter(discover_commands(&discovery_root), &repo.commands, |c| {
            &c.name
        });
        let plugins = apply_filter(
            discover_plugins(&discovery_root, &name),
            &repo.plugins,
            |p| &p.name,
        );
        let instructions = apply_filter(
            discover_instructions(&discovery_root),
            &repo.instructions,
            |i| &i.name,
        );

        info!(
            repo = %name,
            skills = skills.len(),
            agents = agents.len(),
            commands = commands.len(),
            plugins = plugins.len(),
            instructions = instructions.len(),
            updated,
            "Repository synced"
        );

        SyncResult {
            repo_id: id,
            repo_path,
            short_name: name,
            r#ref: repo.r#ref.clone(),
            skills,
            agents,
            commands,
            plugins,
            instructions,
            updated,
            error,
        }
    }

    /// Local-directory source: no cloning, never reported as updated.
    fn prepare_local(&self, url: &str) -> (PathBuf, bool, Option<String>) {
        let path = PathBuf::from(local_path(url));
        let error = if !path.exists() {
            Some(format!("local source '{}' does not exist", path.display()))
        } else if !path.is_dir() {
            Some(format!("local source '{}' is not a directory", path.display()))
        } else {
            None
        };
        (path, false, error)
    }

    /// Remote source: clone if absent, otherwise fetch and check out the
    /// configured ref (or the remote default branch). `updated` compares
    /// the resolved HEAD hash before and after, so a no-op fetch reports
    /// false.
    fn prepare_remote(&self, repo: &RepositoryConfig, id: &str) -> (PathBuf, bool, Option<String>) {
        let repo_path = self.context.cache_root.join(id);
        if let Err(e) = std::fs::create_dir_all(&self.context.cache_root) {
            return (
                repo_path,
                false,
                Some(format!("failed to create cache root: {}", e)),
            );
        }

        let before = self.git.rev_parse_head(&repo_path);
        let error = if !repo_path.join(".git").exists() {
            self.clone_fresh(repo, &repo_path)
        } else {
            self.refresh_existing(repo, &repo_path)
        };
        let after = self.git.rev_parse_head(&repo_path);
        let updated = before != after && after.is_some();
        (repo_path, updated, error)
    }

    fn clone_fresh(&self, repo: &RepositoryConfig, repo_path: &Path) -> Option<String> {
        if let Err(e) = self.git.clone(&repo.url, repo_path) {
            return Some(e.to_string());
        }
        if let Some(refname) = &repo.r#ref {
            if let Err(e) = self.git.checkout(repo_path, refname) {
                return Some(e.to_string());
            }
        }
        None
    }

    fn refresh_existing(&self, repo: &RepositoryConfig, repo_path: &Path) -> Option<String> {
        if let Err(e) = self.git.fetch(repo_path) {
            return Some(e.to_string());
        }
        let refname = repo
            .r#ref
            .clone()
            .unwrap_or_else(|| self.git.default_branch(repo_path));
        if let Err(e) = self.git.checkout(repo_path, &refname) {
            return Some(e.to_string());
        }
        if self.git.is_on_branch(repo_path) {
            if let Err(e) = self.git.pull_ff(repo_path) {
                return Some(e.to_string());
            }
        }
        None
    }
}

/// Apply a configured filter to discovered artifacts. Absent means keep all.
fn apply_filter<T>(
    items: Vec<T>,
    filter: &Option<ArtifactFilter>,
    name_of: impl Fn(&T) -> &str,
) -> Vec<T> {
    match filter {
        None => items,
        Some(filter) => items
            .into_iter()
            .filter(|item| filter.allows(name_of(item)))
            .collect(),
    }
}
