//! CLI Tooling
//!
//! Command-line interface for the artifact sync pipeline. A full run is
//! sync, install, inject in that order; `--dry-run` stops after sync and
//! reports what would change.

use crate::config::{ConfigLoader, CuratorConfig, SyncContext};
use crate::error::SyncError;
use crate::inject::{collect, inject_all};
use crate::install::{PluginInstaller, SkillInstaller};
use crate::logging::LoggingConfig;
use crate::report::{
    format_injection_text, format_install_results_text, format_section_heading,
    format_sync_results_text,
};
use crate::repo::SyncCoordinator;
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use std::path::PathBuf;
use tracing::info;

/// Curator CLI - Sync agents, skills, commands, and plugins from artifact repositories
#[derive(Parser)]
#[command(name = "curator")]
#[command(about = "Sync agents, skills, commands, and plugins from artifact repositories")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log output (stderr, file, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sync all configured repositories, install artifacts, and inject
    /// them into the host configuration
    Sync {
        /// Report what would be installed without touching managed directories
        #[arg(long)]
        dry_run: bool,

        /// Host configuration file (JSON) to inject agents, commands, and
        /// instructions into; omit to skip injection
        #[arg(long)]
        host_config: Option<PathBuf>,
    },
    /// Show configured repositories and resolved paths
    Status,
}

impl Cli {
    /// Logging configuration with CLI flags layered over the config file.
    pub fn logging_config(&self, config: &CuratorConfig) -> LoggingConfig {
        let mut logging = config.logging.clone();
        if let Some(level) = &self.log_level {
            logging.level = level.clone();
        }
        if let Some(output) = &self.log_output {
            logging.output = output.clone();
        }
        logging
    }
}

/// Loaded configuration plus the resolved sync context.
pub struct CliContext {
    config: CuratorConfig,
    context: SyncContext,
}

impl CliContext {
    /// Load configuration and resolve managed paths.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, SyncError> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path),
            None => ConfigLoader::load(),
        }
        .map_err(|e| SyncError::Config(e.to_string()))?;
        let context = SyncContext::from_settings(&config.sync)?;
        Ok(Self { config, context })
    }

    /// Context from an already-loaded configuration and explicit paths.
    pub fn with_parts(config: CuratorConfig, context: SyncContext) -> Self {
        Self { config, context }
    }

    pub fn config(&self) -> &CuratorConfig {
        &self.config
    }

    /// Execute a command and return its text output.
    pub fn execute(&self, command: &Commands) -> Result<String, SyncError> {
        match command {
            Commands::Sync {
                dry_run,
                host_config,
            } => self.run_sync(*dry_run, host_config.as_deref()),
            Commands::Status => Ok(self.run_status()),
        }
    }

    fn run_sync(
        &self,
        dry_run: bool,
        host_config: Option<&std::path::Path>,
    ) -> Result<String, SyncError> {
        let coordinator = SyncCoordinator::new(&self.context);
        let results = coordinator.sync_all(&self.config.repositories);

        let mut out = String::new();
        out.push_str(&format_sync_results_text(&results));
        out.push('\n');

        if dry_run {
            let skills: usize = results.iter().map(|r| r.skills.len()).sum();
            let plugins: usize = results.iter().map(|r| r.plugins.len()).sum();
            out.push_str(&format!(
                "Dry run: {} skills and {} plugins would be installed.\n",
                skills, plugins
            ));
            return Ok(out);
        }

        let skill_outcomes = SkillInstaller::new(&self.context).reconcile(&results);
        out.push_str(&format_install_results_text("Skills", &skill_outcomes));
        out.push('\n');

        let plugin_outcomes = PluginInstaller::new(&self.context).reconcile(&results);
        out.push_str(&format_install_results_text("Plugins", &plugin_outcomes));
        out.push('\n');

        if let Some(path) = host_config {
            let collection = collect(&results);
            let mut host = load_host_config(path)?;
            let report = inject_all(&mut host, &collection);
            write_host_config(path, &host)?;
            info!(path = %path.display(), "Host configuration updated");
            out.push_str(&format_injection_text(&collection, &report));
        }
        Ok(out)
    }

    fn run_status(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\n\n", format_section_heading("Configuration")));
        out.push_str(&format!(
            "  Cache root: {}\n",
            self.context.cache_root.display()
        ));
        out.push_str(&format!(
            "  Skills dir: {}\n",
            self.context.skills_root.display()
        ));
        out.push_str(&format!(
            "  Plugins dir: {}\n\n",
            self.context.plugins_dir.display()
        ));
        out.push_str(&format!("{}\n\n", format_section_heading("Repositories")));
        if self.config.repositories.is_empty() {
            out.push_str("No repositories configured.\n");
            return out;
        }
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Url", "Ref", "Cache"]);
        for repo in &self.config.repositories {
            let cache = if crate::repo::is_local_source(&repo.url) {
                "local".to_string()
            } else {
                crate::repo::cache_id(&repo.url)
            };
            table.add_row(vec![
                repo.url.clone(),
                repo.r#ref.clone().unwrap_or_else(|| "-".to_string()),
                cache,
            ]);
        }
        out.push_str(&format!("{}\n", table));
        out
    }
}

fn load_host_config(
    path: &std::path::Path,
) -> Result<serde_json::Map<String, serde_json::Value>, SyncError> {
    if !path.exists() {
        return Ok(serde_json::Map::new());
    }
    let raw = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| SyncError::Config(format!("Invalid host configuration JSON: {}", e)))?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(SyncError::Config(
            "Host configuration root must be a JSON object".to_string(),
        )),
    }
}

fn write_host_config(
    path: &std::path::Path,
    host: &serde_json::Map<String, serde_json::Value>,
) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut rendered = serde_json::to_string_pretty(host)
        .map_err(|e| SyncError::Config(format!("Failed to render host configuration: {}", e)))?;
    rendered.push('\n');
    std::fs::write(path, rendered)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InstallMethod, RepositoryConfig, SyncSettings};
    use std::fs;
    use tempfile::TempDir;

    fn seed_repo(base: &std::path::Path) -> PathBuf {
        let repo = base.join("artifacts");
        fs::create_dir_all(repo.join("skills").join("writer")).unwrap();
        fs::write(
            repo.join("skills").join("writer").join("SKILL.md"),
            "# Writer\n",
        )
        .unwrap();
        fs::create_dir_all(repo.join("plugins")).unwrap();
        fs::write(repo.join("plugins").join("hook.ts"), "// hook\n").unwrap();
        repo
    }

    fn test_context(base: &std::path::Path) -> SyncContext {
        let ctx = SyncContext::new(
            base.join("cache"),
            base.join("skills"),
            base.join("plugins"),
            InstallMethod::Link,
        );
        ctx.override_rsync(false);
        ctx
    }

    fn config_for(repo: &std::path::Path) -> CuratorConfig {
        CuratorConfig {
            repositories: vec![RepositoryConfig::new(repo.to_string_lossy().to_string())],
            sync: SyncSettings::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn dry_run_reports_without_installing() {
        let base = TempDir::new().unwrap();
        let repo = seed_repo(base.path());
        let ctx = test_context(base.path());
        let cli = CliContext::with_parts(config_for(&repo), ctx);

        let output = cli
            .execute(&Commands::Sync {
                dry_run: true,
                host_config: None,
            })
            .unwrap();
        assert!(output.contains("Dry run: 1 skills and 1 plugins would be installed."));
        assert!(!base.path().join("skills").join("remote").exists());
    }

    #[test]
    fn full_sync_installs_and_injects() {
        let base = TempDir::new().unwrap();
        let repo = seed_repo(base.path());
        fs::create_dir_all(repo.join("agents")).unwrap();
        fs::write(
            repo.join("agents").join("reviewer.md"),
            "---\ndescription: Reviews\n---\nReview carefully.\n",
        )
        .unwrap();
        let ctx = test_context(base.path());
        let cli = CliContext::with_parts(config_for(&repo), ctx);

        let host_config = base.path().join("host").join("config.json");
        let output = cli
            .execute(&Commands::Sync {
                dry_run: false,
                host_config: Some(host_config.clone()),
            })
            .unwrap();
        assert!(output.contains("Skills"));
        assert!(base
            .path()
            .join("skills")
            .join("remote")
            .join("artifacts")
            .join("writer")
            .exists());

        let host: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&host_config).unwrap()).unwrap();
        assert_eq!(
            host["agents"]["reviewer"]["description"],
            serde_json::json!("Reviews")
        );
    }

    #[test]
    fn status_lists_repositories_and_paths() {
        let base = TempDir::new().unwrap();
        let repo = seed_repo(base.path());
        let ctx = test_context(base.path());
        let cli = CliContext::with_parts(config_for(&repo), ctx);

        let output = cli.execute(&Commands::Status).unwrap();
        assert!(output.contains("Cache root:"));
        assert!(output.contains("artifacts"));
        assert!(output.contains("local"));
    }

    #[test]
    fn cli_log_flags_override_config() {
        let cli = Cli::parse_from(["curator", "--log-level", "debug", "status"]);
        let config = CuratorConfig::default();
        let logging = cli.logging_config(&config);
        assert_eq!(logging.level, "debug");
        assert_eq!(logging.output, "stderr");
    }
}
