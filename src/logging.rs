//! Logging System
//!
//! Structured logging via the `tracing` crate. Configurable level, output
//! destination, and per-module overrides. Sync diagnostics (skipped
//! artifacts, transport failures, bounded-walk truncation) all flow through
//! here rather than aborting the run.

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Resolve the log file path with precedence: CLI, CURATOR_LOG_FILE env, config file, default.
///
/// Default uses `ProjectDirs` state directory.
pub fn resolve_log_file_path(
    cli_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
) -> Result<PathBuf, SyncError> {
    if let Some(p) = cli_file {
        if !p.as_os_str().is_empty() {
            return Ok(p);
        }
    }
    if let Ok(env_path) = std::env::var("CURATOR_LOG_FILE") {
        if !env_path.is_empty() {
            return Ok(PathBuf::from(env_path));
        }
    }
    if let Some(p) = config_file {
        if !p.as_os_str().is_empty() {
            return Ok(p);
        }
    }
    default_log_file_path()
}

fn default_log_file_path() -> Result<PathBuf, SyncError> {
    let project_dirs = directories::ProjectDirs::from("", "curator", "curator").ok_or_else(|| {
        SyncError::Config("Could not determine platform state directory for log file".to_string())
    })?;
    let state_dir = project_dirs
        .state_dir()
        .unwrap_or_else(|| project_dirs.data_dir());
    Ok(state_dir.join("curator.log"))
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether logging is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output destination: stderr, file, both
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path when output includes file; None means use runtime default
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            output: default_output(),
            file: None,
            modules: HashMap::new(),
        }
    }
}

fn build_env_filter(config: Option<&LoggingConfig>) -> Result<EnvFilter, SyncError> {
    if let Ok(env_filter) = std::env::var("CURATOR_LOG") {
        return EnvFilter::try_new(&env_filter)
            .map_err(|e| SyncError::Config(format!("Invalid CURATOR_LOG filter: {}", e)));
    }
    let mut directives = config
        .map(|c| c.level.clone())
        .unwrap_or_else(default_log_level);
    if let Some(config) = config {
        for (module, level) in &config.modules {
            directives.push_str(&format!(",{}={}", module, level));
        }
    }
    EnvFilter::try_new(&directives)
        .map_err(|e| SyncError::Config(format!("Invalid log filter '{}': {}", directives, e)))
}

fn open_log_file(path: &Path) -> Result<std::fs::File, SyncError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| SyncError::Config(format!("Failed to create log directory: {}", e)))?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| SyncError::Config(format!("Failed to open log file {:?}: {}", path, e)))
}

/// Initialize the logging system
///
/// Priority order (highest to lowest): CLI arguments, environment variables
/// (CURATOR_LOG, CURATOR_LOG_FILE), configuration file, defaults.
pub fn init_logging(
    cli_log_file: Option<PathBuf>,
    config: Option<&LoggingConfig>,
) -> Result<(), SyncError> {
    let disabled = config.map(|c| !c.enabled).unwrap_or(false);
    if disabled {
        Registry::default()
            .with(EnvFilter::new("off"))
            .with(fmt::layer().with_writer(std::io::sink))
            .init();
        return Ok(());
    }

    let filter = build_env_filter(config)?;
    let output = config.map(|c| c.output.as_str()).unwrap_or("stderr");
    let base_subscriber = Registry::default().with(filter);

    match output {
        "file" => {
            let path = resolve_log_file_path(cli_log_file, config.and_then(|c| c.file.clone()))?;
            let file_writer = open_log_file(&path)?;
            base_subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_ansi(false)
                        .with_writer(file_writer),
                )
                .init();
        }
        "both" => {
            let path = resolve_log_file_path(cli_log_file, config.and_then(|c| c.file.clone()))?;
            let file_writer = open_log_file(&path)?;
            let writer = file_writer.and(std::io::stderr);
            base_subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
        }
        _ => {
            base_subscriber
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .init();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_enabled_at_info() {
        let config = LoggingConfig::default();
        assert!(config.enabled);
        assert_eq!(config.level, "info");
        assert_eq!(config.output, "stderr");
        assert!(config.file.is_none());
    }

    #[test]
    fn cli_path_takes_precedence() {
        let resolved = resolve_log_file_path(
            Some(PathBuf::from("/tmp/cli.log")),
            Some(PathBuf::from("/tmp/cfg.log")),
        )
        .unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/cli.log"));
    }

    #[test]
    fn module_overrides_append_to_filter() {
        let mut config = LoggingConfig::default();
        config
            .modules
            .insert("curator::repo".to_string(), "debug".to_string());
        let filter = build_env_filter(Some(&config));
        assert!(filter.is_ok());
    }
}
