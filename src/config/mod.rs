//! Sync configuration types.
//!
//! Everything the coordinator and installers need is carried explicitly in
//! [`SyncContext`] rather than module-level state, so tests can construct a
//! fully isolated context and production code has one place where paths and
//! install behavior are decided.

pub mod loader;

pub use loader::ConfigLoader;

use crate::error::SyncError;
use crate::logging::LoggingConfig;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::cell::Cell;
use std::path::PathBuf;

/// Per-kind artifact filter.
///
/// A repository entry may restrict which discovered artifacts are kept.
/// The three shapes are mutually exclusive: the literal string `"all"`, an
/// include list, or an exclude list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactFilter {
    /// Keep every discovered artifact
    All,
    /// Keep only the listed names
    Include(Vec<String>),
    /// Keep everything except the listed names
    Exclude(Vec<String>),
}

impl Default for ArtifactFilter {
    fn default() -> Self {
        ArtifactFilter::All
    }
}

impl ArtifactFilter {
    /// Decide whether an artifact name passes this filter.
    pub fn allows(&self, name: &str) -> bool {
        match self {
            ArtifactFilter::All => true,
            ArtifactFilter::Include(names) => names.iter().any(|n| n == name),
            ArtifactFilter::Exclude(names) => !names.iter().any(|n| n == name),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FilterRepr {
    Word(String),
    Lists {
        #[serde(default)]
        include: Option<Vec<String>>,
        #[serde(default)]
        exclude: Option<Vec<String>>,
    },
}

impl<'de> Deserialize<'de> for ArtifactFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match FilterRepr::deserialize(deserializer)? {
            FilterRepr::Word(word) => {
                if word == "all" {
                    Ok(ArtifactFilter::All)
                } else {
                    Err(D::Error::custom(format!(
                        "filter must be \"all\", an include list, or an exclude list; got \"{}\"",
                        word
                    )))
                }
            }
            FilterRepr::Lists { include, exclude } => match (include, exclude) {
                (Some(_), Some(_)) => Err(D::Error::custom(
                    "filter cannot carry both include and exclude lists",
                )),
                (Some(names), None) => Ok(ArtifactFilter::Include(names)),
                (None, Some(names)) => Ok(ArtifactFilter::Exclude(names)),
                (None, None) => Err(D::Error::custom(
                    "filter must name an include or exclude list",
                )),
            },
        }
    }
}

impl Serialize for ArtifactFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        match self {
            ArtifactFilter::All => serializer.serialize_str("all"),
            ArtifactFilter::Include(names) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("include", names)?;
                map.end()
            }
            ArtifactFilter::Exclude(names) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("exclude", names)?;
                map.end()
            }
        }
    }
}

/// One configured artifact repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Git remote URL or local directory reference
    pub url: String,

    /// Branch, tag, or commit to check out; None means the remote default
    #[serde(default, rename = "ref")]
    pub r#ref: Option<String>,

    /// Skill filter
    #[serde(default)]
    pub skills: Option<ArtifactFilter>,

    /// Agent filter
    #[serde(default)]
    pub agents: Option<ArtifactFilter>,

    /// Command filter
    #[serde(default)]
    pub commands: Option<ArtifactFilter>,

    /// Plugin filter
    #[serde(default)]
    pub plugins: Option<ArtifactFilter>,

    /// Instruction filter
    #[serde(default)]
    pub instructions: Option<ArtifactFilter>,
}

impl RepositoryConfig {
    /// Minimal config for a URL with no ref and no filters.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            r#ref: None,
            skills: None,
            agents: None,
            commands: None,
            plugins: None,
            instructions: None,
        }
    }
}

/// Whether sync blocks host startup or runs in the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Host waits for sync to finish before continuing startup
    Blocking,
    /// Host continues startup while sync runs
    Background,
}

impl Default for SyncMode {
    fn default() -> Self {
        SyncMode::Blocking
    }
}

/// How artifacts are materialized into managed directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallMethod {
    /// Symlink target paths to their repository source
    Link,
    /// Copy source content into target paths
    Copy,
}

impl Default for InstallMethod {
    fn default() -> Self {
        InstallMethod::Link
    }
}

/// Sync behavior settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Blocking vs background sync
    #[serde(default)]
    pub mode: SyncMode,

    /// Symlink vs copy installation
    #[serde(default)]
    pub install_method: InstallMethod,

    /// Repository cache root; defaults to the platform cache directory
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Host skills directory; managed installs go to a subdirectory of it
    #[serde(default)]
    pub skills_dir: Option<PathBuf>,

    /// Host plugin directory; managed plugins are prefix-named files in it
    #[serde(default)]
    pub plugins_dir: Option<PathBuf>,
}

/// Top-level curator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CuratorConfig {
    /// Repositories to sync, in precedence order (first wins on collision)
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,

    /// Sync behavior
    #[serde(default)]
    pub sync: SyncSettings,

    /// Logging behavior
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Explicit context threaded through the coordinator and installers.
///
/// Replaces ambient module state: all managed paths, the install method,
/// and tool availability live here. `rsync_available` is probed once,
/// lazily; tests may pin it via [`SyncContext::override_rsync`].
#[derive(Debug)]
pub struct SyncContext {
    /// Root directory holding one working-copy subtree per repository
    pub cache_root: PathBuf,
    /// Host skills directory (user skills live directly under it)
    pub skills_root: PathBuf,
    /// Host plugin directory (flat; managed entries are prefix-named)
    pub plugins_dir: PathBuf,
    /// Symlink vs copy
    pub install_method: InstallMethod,
    rsync_available: Cell<Option<bool>>,
}

impl SyncContext {
    /// Build a context from settings, resolving default paths from the
    /// platform directories when not configured.
    pub fn from_settings(settings: &SyncSettings) -> Result<Self, SyncError> {
        let project_dirs = directories::ProjectDirs::from("", "curator", "curator")
            .ok_or_else(|| SyncError::Config("Could not determine platform directories".to_string()))?;
        let cache_root = settings
            .cache_dir
            .clone()
            .unwrap_or_else(|| project_dirs.cache_dir().join("repos"));
        let skills_root = settings
            .skills_dir
            .clone()
            .unwrap_or_else(|| project_dirs.data_dir().join("skills"));
        let plugins_dir = settings
            .plugins_dir
            .clone()
            .unwrap_or_else(|| project_dirs.data_dir().join("plugins"));
        Ok(Self {
            cache_root,
            skills_root,
            plugins_dir,
            install_method: settings.install_method,
            rsync_available: Cell::new(None),
        })
    }

    /// Context with explicit paths, used by tests and embedders.
    pub fn new(
        cache_root: PathBuf,
        skills_root: PathBuf,
        plugins_dir: PathBuf,
        install_method: InstallMethod,
    ) -> Self {
        Self {
            cache_root,
            skills_root,
            plugins_dir,
            install_method,
            rsync_available: Cell::new(None),
        }
    }

    /// Whether rsync can be used for mirror copies. Probed once per context.
    pub fn rsync_available(&self) -> bool {
        if let Some(cached) = self.rsync_available.get() {
            return cached;
        }
        let available = which::which("rsync").is_ok();
        self.rsync_available.set(Some(available));
        available
    }

    /// Pin rsync availability. Test-harness hook; production code probes.
    pub fn override_rsync(&self, available: bool) {
        self.rsync_available.set(Some(available));
    }
}
