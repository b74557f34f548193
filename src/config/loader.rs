//! Configuration loading: file sources plus environment overlay.

use super::CuratorConfig;
use config::{Config, ConfigError, Environment, File, FileFormat};
use std::path::Path;

/// Configuration loader facade.
///
/// Precedence: defaults (lowest) -> config file -> CURATOR_* environment
/// variables (highest). Nested keys use `__` in the environment, e.g.
/// `CURATOR_SYNC__INSTALL_METHOD=copy`.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the default location with environment overlay.
    ///
    /// The default file is `<config dir>/curator/config.toml`; a missing
    /// file yields defaults rather than an error.
    pub fn load() -> Result<CuratorConfig, ConfigError> {
        let mut builder = Config::builder();
        if let Some(project_dirs) = directories::ProjectDirs::from("", "curator", "curator") {
            let path = project_dirs.config_dir().join("config.toml");
            builder = builder.add_source(
                File::from(path).format(FileFormat::Toml).required(false),
            );
        }
        let builder = builder.add_source(
            Environment::with_prefix("CURATOR")
                .separator("__")
                .try_parsing(true),
        );
        builder.build()?.try_deserialize()
    }

    /// Load configuration from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<CuratorConfig, ConfigError> {
        let builder = Config::builder()
            .add_source(File::from(path.to_path_buf()))
            .add_source(
                Environment::with_prefix("CURATOR")
                    .separator("__")
                    .try_parsing(true),
            );
        builder.build()?.try_deserialize()
    }
}
