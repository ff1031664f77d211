//! Persisted user preferences.
//!
//! Preferences are layered with figment: compiled defaults, then
//! `config.toml` in the platform config directory, then `DUPAGENT_*`
//! environment variables. CLI flags override the result per field.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::scanner::{ScanOptions, DEFAULT_CHUNK_SIZE};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "DUPAGENT_";

/// File name of the configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Extensions scanned when the user does not choose any.
pub const DEFAULT_EXTENSIONS: [&str; 10] = [
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "webp", "svg", "ico", "raw",
];

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scan hidden files and descend into hidden directories.
    pub include_hidden: bool,
    /// Treat zero-byte files as candidates.
    pub include_empty: bool,
    /// Extension allow-list; empty scans every file.
    pub extensions: Vec<String>,
    /// Hasher read buffer in bytes.
    pub chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include_hidden: false,
            include_empty: false,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults on any error.
    #[must_use]
    pub fn load() -> Self {
        let path = Self::config_path().ok();
        match Self::load_from(path.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    /// Load with an explicit TOML file (if any) layered under the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a provider holds a value of the wrong type.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        Self::figment(path)
            .extract()
            .context("Invalid configuration")
    }

    /// Provider stack: defaults < TOML file < environment.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Save to the default location, returning the path written.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory is unknown or not writable.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save as TOML to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error on serialization or I/O failure.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Platform-specific configuration path.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "duplicateagent", "dupagent")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Scan policy derived from these preferences.
    #[must_use]
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions::default()
            .with_ignore_hidden(!self.include_hidden)
            .with_ignore_zero_byte(!self.include_empty)
            .with_extensions(&self.extensions)
            .with_chunk_size(self.chunk_size)
    }
}
