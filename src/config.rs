use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_entries_dir")]
    pub entries_dir: String,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            entries_dir: default_entries_dir(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

// Default value functions
fn default_database_path() -> String {
    data_path_for_profile(utils::Profile::Prod, "journal.db")
}

fn default_entries_dir() -> String {
    data_path_for_profile(utils::Profile::Prod, "entries")
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

/// A path inside the profile's data directory, with a home-relative fallback
fn data_path_for_profile(profile: utils::Profile, name: &str) -> String {
    if let Some(data_dir) = utils::get_data_dir(profile) {
        data_dir.join(name).to_string_lossy().to_string()
    } else {
        match profile {
            utils::Profile::Dev => format!("~/.local/share/jnl-dev/{name}"),
            utils::Profile::Prod => format!("~/.local/share/jnl/{name}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
}

impl Config {
    /// Defaults for a profile, without touching the filesystem
    pub fn for_profile(profile: utils::Profile) -> Self {
        Self {
            database_path: data_path_for_profile(profile, "journal.db"),
            entries_dir: data_path_for_profile(profile, "entries"),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }

    /// Load configuration for a profile, or write the defaults if the file is missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            let config = Self::for_profile(profile);
            config.save_to_path(&config_path).inspect_err(|e| {
                tracing::error!(path = %config_path.display(), "failed to save config file: {}", e);
            })?;
            tracing::info!(path = %config_path.display(), "wrote default config");
            Ok(config)
        }
    }

    /// Load configuration from an explicit file. Missing keys fall back to defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// Save configuration to a file, creating the parent directory if needed
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let mut config = self.clone();
        config.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile).ok_or_else(|| {
            ConfigError::ConfigDirError("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get the expanded database path (with ~ expansion)
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }

    /// Get the expanded directory holding entry content files
    pub fn get_entries_dir(&self) -> PathBuf {
        utils::expand_path(&self.entries_dir)
    }
}
