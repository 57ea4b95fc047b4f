//! Persistent settings for the bithide CLI.
//!
//! Stored in `~/.bithide/config.toml`. A missing file means defaults;
//! command-line flags always win over stored values.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::stego::Scheme;

/// Errors that can occur when loading or saving settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found. Unable to determine home directory.")]
    NoConfigDir,

    #[error("Unknown setting: {0}")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// CLI settings stored in TOML format.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Scheme used when `--scheme` is not given.
    #[serde(default)]
    pub default_scheme: Scheme,

    /// Log filter used when neither `--verbose` nor `RUST_LOG` is set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Allow writing stego images in lossy formats.
    #[serde(default)]
    pub allow_lossy_output: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_scheme: Scheme::default(),
            log_level: default_log_level(),
            allow_lossy_output: false,
        }
    }
}

impl Settings {
    /// Setting names accepted by [`Settings::set`].
    pub const KEYS: [&'static str; 3] = ["default_scheme", "log_level", "allow_lossy_output"];

    /// Load the settings from the default location.
    ///
    /// Returns defaults if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load the settings from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Save the settings to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save the settings to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        // Set restrictive permissions on config file (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Get the path to the settings file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(get_config_dir()?.join("config.toml"))
    }

    /// Update one setting from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "default_scheme" => self.default_scheme = value.parse().map_err(|_| invalid())?,
            "log_level" => {
                let level = value.trim().to_ascii_lowercase();
                if !matches!(level.as_str(), "error" | "warn" | "info" | "debug" | "trace" | "off") {
                    return Err(invalid());
                }
                self.log_level = level;
            }
            "allow_lossy_output" => self.allow_lossy_output = value.parse().map_err(|_| invalid())?,
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

/// Get the bithide config directory (`~/.bithide`).
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".bithide"))
        .ok_or(ConfigError::NoConfigDir)
}
