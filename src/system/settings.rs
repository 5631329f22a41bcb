use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::paths::{self, PathError};

/// Failures loading `settings.toml`.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The config directory could not be found or created.
    #[error("Could not locate the settings file: {0}")]
    Location(#[from] PathError),
    /// The file exists but could not be read.
    #[error("Could not read settings at '{path}': {source}")]
    Read {
        /// Path of the settings file.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid settings TOML.
    #[error("Invalid settings in '{path}': {source}")]
    Parse {
        /// Path of the settings file.
        path: String,
        /// The TOML error.
        #[source]
        source: toml::de::Error,
    },
}

/// Result alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// User settings from `settings.toml`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// UI definition file (or fragment directory) used when none is given.
    pub ui_file: Option<String>,
    /// Where compiled templates are cached. Defaults to the platform cache dir.
    pub cache_dir: Option<String>,
    /// Whether compiled templates are cached at all.
    pub cache: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ui_file: None,
            cache_dir: None,
            cache: true,
        }
    }
}

impl Settings {
    /// Loads the settings file from the config directory. A missing file
    /// yields the defaults.
    pub fn load() -> SettingsResult<Self> {
        let path = paths::settings_path()?;
        if !path.exists() {
            log::debug!("No settings at '{}'; using defaults.", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path).map_err(|e| SettingsError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// Parses settings from TOML text. `origin` names the text in errors.
    pub fn from_toml_str(content: &str, origin: &str) -> SettingsResult<Self> {
        toml::from_str(content).map_err(|e| SettingsError::Parse {
            path: origin.to_string(),
            source: e,
        })
    }

    /// The configured UI file, with `~` and variables expanded.
    pub fn ui_file(&self) -> Option<PathBuf> {
        self.ui_file.as_deref().map(paths::expand_user_path)
    }

    /// The configured cache directory, with `~` and variables expanded.
    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir.as_deref().map(paths::expand_user_path)
    }
}
