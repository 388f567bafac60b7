//! Unified path management for aivi configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/aivi/
//! ├── config.toml     # Viewpoints, comment prefix, API settings
//! ├── secret.json     # API keys
//! └── logs/           # Daily rolling logs
//!     └── aivi.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "aivi";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

pub struct AiviPaths;

impl AiviPaths {
    /// Returns the aivi configuration directory (e.g. `~/.config/aivi/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Keep this file at mode 600.
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secret.json"))
    }

    pub fn logs_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("logs"))
    }
}
