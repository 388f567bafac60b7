use crate::paths::AiviPaths;
use aivi_core::config::AiviConfig;
use aivi_core::{AiviError, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Loads the configuration at `path`.
///
/// A missing or empty file yields the defaults. A file that exists but does
/// not parse is an error: startup should stop rather than silently ignore a
/// broken catalogue.
pub fn load_config(path: &Path) -> Result<AiviConfig> {
    if !path.exists() {
        debug!("No config file at {:?}, using defaults", path);
        return Ok(AiviConfig::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| AiviError::io(format!("Failed to read config file at {:?}: {}", path, e)))?;

    if content.trim().is_empty() {
        return Ok(AiviConfig::default());
    }

    let config: AiviConfig = toml::from_str(&content)
        .map_err(|e| AiviError::config(format!("Failed to parse TOML from {:?}: {}", path, e)))?;
    info!(
        "Loaded config from {:?} ({} viewpoints)",
        path,
        config.viewpoints.len()
    );
    Ok(config)
}

/// Loads `~/.config/aivi/config.toml`.
///
/// When no config directory can be resolved the defaults are used.
pub fn load_user_config() -> Result<AiviConfig> {
    match AiviPaths::config_file() {
        Ok(path) => load_config(&path),
        Err(_) => Ok(AiviConfig::default()),
    }
}
