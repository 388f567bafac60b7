//! Secret loading for the completion client.
//!
//! Supports reading secrets from `~/.config/aivi/secret.json`, with the
//! `OPENAI_API_KEY` environment variable as a fallback.

use crate::gateway::GatewayError;
use aivi_infrastructure::AiviPaths;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Root configuration structure for secret.json
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub openai: Option<OpenAIConfig>,
}

/// OpenAI-compatible API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAIConfig {
    pub api_key: String,
    /// Overrides the base URL from config.toml
    #[serde(default)]
    pub base_url: Option<String>,
}

/// What the client needs to authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub base_url: Option<String>,
}

/// Loads the secret configuration file at `path`.
pub fn load_secret_config(path: &Path) -> Result<SecretConfig, String> {
    if !path.exists() {
        return Err(format!(
            "Configuration file not found at: {}",
            path.display()
        ));
    }

    let content = fs::read_to_string(path).map_err(|e| {
        format!(
            "Failed to read configuration file at {}: {}",
            path.display(),
            e
        )
    })?;

    serde_json::from_str(&content).map_err(|e| {
        format!(
            "Failed to parse configuration file at {}: {}",
            path.display(),
            e
        )
    })
}

/// Picks credentials: a non-empty key in secret.json wins over the
/// environment variable.
pub fn resolve_credentials(
    secret: Option<SecretConfig>,
    env_key: Option<String>,
) -> Result<Credentials, GatewayError> {
    if let Some(openai) = secret.and_then(|s| s.openai) {
        if !openai.api_key.trim().is_empty() {
            return Ok(Credentials {
                api_key: openai.api_key,
                base_url: openai.base_url,
            });
        }
    }
    env_key
        .filter(|key| !key.trim().is_empty())
        .map(|api_key| Credentials {
            api_key,
            base_url: None,
        })
        .ok_or_else(|| {
            GatewayError::MissingCredentials(format!(
                "{API_KEY_ENV} not found in ~/.config/aivi/secret.json or environment variables"
            ))
        })
}

/// Loads credentials from `~/.config/aivi/secret.json` or the environment.
pub fn load_credentials() -> Result<Credentials, GatewayError> {
    let secret = AiviPaths::secret_file()
        .ok()
        .and_then(|path| load_secret_config(&path).ok());
    resolve_credentials(secret, env::var(API_KEY_ENV).ok())
}
