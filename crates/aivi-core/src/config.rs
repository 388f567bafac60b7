//! User configuration model (`~/.config/aivi/config.toml`).
//!
//! Every field is optional; an empty file yields [`AiviConfig::default`].

use crate::merge::DEFAULT_COMMENT_PREFIX;
use crate::viewpoint::{Viewpoint, get_default_presets};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SESSION_FILE: &str = "quickai.txt";
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AiviConfig {
    /// File opened when no path is given on the command line.
    pub default_session: String,
    /// Line-comment prefix used for merge markers.
    pub comment_prefix: String,
    pub api: ApiConfig,
    #[serde(rename = "viewpoint", skip_serializing_if = "Vec::is_empty")]
    pub viewpoints: Vec<Viewpoint>,
}

impl Default for AiviConfig {
    fn default() -> Self {
        Self {
            default_session: DEFAULT_SESSION_FILE.to_string(),
            comment_prefix: DEFAULT_COMMENT_PREFIX.to_string(),
            api: ApiConfig::default(),
            viewpoints: Vec::new(),
        }
    }
}

impl AiviConfig {
    /// The configured catalogue, or the built-in presets when none is set.
    pub fn viewpoints_or_presets(&self) -> Vec<Viewpoint> {
        if self.viewpoints.is_empty() {
            get_default_presets()
        } else {
            self.viewpoints.clone()
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
