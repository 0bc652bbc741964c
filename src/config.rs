use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cache::metadata::Resource;
use crate::core::scanner::FailurePolicy;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Remote URL templates and cache directory names for each resource kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointConfig {
    #[serde(default = "Resource::track")]
    pub track: Resource,
    #[serde(default = "Resource::album")]
    pub album: Resource,
    #[serde(default = "default_cover_dir")]
    pub cover_dir: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            track: Resource::track(),
            album: Resource::album(),
            cover_dir: default_cover_dir(),
        }
    }
}

fn default_cover_dir() -> String {
    "img".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_user_agent() -> String {
    concat!("bili-tagger/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BatchConfig {
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".config")
        .join("bili-tagger")
        .join("config.toml")
}

/// Loads `~/.config/bili-tagger/config.toml`, falling back to defaults.
pub fn load_config() -> Config {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("cannot read {}: {e}, using defaults", path.display());
            return Config::default();
        }
    };
    toml::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!("invalid config {}: {e}, using defaults", path.display());
        Config::default()
    })
}
