//! Configuration: optional TOML file plus environment override.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::export::SchemaVersion;

/// Environment variable holding the public API base URL.
pub const API_URL_ENV: &str = "ADDRSAMPLE_API_URL";

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Request timeout; unset means no timeout
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            user_agent: concat!("addrsample/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExportConfig {
    pub schema: SchemaVersion,
    pub out_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            schema: SchemaVersion::Structured,
            out_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Load from `path` if given, then apply the environment override.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.api.base_url = url;
        }
        config.api.base_url = trim_base_url(&config.api.base_url);
        Ok(config)
    }
}

/// Strip exactly one trailing slash.
pub fn trim_base_url(url: &str) -> String {
    url.strip_suffix('/').unwrap_or(url).to_string()
}
