//! Client configuration model.

use crate::endpoints::DEFAULT_API_BASE_URL;
use crate::error::{CorpoError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_API_BASE_URL: &str = "CORPO_API_BASE_URL";
pub const ENV_STORAGE_DIR: &str = "CORPO_STORAGE_DIR";
pub const ENV_LOG_LEVEL: &str = "CORPO_LOG";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Directory for persisted client state. Defaults to the platform data
    /// directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            storage_dir: None,
            log_level: default_log_level(),
        }
    }
}

impl ClientConfig {
    /// Applies overrides from a variable lookup (the process environment in
    /// production) and normalizes the base URL.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(base_url) = non_empty(ENV_API_BASE_URL) {
            self.api_base_url = base_url;
        }
        if let Some(dir) = non_empty(ENV_STORAGE_DIR) {
            self.storage_dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = non_empty(ENV_LOG_LEVEL) {
            self.log_level = level;
        }

        self.api_base_url = normalize_base_url(&self.api_base_url)?;
        Ok(self)
    }
}

/// Trims whitespace and trailing slashes; requires an http(s) scheme and a
/// host.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(CorpoError::config("api_base_url must not be empty"));
    }
    let Some((scheme, remainder)) = trimmed.split_once("://") else {
        return Err(CorpoError::config(format!(
            "api_base_url '{}' must start with http:// or https://",
            raw
        )));
    };
    if scheme != "http" && scheme != "https" {
        return Err(CorpoError::config(format!(
            "api_base_url '{}' must start with http:// or https://",
            raw
        )));
    }
    if remainder.trim().is_empty() || remainder.starts_with('/') {
        return Err(CorpoError::config(format!(
            "api_base_url '{}' must include a host",
            raw
        )));
    }
    Ok(trimmed.to_string())
}
