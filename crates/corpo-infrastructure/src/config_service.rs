//! Configuration service implementation.
//!
//! Loads the client configuration from `config.toml` and applies the
//! `CORPO_*` environment overrides on top.

use crate::paths::CorpoPaths;
use crate::storage::AtomicFile;
use corpo_core::config::ClientConfig;
use corpo_core::error::{CorpoError, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: CorpoPaths,
}

impl ConfigService {
    pub fn new(paths: CorpoPaths) -> Self {
        Self { paths }
    }

    pub fn config_path(&self) -> Result<PathBuf> {
        Ok(self.paths.config_file()?)
    }

    /// Reads `config.toml` without overrides. A missing file yields the
    /// defaults; a file that does not parse is an error.
    pub fn load_file(&self) -> Result<ClientConfig> {
        let path = self.config_path()?;
        match AtomicFile::new(path.clone()).read()? {
            Some(content) => toml::from_str(&content).map_err(|e| {
                CorpoError::config(format!("Failed to parse {}: {}", path.display(), e))
            }),
            None => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                Ok(ClientConfig::default())
            }
        }
    }

    /// The effective configuration: file, then process environment.
    pub fn load(&self) -> Result<ClientConfig> {
        self.load_with(|key| std::env::var(key).ok())
    }

    /// Like [`ConfigService::load`] with an explicit variable lookup.
    pub fn load_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<ClientConfig> {
        self.load_file()?.with_overrides(lookup)
    }

    /// Directory for persisted client state, honoring `storage_dir`.
    pub fn storage_dir(&self, config: &ClientConfig) -> Result<PathBuf> {
        match &config.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(self.paths.storage_dir()?),
        }
    }

    /// Writes the default configuration. An existing file is left alone
    /// unless `force` is set.
    ///
    /// Returns the path and whether a file was written.
    pub fn init_default(&self, force: bool) -> Result<(PathBuf, bool)> {
        let path = self.config_path()?;
        if path.exists() && !force {
            return Ok((path, false));
        }
        let content = toml::to_string_pretty(&ClientConfig::default())?;
        AtomicFile::new(path.clone()).write(&content)?;
        tracing::info!(path = %path.display(), "wrote default configuration");
        Ok((path, true))
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new(CorpoPaths::new(None))
    }
}
