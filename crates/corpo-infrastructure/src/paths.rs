//! Unified path management for corpo configuration and client state.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/corpo/             # Config directory
//! └── config.toml              # Client configuration
//!
//! ~/.local/share/corpo/        # Data directory
//! └── storage/                 # Persisted client state, one JSON file per key
//!     ├── corpo_agent_token.json
//!     ├── corpo_agent_session.json
//!     └── corpo_agent_chat.json
//! ```
//!
//! A base path replaces both roots so everything lives under one directory.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "corpo";

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

impl From<PathError> for corpo_core::CorpoError {
    fn from(e: PathError) -> Self {
        corpo_core::CorpoError::config(e.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CorpoPaths {
    base_path: Option<PathBuf>,
}

impl CorpoPaths {
    /// Creates a path resolver. With `Some(base)`, every location is resolved
    /// under `base` instead of the platform directories.
    pub fn new(base_path: Option<&Path>) -> Self {
        Self {
            base_path: base_path.map(Path::to_path_buf),
        }
    }

    /// Returns the corpo configuration directory (e.g. `~/.config/corpo/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_path {
            Some(base) => Ok(base.join("config")),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    /// Returns the path to the main configuration file.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the default directory for persisted client state.
    pub fn storage_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_path {
            Some(base) => Ok(base.join("storage")),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR).join("storage"))
                .ok_or(PathError::HomeDirNotFound),
        }
    }
}
