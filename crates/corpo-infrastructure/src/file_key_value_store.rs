//! Directory-backed key/value store.

use crate::storage::AtomicFile;
use corpo_core::error::{CorpoError, Result};
use corpo_core::storage::KeyValueStore;
use std::path::{Path, PathBuf};

/// Stores each key as `<dir>/<key>.json`.
///
/// Keys are fixed identifiers chosen by the client, so only ASCII
/// alphanumerics, `_` and `-` are accepted.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, key: &str) -> Result<AtomicFile> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(CorpoError::storage(format!("invalid storage key '{}'", key)));
        }
        Ok(AtomicFile::new(self.dir.join(format!("{}.json", key))))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.file_for(key)?.read()?)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let file = self.file_for(key)?;
        file.write(value)?;
        tracing::trace!(key, path = %file.path().display(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.file_for(key)?.remove()?;
        Ok(())
    }
}
