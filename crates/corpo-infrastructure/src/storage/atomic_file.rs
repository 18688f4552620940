//! Crash-safe text file replacement.
//!
//! A write lands in `.<name>.tmp` next to the target, is synced, then renamed
//! over it. Writers on the same path are serialized through an exclusive
//! `fs2` lock on `<name>.lock`. The lock file is never deleted, so every
//! writer locks the same inode.

use corpo_core::error::{CorpoError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AtomicFile {
    path: PathBuf,
}

impl AtomicFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file content, or `None` when the file does not exist.
    pub fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.error("read", e)),
        }
    }

    /// Replaces the content. Missing parent directories are created.
    pub fn write(&self, content: &str) -> Result<()> {
        let _guard = WriteGuard::lock(&self.path).map_err(|e| self.error("lock", e))?;

        let tmp_path = self.temp_path()?;
        let mut tmp = File::create(&tmp_path).map_err(|e| self.error("create temp file for", e))?;
        tmp.write_all(content.as_bytes())
            .and_then(|()| tmp.sync_all())
            .map_err(|e| self.error("write", e))?;
        drop(tmp);

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            self.error("replace", e)
        })
    }

    /// Deletes the file. A missing file is not an error.
    pub fn remove(&self) -> Result<()> {
        let _guard = WriteGuard::lock(&self.path).map_err(|e| self.error("lock", e))?;
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(self.error("remove", e)),
            _ => Ok(()),
        }
    }

    fn temp_path(&self) -> Result<PathBuf> {
        match (self.path.parent(), self.path.file_name()) {
            (Some(dir), Some(name)) => Ok(dir.join(format!(".{}.tmp", name.to_string_lossy()))),
            _ => Err(CorpoError::storage(format!(
                "{} is not a file path",
                self.path.display()
            ))),
        }
    }

    fn error(&self, action: &str, err: io::Error) -> CorpoError {
        CorpoError::storage(format!("Failed to {} {}: {}", action, self.path.display(), err))
    }
}

/// Holds the exclusive lock for the duration of a write. Closing the file
/// releases it.
struct WriteGuard {
    _file: File,
}

impl WriteGuard {
    fn lock(target: &Path) -> io::Result<Self> {
        let lock_path = target.with_extension("lock");
        if let Some(dir) = lock_path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        fs2::FileExt::lock_exclusive(&file)?;

        Ok(Self { _file: file })
    }
}
