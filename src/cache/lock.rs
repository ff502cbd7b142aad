//! Per-key advisory locks
//!
//! Writers take the key's lock file exclusively and readers take it shared,
//! so a sweep never races a write for the same key, even across processes.
//! Locks are released when the guard is dropped. A key that no longer has
//! entries gets its lock file deleted by the exclusive holder; anyone who
//! locked the unlinked file retries on the fresh one.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::trace;

use super::error::{CacheError, Result};

/// How a [`KeyLock`] holds its file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Any number of readers
    Shared,
    /// A single writer
    Exclusive,
}

/// Held advisory lock on a key's lock file
#[derive(Debug)]
pub struct KeyLock {
    file: File,
    path: PathBuf,
}

impl KeyLock {
    /// Blocks until the lock at `path` is acquired in `mode`
    ///
    /// The lock file is created if it does not exist; its contents are never
    /// touched.
    pub fn acquire(path: &Path, mode: LockMode) -> Result<Self> {
        loop {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(path)
                .map_err(|e| CacheError::io(path, e))?;

            let locked = match mode {
                LockMode::Shared => FileExt::lock_shared(&file),
                LockMode::Exclusive => FileExt::lock_exclusive(&file),
            };
            locked.map_err(|e| CacheError::io(path, e))?;

            // The previous holder may have unlinked the file while we waited
            if still_linked(&file, path)? {
                trace!(path = %path.display(), ?mode, "Acquired cache lock");
                return Ok(Self {
                    file,
                    path: path.to_path_buf(),
                });
            }
            trace!(path = %path.display(), "Lock file replaced while waiting, retrying");
        }
    }

    /// Deletes the lock file, then releases the lock
    ///
    /// Only call this while holding the lock exclusively.
    pub fn remove_file(self) {
        match fs::remove_file(&self.path) {
            Ok(()) => trace!(path = %self.path.display(), "Removed cache lock file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => trace!(path = %self.path.display(), error = %e, "Failed to remove cache lock file"),
        }
    }
}

impl Drop for KeyLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Whether `path` still names the open `file`
#[cfg(unix)]
fn still_linked(file: &File, path: &Path) -> Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let held = file.metadata().map_err(|e| CacheError::io(path, e))?;
    match fs::metadata(path) {
        Ok(current) => Ok(held.dev() == current.dev() && held.ino() == current.ino()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CacheError::io(path, e)),
    }
}

/// Whether `path` still names the open `file`
#[cfg(not(unix))]
fn still_linked(_file: &File, path: &Path) -> Result<bool> {
    match fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CacheError::io(path, e)),
    }
}
