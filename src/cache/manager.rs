//! File cache for persisting serializable values to disk
//!
//! Provides a `FileCache` that stores each value in its own file whose name
//! carries the key and the expiry timestamp, e.g.
//! `filecache.user42.1767225600`. Expired files are deleted lazily by lookups.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use super::codec::{Codec, JsonCodec};
use super::entry::{entry_pattern, lock_path, EntryName};
use super::error::{CacheError, Result};
use super::key::normalize_key;
use super::lock::{KeyLock, LockMode};
use super::sweep::{remove_quietly, sweep};
use crate::config::CacheConfig;

/// Reads and writes cached values on disk
///
/// Each key maps to at most one live file in the cache directory. Writes go
/// through a temp file and an atomic rename, and each key is guarded by an
/// advisory lock file, so concurrent readers never see a half-written entry.
///
/// Cloning is cheap; clones share the same directory.
#[derive(Debug, Clone)]
pub struct FileCache<C = JsonCodec> {
    config: CacheConfig,
    codec: C,
}

impl FileCache<JsonCodec> {
    /// Creates a FileCache in the XDG-compliant cache directory
    ///
    /// Uses `~/.cache/filecache/` on Linux, or the equivalent on other
    /// platforms, with the default 8 hour TTL.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a FileCache with a custom cache directory
    ///
    /// Useful for testing or when a specific cache location is needed.
    pub fn with_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self::with_config(CacheConfig::new(cache_dir))
    }

    /// Creates a FileCache from a full configuration, using the JSON codec
    pub fn with_config(config: CacheConfig) -> Self {
        Self::with_codec(config, JsonCodec)
    }
}

impl Default for FileCache<JsonCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec> FileCache<C> {
    /// Creates a FileCache that encodes payloads with `codec`
    pub fn with_codec(config: CacheConfig, codec: C) -> Self {
        Self { config, codec }
    }

    /// Configuration this cache was built with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Directory where cache files are stored
    pub fn dir(&self) -> &Path {
        &self.config.dir
    }

    /// Stores `value` under `key`, replacing any previous entry
    ///
    /// # Arguments
    /// * `key` - Raw key; characters outside `[A-Za-z0-9_-]` are dropped
    /// * `value` - The data to cache
    ///
    /// # Returns
    /// * `Ok(())` once exactly one entry for the key holds the new payload
    /// * `Err(CacheError::Encode)` if the value cannot be serialized
    /// * `Err(CacheError::Io)` if the directory, lock or file write fails
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let started = Instant::now();
        let key = self.normalize(key)?;

        // Encode up front so a bad value leaves the existing entry in place
        let payload = self.codec.encode(value)?;

        self.ensure_dir()?;
        let _lock = self.lock(&key, LockMode::Exclusive)?;

        self.clean(&key);

        let name = EntryName::new(self.config.prefix(), &key, self.expiry_from(Utc::now()));
        let path = name.path_in(self.dir());
        self.write_atomic(&path, &payload)?;

        debug!(key = %key, expires_at = name.expires_at, elapsed = ?started.elapsed(), "Set cache entry");
        Ok(())
    }

    /// Reads the live value stored under `key`
    ///
    /// Every file matched for the key is swept first, so expired entries are
    /// deleted and never returned. When more than one live entry exists, the
    /// one with the latest expiry wins. A miss leaves the directory as it was,
    /// apart from deleting expired entries.
    ///
    /// # Returns
    /// * `Ok(T)` with the decoded value
    /// * `Err(CacheError::NotFound)` if no live entry exists
    /// * `Err(CacheError::Decode)` if the stored bytes are not a valid `T`
    /// * `Err(CacheError::Io)` if the entry disappeared or could not be read
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let started = Instant::now();
        let key = self.normalize(key)?;

        if !self.dir().is_dir() || self.matching_files(&key)?.is_empty() {
            return Err(CacheError::NotFound(key));
        }

        let lock = self.lock(&key, LockMode::Shared)?;
        let files = self.matching_files(&key)?;
        let newest = sweep(files, Utc::now())
            .into_iter()
            .max_by_key(|entry| entry.name.expires_at);

        let Some(newest) = newest else {
            drop(lock);
            self.release_if_empty(&key)?;
            return Err(CacheError::NotFound(key));
        };

        let value = self.read_entry(&newest.path)?;

        debug!(key = %key, elapsed = ?started.elapsed(), "Get cache entry");
        Ok(value)
    }

    /// Deletes every entry stored under `key`
    ///
    /// Removing a key that has no entries is not an error.
    pub fn remove(&self, key: &str) -> Result<()> {
        let key = self.normalize(key)?;

        if !self.dir().is_dir() {
            return Ok(());
        }
        let lock = self.lock(&key, LockMode::Exclusive)?;
        self.clean(&key);
        lock.remove_file();

        debug!(key = %key, "Removed cache entries");
        Ok(())
    }

    fn normalize(&self, raw: &str) -> Result<String> {
        let key = normalize_key(raw);
        if key.is_empty() {
            return Err(CacheError::InvalidKey(raw.to_string()));
        }
        Ok(key)
    }

    /// Expiry for an entry written at `now`, clamped to the representable range
    fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let ttl = self.config.ttl;
        now.checked_add_signed(ttl).unwrap_or(if ttl < Duration::zero() {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
    }

    /// Reads and decodes the entry at `path`
    ///
    /// An entry deleted between lookup and read is an I/O error, not a miss.
    fn read_entry<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let bytes = fs::read(path).map_err(|e| CacheError::io(path, e))?;
        self.codec.decode(&bytes)
    }

    /// Deletes the key's lock file when no entries are left for it
    fn release_if_empty(&self, key: &str) -> Result<()> {
        let lock = self.lock(key, LockMode::Exclusive)?;
        if self.matching_files(key)?.is_empty() {
            lock.remove_file();
        }
        Ok(())
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(self.dir()).map_err(|e| CacheError::io(self.dir(), e))
    }

    fn lock(&self, key: &str, mode: LockMode) -> Result<KeyLock> {
        KeyLock::acquire(&lock_path(self.dir(), self.config.prefix(), key), mode)
    }

    /// Lists every entry file for `key`, in directory order
    fn matching_files(&self, key: &str) -> Result<Vec<PathBuf>> {
        let pattern = entry_pattern(self.dir(), self.config.prefix(), key);
        let paths = glob::glob(&pattern).map_err(|_| CacheError::NotFound(key.to_string()))?;
        Ok(paths.filter_map(|p| p.ok()).collect())
    }

    /// Deletes all entry files for `key`, ignoring failures
    fn clean(&self, key: &str) {
        for path in self.matching_files(key).unwrap_or_default() {
            remove_quietly(&path);
        }
    }

    /// Writes `payload` to a temp file beside `path`, then renames it into place
    fn write_atomic(&self, path: &Path, payload: &[u8]) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(self.dir()).map_err(|e| CacheError::io(self.dir(), e))?;
        tmp.write_all(payload)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| CacheError::io(tmp.path(), e))?;
        tmp.persist(path).map_err(|e| CacheError::io(path, e.error))?;
        Ok(())
    }
}
