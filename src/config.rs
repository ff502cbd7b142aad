//! Cache configuration
//!
//! Everything the cache needs to know about its environment is passed in at
//! construction through [`CacheConfig`].

use std::path::PathBuf;

use chrono::Duration;
use directories::ProjectDirs;

use crate::cache::normalize_key;

/// Default time-to-live in hours
pub const DEFAULT_TTL_HOURS: i64 = 8;

/// Default file name prefix for entries
pub const DEFAULT_PREFIX: &str = "filecache";

/// Configuration for a [`FileCache`](crate::FileCache)
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Directory holding the entry files
    pub dir: PathBuf,
    /// How long a written entry stays live
    pub ttl: Duration,
    /// Literal that starts every entry file name
    prefix: String,
}

impl Default for CacheConfig {
    /// Uses the XDG cache directory (`~/.cache/filecache/` on Linux), or the
    /// system temp directory when no home directory is available
    fn default() -> Self {
        let dir = ProjectDirs::from("", "", DEFAULT_PREFIX)
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(std::env::temp_dir);

        Self::new(dir)
    }
}

impl CacheConfig {
    /// Creates a configuration for `dir` with the default TTL and prefix
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ttl: Duration::hours(DEFAULT_TTL_HOURS),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    /// Sets the time-to-live
    ///
    /// A negative TTL writes entries that are already expired.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the file name prefix
    ///
    /// The prefix is normalized like a key so it cannot contain the `.`
    /// separator. A prefix with no usable characters leaves the current one
    /// in place.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        let prefix = normalize_key(prefix);
        if !prefix.is_empty() {
            self.prefix = prefix;
        }
        self
    }

    /// Literal that starts every entry file name, e.g. `filecache`
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = CacheConfig::new("/tmp/cache");
        assert_eq!(config.dir, PathBuf::from("/tmp/cache"));
        assert_eq!(config.ttl, Duration::hours(8));
        assert_eq!(config.prefix(), "filecache");
    }

    #[test]
    fn test_default_points_at_project_cache_dir() {
        let config = CacheConfig::default();
        let path_str = config.dir.to_string_lossy();
        // Falls back to the temp dir when there is no home directory (e.g. CI)
        assert!(path_str.contains("filecache") || config.dir == std::env::temp_dir());
    }

    #[test]
    fn test_prefix_is_normalized() {
        let config = CacheConfig::new("/tmp").with_prefix("my.app cache");
        assert_eq!(config.prefix(), "myappcache");
    }

    #[test]
    fn test_empty_prefix_is_ignored() {
        let config = CacheConfig::new("/tmp").with_prefix("...");
        assert_eq!(config.prefix(), DEFAULT_PREFIX);
    }

    #[test]
    fn test_with_ttl() {
        let config = CacheConfig::new("/tmp").with_ttl(Duration::minutes(5));
        assert_eq!(config.ttl, Duration::seconds(300));
    }
}
