//! On-disk entry naming
//!
//! An entry is a single file named `<prefix>.<key>.<expires_at>`, where
//! `expires_at` is Unix seconds. Neither the prefix nor the normalized key may
//! contain `.`, so the timestamp is always the third field.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::error::{CacheError, Result};

/// Field separator inside entry file names
const SEPARATOR: char = '.';

/// Parsed name of an entry file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryName {
    /// File name prefix shared by every entry of one cache
    pub prefix: String,
    /// Normalized key
    pub key: String,
    /// Expiration as Unix seconds
    pub expires_at: i64,
}

impl EntryName {
    /// Name for an entry of `key` expiring at `expires_at`, truncated to seconds
    pub fn new(prefix: &str, key: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            prefix: prefix.to_string(),
            key: key.to_string(),
            expires_at: expires_at.timestamp(),
        }
    }

    /// Parses an entry file name
    ///
    /// # Returns
    /// * `Ok(EntryName)` if the name has exactly three fields and the last one
    ///   is a base-10 integer
    /// * `Err(CacheError::Parse)` otherwise
    pub fn parse(file_name: &str) -> Result<Self> {
        let malformed = || CacheError::Parse(file_name.to_string());

        let mut fields = file_name.split(SEPARATOR);
        let (Some(prefix), Some(key), Some(ts), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(malformed());
        };
        if prefix.is_empty() || key.is_empty() {
            return Err(malformed());
        }
        let expires_at = ts.parse::<i64>().map_err(|_| malformed())?;

        Ok(Self {
            prefix: prefix.to_string(),
            key: key.to_string(),
            expires_at,
        })
    }

    /// Parses the file name component of a path
    pub fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| CacheError::Parse(path.display().to_string()))?;
        Self::parse(file_name)
    }

    /// Renders the file name, e.g. `filecache.user42.1767225600`
    pub fn file_name(&self) -> String {
        format!(
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.prefix, self.key, self.expires_at
        )
    }

    /// Full path of this entry inside `dir`
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }

    /// Whether the entry has expired at `now`
    ///
    /// An entry expiring exactly at `now` is still live.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now.timestamp()
    }
}

/// Glob pattern matching every entry for `key` inside `dir`
///
/// The directory part is escaped so paths containing `[`, `*` or `?` are
/// matched literally.
pub fn entry_pattern(dir: &Path, prefix: &str, key: &str) -> String {
    let dir = glob::Pattern::escape(&dir.to_string_lossy());
    let file = format!("{prefix}{SEPARATOR}{key}{SEPARATOR}*");
    Path::new(&dir).join(file).to_string_lossy().into_owned()
}

/// Path of the per-key advisory lock file
///
/// The leading dot keeps it out of [`entry_pattern`] matches.
pub fn lock_path(dir: &Path, prefix: &str, key: &str) -> PathBuf {
    dir.join(format!("{SEPARATOR}{prefix}{SEPARATOR}{key}{SEPARATOR}lock"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_name_layout() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let name = EntryName::new("filecache", "user42", at);
        assert_eq!(name.file_name(), "filecache.user42.1767225600");
        assert_eq!(
            name.path_in(Path::new("/var/cache/app")),
            PathBuf::from("/var/cache/app/filecache.user42.1767225600")
        );
    }

    #[test]
    fn test_parse_reads_third_field() {
        let name = EntryName::parse("filecache.user42.1767225600").unwrap();
        assert_eq!(name.prefix, "filecache");
        assert_eq!(name.key, "user42");
        assert_eq!(name.expires_at, 1767225600);
    }

    #[test]
    fn test_parse_accepts_negative_timestamp() {
        let name = EntryName::parse("filecache.old.-5").unwrap();
        assert_eq!(name.expires_at, -5);
    }

    #[test]
    fn test_parse_rejects_malformed_names() {
        for bad in [
            "filecache.user42",
            "filecache.user42.soon",
            "filecache.user42.123.bak",
            "filecache.user42.",
            "filecache..123",
            ".filecache.user42.lock",
            "",
        ] {
            assert!(
                matches!(EntryName::parse(bad), Err(CacheError::Parse(_))),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn test_from_path_uses_file_name_only() {
        // Dots in the directory must not shift the timestamp field
        let path = Path::new("/home/me/.cache/app.v2/filecache.k.42");
        let name = EntryName::from_path(path).unwrap();
        assert_eq!(name.key, "k");
        assert_eq!(name.expires_at, 42);
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc.timestamp_opt(1_000, 0).unwrap();
        let entry = |ts| EntryName {
            prefix: "filecache".into(),
            key: "k".into(),
            expires_at: ts,
        };
        assert!(entry(999).is_expired_at(now));
        assert!(!entry(1_000).is_expired_at(now));
        assert!(!entry(1_001).is_expired_at(now));
    }

    #[test]
    fn test_pattern_escapes_directory() {
        let pattern = entry_pattern(Path::new("/tmp/odd[dir]"), "filecache", "k");
        assert_eq!(pattern, "/tmp/odd[[]dir[]]/filecache.k.*");
        let compiled = glob::Pattern::new(&pattern).unwrap();
        assert!(compiled.matches("/tmp/odd[dir]/filecache.k.123"));
        assert!(!compiled.matches("/tmp/odd[dir]/filecache.k2.123"));
    }

    #[test]
    fn test_lock_file_is_not_an_entry() {
        let dir = Path::new("/tmp/cache");
        let lock = lock_path(dir, "filecache", "k");
        assert_eq!(lock, PathBuf::from("/tmp/cache/.filecache.k.lock"));
        let compiled = glob::Pattern::new(&entry_pattern(dir, "filecache", "k")).unwrap();
        assert!(!compiled.matches_path(&lock));
    }
}
