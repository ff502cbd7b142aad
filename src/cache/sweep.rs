//! Lazy expiry sweep
//!
//! There is no background task. Every lookup sweeps the files it matched:
//! expired ones are deleted, files whose names do not parse are skipped, and
//! the live ones are handed back to the caller.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, trace, warn};

use super::entry::EntryName;

/// A matched entry that survived the sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveEntry {
    pub path: PathBuf,
    pub name: EntryName,
}

/// Sweeps candidate entry files, deleting the expired ones
///
/// # Arguments
/// * `paths` - Files matched for a single key
/// * `now` - Reference time for expiry
///
/// # Returns
/// The live entries, in the order they were given
pub fn sweep<I>(paths: I, now: DateTime<Utc>) -> Vec<LiveEntry>
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut live = Vec::new();

    for path in paths {
        let name = match EntryName::from_path(&path) {
            Ok(name) => name,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unrecognized cache file");
                continue;
            }
        };

        if name.is_expired_at(now) {
            trace!(path = %path.display(), expires_at = name.expires_at, "Entry expired");
            remove_quietly(&path);
        } else {
            live.push(LiveEntry { path, name });
        }
    }

    live
}

/// Deletes a file, ignoring failures
///
/// A file that is already gone counts as removed.
pub fn remove_quietly(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => trace!(path = %path.display(), "Removed cache file"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => debug!(path = %path.display(), error = %e, "Failed to remove cache file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"{}").expect("Should create file");
        path
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_deletes_expired_and_keeps_live() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let expired = touch(temp_dir.path(), "filecache.x.100");
        let fresh = touch(temp_dir.path(), "filecache.x.300");

        let live = sweep(vec![expired.clone(), fresh.clone()], at(200));

        assert!(!expired.exists(), "Expired file should be deleted");
        assert!(fresh.exists(), "Live file should be kept");
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].path, fresh);
        assert_eq!(live[0].name.expires_at, 300);
    }

    #[test]
    fn test_skips_malformed_names_without_deleting() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let odd = touch(temp_dir.path(), "filecache.x.backup");
        let fresh = touch(temp_dir.path(), "filecache.x.300");

        let live = sweep(vec![odd.clone(), fresh.clone()], at(200));

        assert!(odd.exists(), "Foreign file should be left alone");
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].path, fresh);
    }

    #[test]
    fn test_already_missing_file_is_not_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let ghost = temp_dir.path().join("filecache.x.1");

        let live = sweep(vec![ghost], at(200));

        assert!(live.is_empty());
    }

    #[test]
    fn test_entry_expiring_now_is_live() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let edge = touch(temp_dir.path(), "filecache.x.200");

        let live = sweep(vec![edge.clone()], at(200));

        assert_eq!(live.len(), 1);
        assert!(edge.exists());
    }
}
