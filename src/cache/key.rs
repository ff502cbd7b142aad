//! Key normalization
//!
//! Cache keys end up inside file names, so everything outside
//! `[A-Za-z0-9_-]` is dropped before a key touches the filesystem.

/// Returns true for characters allowed in a normalized key
fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Strips a raw key down to a filesystem-safe identifier
///
/// Removes every character that is not an ASCII letter, digit, underscore,
/// or hyphen. The kept characters stay in their original order, and the
/// function is idempotent.
///
/// # Example
/// ```
/// assert_eq!(filecache::normalize_key("user:42"), "user42");
/// ```
pub fn normalize_key(raw: &str) -> String {
    raw.chars().filter(|c| is_key_char(*c)).collect()
}
