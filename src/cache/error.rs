use std::path::PathBuf;
use thiserror::Error;

/// Boxed error produced by a [`Codec`](super::Codec)
pub type CodecError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur when reading or writing cache entries
#[derive(Debug, Error)]
pub enum CacheError {
    /// The value could not be serialized
    #[error("Failed to encode cache value: {0}")]
    Encode(#[source] CodecError),

    /// Stored bytes could not be decoded as the requested type
    #[error("Failed to decode cache entry: {0}")]
    Decode(#[source] CodecError),

    /// Filesystem operation failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No live entry exists for the key
    #[error("No cache entry found for key '{0}'")]
    NotFound(String),

    /// An entry file name has no well-formed expiration timestamp
    #[error("Malformed cache file name: '{0}'")]
    Parse(String),

    /// The key is empty after normalization
    #[error("Invalid cache key: '{0}' contains no usable characters")]
    InvalidKey(String),

    /// A blocking cache task did not complete
    #[error("Cache task failed: {0}")]
    Task(String),
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether callers should treat this error as a cache miss and regenerate
    /// the value
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::NotFound(_) | CacheError::Decode(_))
    }
}

/// Result alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
