//! filecache
//!
//! A minimal on-disk cache: store any serializable value under a string key,
//! read it back later, and let it expire after a time-to-live.
//!
//! ```no_run
//! use filecache::FileCache;
//!
//! let cache = FileCache::with_dir("/tmp/my-app");
//! cache.set("user:42", &vec!["a", "b"])?;
//! let names: Vec<String> = cache.get("user:42")?;
//! # Ok::<(), filecache::CacheError>(())
//! ```

pub mod cache;
pub mod config;

pub use cache::{
    normalize_key, AsyncFileCache, CacheError, Codec, CodecError, EntryName, FileCache,
    JsonCodec, Result,
};
pub use config::{CacheConfig, DEFAULT_PREFIX, DEFAULT_TTL_HOURS};
