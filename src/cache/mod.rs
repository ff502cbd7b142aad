//! Cache module for storing serializable values on disk
//!
//! Each value lives in its own file named `<prefix>.<key>.<expires_at>`. Keys
//! are normalized to a filesystem-safe alphabet, writes are atomic, and
//! expired files are swept lazily whenever their key is looked up.

mod async_manager;
mod codec;
mod entry;
mod error;
mod key;
mod lock;
mod manager;
mod sweep;

pub use async_manager::AsyncFileCache;
pub use codec::{Codec, JsonCodec};
pub use entry::EntryName;
pub use error::{CacheError, CodecError, Result};
pub use key::normalize_key;
pub use manager::FileCache;
