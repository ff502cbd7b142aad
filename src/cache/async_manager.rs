//! Async access to the file cache
//!
//! Cache operations block on filesystem I/O and advisory locks, so the async
//! wrapper moves each call onto tokio's blocking pool.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::task;

use super::codec::{Codec, JsonCodec};
use super::error::{CacheError, Result};
use super::manager::FileCache;

/// Async handle to a [`FileCache`]
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct AsyncFileCache<C = JsonCodec> {
    inner: Arc<FileCache<C>>,
}

impl<C> Clone for AsyncFileCache<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> From<FileCache<C>> for AsyncFileCache<C> {
    fn from(cache: FileCache<C>) -> Self {
        Self {
            inner: Arc::new(cache),
        }
    }
}

impl<C: Codec + 'static> AsyncFileCache<C> {
    /// Wraps a blocking cache for use from async code
    pub fn new(cache: FileCache<C>) -> Self {
        cache.into()
    }

    /// The wrapped blocking cache
    pub fn blocking(&self) -> &FileCache<C> {
        &self.inner
    }

    /// Async version of [`FileCache::set`]
    ///
    /// Takes the value by ownership since it is moved to another thread.
    pub async fn set<T>(&self, key: &str, value: T) -> Result<()>
    where
        T: Serialize + Send + 'static,
    {
        let cache = Arc::clone(&self.inner);
        let key = key.to_string();
        run(move || cache.set(&key, &value)).await
    }

    /// Async version of [`FileCache::get`]
    pub async fn get<T>(&self, key: &str) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let cache = Arc::clone(&self.inner);
        let key = key.to_string();
        run(move || cache.get(&key)).await
    }

    /// Async version of [`FileCache::remove`]
    pub async fn remove(&self, key: &str) -> Result<()> {
        let cache = Arc::clone(&self.inner);
        let key = key.to_string();
        run(move || cache.remove(&key)).await
    }
}

async fn run<F, R>(f: F) -> Result<R>
where
    F: FnOnce() -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|e| CacheError::Task(e.to_string()))?
}
