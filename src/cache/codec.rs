//! Payload encoding
//!
//! The cache never looks inside payloads. A [`Codec`] turns values into bytes
//! and back; [`JsonCodec`] is the default.

use serde::{de::DeserializeOwned, Serialize};

use super::error::{CacheError, Result};

/// Encoder/decoder pair used for entry payloads
///
/// Implementations must decode whatever they encoded.
pub trait Codec: Send + Sync {
    /// Serializes a value into bytes
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;

    /// Deserializes bytes produced by [`Codec::encode`]
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// JSON codec backed by `serde_json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| CacheError::Encode(Box::new(e)))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| CacheError::Decode(Box::new(e)))
    }
}
