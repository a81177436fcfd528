//! Value <-> text codecs

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::CodecError;

/// Paired serialize/deserialize for a persisted value
///
/// Implementations must satisfy `deserialize(serialize(v)) == v`.
pub trait Codec<T> {
    fn serialize(&self, value: &T) -> Result<String, CodecError>;
    fn deserialize(&self, text: &str) -> Result<T, CodecError>;
}

/// Default codec: JSON via serde_json
#[derive(Debug)]
pub struct JsonCodec<T>(PhantomData<fn() -> T>);

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T: Serialize + DeserializeOwned> Codec<T> for JsonCodec<T> {
    fn serialize(&self, value: &T) -> Result<String, CodecError> {
        serde_json::to_string(value).map_err(|e| CodecError::Encode(Box::new(e)))
    }

    fn deserialize(&self, text: &str) -> Result<T, CodecError> {
        serde_json::from_str(text).map_err(|e| CodecError::Decode(Box::new(e)))
    }
}

/// Codec built from a pair of functions
pub struct FnCodec<T> {
    encode: Box<dyn Fn(&T) -> Result<String, CodecError>>,
    decode: Box<dyn Fn(&str) -> Result<T, CodecError>>,
}

impl<T> FnCodec<T> {
    pub fn new(
        encode: impl Fn(&T) -> Result<String, CodecError> + 'static,
        decode: impl Fn(&str) -> Result<T, CodecError> + 'static,
    ) -> Self {
        Self {
            encode: Box::new(encode),
            decode: Box::new(decode),
        }
    }
}

impl<T> Codec<T> for FnCodec<T> {
    fn serialize(&self, value: &T) -> Result<String, CodecError> {
        (self.encode)(value)
    }

    fn deserialize(&self, text: &str) -> Result<T, CodecError> {
        (self.decode)(text)
    }
}
