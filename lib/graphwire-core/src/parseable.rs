//! Turning raw bytes into typed values.
//!
//! [`Parseable`] decouples the pipeline from any decoding technology: the bytes
//! go through a pluggable [`FlexibleDecoder`].

use serde::de::DeserializeOwned;

use crate::{Error, GraphQLResult, Result};

/// A decoder able to turn raw bytes into any deserializable shape.
pub trait FlexibleDecoder: Send + Sync {
    /// Decode raw bytes into `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes do not match `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T>;
}

/// JSON decoder with path-aware error messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl FlexibleDecoder for JsonDecoder {
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T> {
        crate::from_json(data)
    }
}

/// A type that can be built from raw bytes with a [`FlexibleDecoder`].
pub trait Parseable: Sized {
    /// Build a value from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails or the type cannot be built from bytes.
    fn parse<D: FlexibleDecoder>(data: &[u8], decoder: &D) -> Result<Self>;
}

impl<T: DeserializeOwned> Parseable for T {
    fn parse<D: FlexibleDecoder>(data: &[u8], decoder: &D) -> Result<Self> {
        decoder.decode(data)
    }
}

// Results are assembled by a parsing stage from already-decoded parts.
impl<Data> Parseable for GraphQLResult<Data> {
    fn parse<D: FlexibleDecoder>(_data: &[u8], _decoder: &D) -> Result<Self> {
        Err(Error::UnsupportedInitializer)
    }
}
