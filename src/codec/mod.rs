//! Collection codecs - records to and from a single string blob.

mod bitcode_codec;
mod json;

use serde::{de::DeserializeOwned, Serialize};
use std::fmt;

/// Serializes an ordered sequence of records to one blob and back.
///
/// Implementations must reject a blob that is not a sequence instead of
/// letting a type confusion through.
pub trait CollectionCodec: Send + Sync {
    /// Encode any serializable value.
    fn encode_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError>;

    /// Decode any value.
    fn decode_value<T: DeserializeOwned>(&self, blob: &str) -> Result<T, CodecError>;

    /// Encode an ordered collection.
    fn encode<R: Serialize>(&self, records: &[R]) -> Result<String, CodecError> {
        self.encode_value(records)
    }

    /// Decode an ordered collection, preserving order.
    fn decode<R: DeserializeOwned>(&self, blob: &str) -> Result<Vec<R>, CodecError> {
        self.decode_value(blob)
    }
}

/// Error type for codec operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Value could not be serialized.
    Encode(String),
    /// Blob is malformed or does not match the record shape.
    Decode(String),
    /// Blob parsed, but its top level is not a sequence.
    NotASequence { found: String },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Encode(msg) => write!(f, "encode error: {}", msg),
            CodecError::Decode(msg) => write!(f, "decode error: {}", msg),
            CodecError::NotASequence { found } => {
                write!(f, "decode error: expected a sequence, found {}", found)
            }
        }
    }
}

impl std::error::Error for CodecError {}

pub use bitcode_codec::BitcodeCodec;
pub use json::JsonCodec;
