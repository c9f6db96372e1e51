use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{de::DeserializeOwned, Serialize};

use super::{CodecError, CollectionCodec};

/// Compact binary codec: `bitcode` payload, base64-armored so it fits string
/// backends.
///
/// bitcode is not self-describing, so records stored with this codec must not
/// use `#[serde(flatten)]` or `skip_serializing_if`. A sequence check comes
/// for free: the payload only decodes as the exact `Vec<R>` it was written as.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitcodeCodec;

impl BitcodeCodec {
    pub fn new() -> Self {
        BitcodeCodec
    }
}

impl CollectionCodec for BitcodeCodec {
    fn encode_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError> {
        let bytes = bitcode::serialize(value).map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(STANDARD.encode(bytes))
    }

    fn decode_value<T: DeserializeOwned>(&self, blob: &str) -> Result<T, CodecError> {
        let bytes = STANDARD
            .decode(blob.trim())
            .map_err(|e| CodecError::Decode(format!("invalid base64: {}", e)))?;
        bitcode::deserialize(&bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}
