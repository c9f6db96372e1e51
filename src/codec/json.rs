use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{CodecError, CollectionCodec};

/// JSON codec. This is the persisted wire format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        JsonCodec
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl CollectionCodec for JsonCodec {
    fn encode_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError> {
        serde_json::to_string(value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode_value<T: DeserializeOwned>(&self, blob: &str) -> Result<T, CodecError> {
        serde_json::from_str(blob).map_err(|e| CodecError::Decode(e.to_string()))
    }

    fn decode<R: DeserializeOwned>(&self, blob: &str) -> Result<Vec<R>, CodecError> {
        let value: Value =
            serde_json::from_str(blob).map_err(|e| CodecError::Decode(e.to_string()))?;
        if !value.is_array() {
            return Err(CodecError::NotASequence {
                found: describe(&value).to_string(),
            });
        }
        serde_json::from_value(value).map_err(|e| CodecError::Decode(e.to_string()))
    }
}
