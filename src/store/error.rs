use std::fmt;

use crate::backend::BackendError;
use crate::codec::CodecError;

/// Error type for collection store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend rejected a read or write (quota, unavailable medium, I/O).
    Backend(BackendError),
    /// The collection could not be serialized.
    Encode(CodecError),
    /// The stored blob does not decode as this collection. Nothing was loaded.
    Corrupt {
        collection: String,
        source: CodecError,
    },
    /// No record with this id.
    NotFound { collection: String, id: String },
    /// A caller-assigned id is already taken.
    DuplicateId { collection: String, id: String },
    /// The record has no boolean flag by this name.
    UnknownField { collection: String, field: String },
    LockPoisoned(&'static str),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Backend(err) => write!(f, "backend error: {}", err),
            StoreError::Encode(err) => write!(f, "collection encode failed: {}", err),
            StoreError::Corrupt { collection, source } => {
                write!(f, "collection {} is corrupt: {}", collection, source)
            }
            StoreError::NotFound { collection, id } => {
                write!(f, "record not found: {}:{}", collection, id)
            }
            StoreError::DuplicateId { collection, id } => {
                write!(f, "duplicate record id: {}:{}", collection, id)
            }
            StoreError::UnknownField { collection, field } => {
                write!(f, "collection {} has no boolean field {}", collection, field)
            }
            StoreError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Backend(err) => Some(err),
            StoreError::Encode(err) => Some(err),
            StoreError::Corrupt { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<BackendError> for StoreError {
    fn from(err: BackendError) -> Self {
        StoreError::Backend(err)
    }
}
