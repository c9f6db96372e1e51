//! Durable key-value backends.
//!
//! A backend is an opaque string-keyed blob store: the browser's local
//! storage in the original front-end, a directory of files or an in-memory
//! map here. Stores only ever see this trait, so the medium can be swapped
//! without touching collection logic.

mod file;
mod in_memory;

use std::fmt;
use std::sync::Arc;

/// Opaque string-keyed get/set/remove over a persistent medium.
///
/// No transactionality across keys. `get` on a missing key is `Ok(None)`;
/// write failures are always reported to the caller.
pub trait KeyValueBackend: Send + Sync {
    /// Read the blob stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Store `value` under `key`, replacing any previous blob.
    fn set(&self, key: &str, value: &str) -> Result<(), BackendError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), BackendError>;

    /// Remove every key owned by this backend.
    fn clear_all(&self) -> Result<(), BackendError>;
}

impl<B: KeyValueBackend + ?Sized> KeyValueBackend for Arc<B> {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        (**self).remove(key)
    }

    fn clear_all(&self) -> Result<(), BackendError> {
        (**self).clear_all()
    }
}

impl<B: KeyValueBackend + ?Sized> KeyValueBackend for &B {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        (**self).remove(key)
    }

    fn clear_all(&self) -> Result<(), BackendError> {
        (**self).clear_all()
    }
}

/// Error type for backend operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The storage medium cannot be reached (disabled, detached, locked down).
    Unavailable(String),
    /// The write would exceed the medium's capacity.
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },
    /// The key cannot be represented on this medium.
    InvalidKey(String),
    /// Underlying I/O failure.
    Io(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Unavailable(msg) => write!(f, "storage unavailable: {}", msg),
            BackendError::QuotaExceeded { key, needed, limit } => write!(
                f,
                "storage quota exceeded writing {} ({} bytes needed, limit {})",
                key, needed, limit
            ),
            BackendError::InvalidKey(key) => write!(f, "invalid storage key: {:?}", key),
            BackendError::Io(msg) => write!(f, "storage I/O error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::Io(err.to_string())
    }
}

pub use file::FileBackend;
pub use in_memory::InMemoryBackend;
