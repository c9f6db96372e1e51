//! InMemoryBackend - HashMap-backed stand-in for browser local storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use super::{BackendError, KeyValueBackend};

/// In-memory key-value backend.
///
/// Clone-friendly via Arc: clones share storage, which is how tests simulate a
/// process restart (drop the stores, build new ones over a clone).
///
/// An optional byte quota mirrors local storage limits (sum of key and value
/// lengths across all entries), and the medium can be switched off to exercise
/// write-failure paths.
#[derive(Clone)]
pub struct InMemoryBackend {
    storage: Arc<RwLock<HashMap<String, String>>>,
    available: Arc<AtomicBool>,
    quota: Option<usize>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    /// Create a new empty backend with no quota.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
            available: Arc::new(AtomicBool::new(true)),
            quota: None,
        }
    }

    /// Limit total stored bytes (keys plus values).
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Toggle availability. While unavailable every operation fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Total bytes currently stored.
    pub fn used_bytes(&self) -> usize {
        self.storage
            .read()
            .map(|s| s.iter().map(|(k, v)| k.len() + v.len()).sum())
            .unwrap_or(0)
    }

    /// Keys currently present, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.storage
            .read()
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), BackendError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BackendError::Unavailable("in-memory backend disabled".into()))
        }
    }
}

impl KeyValueBackend for InMemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        self.check_available()?;
        let storage = self
            .storage
            .read()
            .map_err(|_| BackendError::Unavailable("lock poisoned".into()))?;
        Ok(storage.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.check_available()?;
        let mut storage = self
            .storage
            .write()
            .map_err(|_| BackendError::Unavailable("lock poisoned".into()))?;

        if let Some(limit) = self.quota {
            let others: usize = storage
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > limit {
                return Err(BackendError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }

        storage.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.check_available()?;
        let mut storage = self
            .storage
            .write()
            .map_err(|_| BackendError::Unavailable("lock poisoned".into()))?;
        storage.remove(key);
        Ok(())
    }

    fn clear_all(&self) -> Result<(), BackendError> {
        self.check_available()?;
        let mut storage = self
            .storage
            .write()
            .map_err(|_| BackendError::Unavailable("lock poisoned".into()))?;
        storage.clear();
        Ok(())
    }
}
