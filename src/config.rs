//! Configuration for opening a closet.
//!
//! ```json
//! {
//!   "store": { "write_policy": "write_then_commit", "id_strategy": "uuid" },
//!   "seed_default_categories": true,
//!   "data_dir": "./closet-data"
//! }
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::store::StoreOptions;

/// Categories created the first time a closet is opened.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Tops",
    "Bottoms",
    "Dresses",
    "Outerwear",
    "Shoes",
    "Accessories",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosetConfig {
    /// Options applied to every collection store.
    pub store: StoreOptions,
    /// Seed [`DEFAULT_CATEGORIES`] when the `categories` key is absent.
    pub seed_default_categories: bool,
    /// Directory for the file backend used by `Closet::open_dir`.
    pub data_dir: Option<PathBuf>,
}

impl Default for ClosetConfig {
    fn default() -> Self {
        Self {
            store: StoreOptions::default(),
            seed_default_categories: true,
            data_dir: None,
        }
    }
}

impl ClosetConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&contents)
    }

    pub fn with_store_options(mut self, store: StoreOptions) -> Self {
        self.store = store;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn without_seed(mut self) -> Self {
        self.seed_default_categories = false;
        self
    }
}

/// Error type for configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Read { path: PathBuf, message: String },
    Parse(String),
    /// A required setting is absent.
    Missing(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, message } => {
                write!(f, "failed to read config {}: {}", path.display(), message)
            }
            ConfigError::Parse(msg) => write!(f, "invalid config: {}", msg),
            ConfigError::Missing(setting) => write!(f, "missing config setting: {}", setting),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{IdStrategy, WritePolicy};

    #[test]
    fn empty_object_uses_defaults() {
        let config = ClosetConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ClosetConfig::default());
        assert!(config.seed_default_categories);
    }

    #[test]
    fn parses_store_options() {
        let config = ClosetConfig::from_json_str(
            r#"{
                "store": { "write_policy": "optimistic", "id_strategy": "sequential" },
                "seed_default_categories": false,
                "data_dir": "/tmp/closet"
            }"#,
        )
        .unwrap();
        assert_eq!(config.store.write_policy, WritePolicy::Optimistic);
        assert_eq!(config.store.id_strategy, IdStrategy::Sequential);
        assert!(!config.seed_default_categories);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/closet")));
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = ClosetConfig::from_json_str(r#"{"store":{"write_policy":"eventually"}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file() {
        let err = ClosetConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
