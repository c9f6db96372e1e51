use serde::{Deserialize, Serialize};

/// When a mutation becomes visible in memory relative to the backend write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Write the new blob first; commit to memory only if it succeeds.
    #[default]
    WriteThenCommit,
    /// Commit to memory first, then write. A failed write leaves memory ahead
    /// of the backend (the error is still returned).
    Optimistic,
}

/// How store-assigned ids are generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Random v4 UUID.
    #[default]
    Uuid,
    /// `<unix millis>-<counter>`. Sortable by creation, unique within a store.
    Sequential,
}

/// Per-store behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    pub write_policy: WritePolicy,
    pub id_strategy: IdStrategy,
}

impl StoreOptions {
    pub fn with_write_policy(mut self, write_policy: WritePolicy) -> Self {
        self.write_policy = write_policy;
        self
    }

    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }
}
