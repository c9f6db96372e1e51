// Lets `#[derive(Record)]` expand to `::closet_store::...` inside this crate too.
extern crate self as closet_store;

pub mod backend;
pub mod closet;
pub mod codec;
mod config;
pub mod notify;
pub mod record;
pub mod store;
pub mod views;

pub use backend::{BackendError, FileBackend, InMemoryBackend, KeyValueBackend};
pub use closet::{Closet, ClosetError, UserSession};
pub use codec::{BitcodeCodec, CodecError, CollectionCodec, JsonCodec};
pub use config::{ClosetConfig, ConfigError, DEFAULT_CATEGORIES};
pub use notify::{ChangeEvent, ChangeKind, ChangeNotifier, Subscription};
pub use record::{AsField, FieldValue, Record, Timestamp};
pub use store::{
    Clock, IdStrategy, LocalCollectionStore, ManualClock, StoreError, StoreOptions, SystemClock,
    WritePolicy,
};
pub use views::{aggregate_count, filter_by_field, filter_by_text, group_by, sort_by, SortDirection};

// Derive macro shares the trait's name, same as serde's Serialize.
pub use closet_store_macros::Record;

#[cfg(feature = "emitter")]
pub use notify::EmitterBridge;

// Re-export the EventEmitter so bridge users don't need a direct dependency
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
