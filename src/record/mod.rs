//! Records - the typed values a collection holds.
//!
//! Most record types derive their impl:
//!
//! ```ignore
//! use closet_store::{Record, Timestamp};
//!
//! #[derive(Clone, Debug, Default, Serialize, Deserialize, Record)]
//! #[serde(rename_all = "camelCase", default)]
//! #[record(collection = "outfits")]
//! pub struct Outfit {
//!     pub id: String,
//!     pub name: String,
//!     #[record(created_at)]
//!     pub created_at: Timestamp,
//!     #[record(updated_at)]
//!     pub updated_at: Timestamp,
//! }
//! ```

mod field;
pub mod timestamp;

use serde::{de::DeserializeOwned, Serialize};

pub use field::{AsField, FieldValue};

/// An instant as persisted in `createdAt` / `updatedAt`.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Trait for types that can live in a collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Default + Send + Sync + 'static {
    /// Backend key the collection is stored under (e.g. "closetItems").
    const COLLECTION: &'static str;

    /// Field-level partial update. Only provided fields change.
    type Patch: Default + Clone + Send;

    /// Returns the unique identifier for this record.
    fn id(&self) -> &str;

    /// Assigns the identifier. Only the store calls this, at creation.
    fn set_id(&mut self, id: String);

    /// Merge a patch into this record.
    fn apply(&mut self, patch: Self::Patch);

    /// Creation instant, for records that track timestamps.
    fn created_at(&self) -> Option<Timestamp> {
        None
    }

    /// Stamp a freshly created record (`createdAt == updatedAt == now`).
    fn stamp_created(&mut self, _now: Timestamp) {}

    /// Refresh `updatedAt` after an update.
    fn stamp_updated(&mut self, _now: Timestamp) {}

    /// Read a boolean flag by name.
    fn flag(&self, _field: &str) -> Option<bool> {
        None
    }

    /// Write a boolean flag by name. Returns false when there is no such flag.
    fn set_flag(&mut self, _field: &str, _value: bool) -> bool {
        false
    }

    /// Read a field by name for derived views.
    fn field(&self, _name: &str) -> Option<FieldValue<'_>> {
        None
    }
}
