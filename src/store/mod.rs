//! Local collection store - one typed, ordered collection kept in memory and
//! written through to a single backend key.
//!
//! ## Example
//!
//! ```ignore
//! use closet_store::{InMemoryBackend, LocalCollectionStore};
//!
//! let store = LocalCollectionStore::<ClothingItem, _>::new(InMemoryBackend::new());
//! let shirt = store.create(ClothingItemPatch::default().name("White T-Shirt"))?;
//! store.toggle_field(&shirt.id, "needsWashing")?;
//! let all = store.get_all()?;
//! ```

mod clock;
mod error;
mod ids;
mod options;

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::backend::KeyValueBackend;
use crate::codec::{CollectionCodec, JsonCodec};
use crate::notify::{ChangeEvent, ChangeKind, ChangeNotifier};
use crate::record::Record;

use ids::IdGenerator;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::StoreError;
pub use options::{IdStrategy, StoreOptions, WritePolicy};

/// The single writer for one collection.
///
/// The collection is loaded lazily on first use. Every mutation holds the
/// write lock across encode, backend write and commit, so mutations complete
/// in invocation order and later reads see them. Change notifications fire
/// after the lock is released.
pub struct LocalCollectionStore<R, B, C = JsonCodec> {
    key: String,
    backend: B,
    codec: C,
    notifier: ChangeNotifier,
    options: StoreOptions,
    clock: Arc<dyn Clock>,
    ids: IdGenerator,
    state: RwLock<Option<Vec<R>>>,
}

impl<R: Record, B: KeyValueBackend> LocalCollectionStore<R, B, JsonCodec> {
    /// Store for `R::COLLECTION` over `backend`, JSON-encoded.
    pub fn new(backend: B) -> Self {
        let options = StoreOptions::default();
        Self {
            key: R::COLLECTION.to_string(),
            backend,
            codec: JsonCodec,
            notifier: ChangeNotifier::new(),
            options,
            clock: Arc::new(SystemClock),
            ids: IdGenerator::new(options.id_strategy),
            state: RwLock::new(None),
        }
    }
}

impl<R: Record, B: KeyValueBackend, C: CollectionCodec> LocalCollectionStore<R, B, C> {
    /// Use a different backend key than `R::COLLECTION`.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_codec<C2: CollectionCodec>(self, codec: C2) -> LocalCollectionStore<R, B, C2> {
        LocalCollectionStore {
            key: self.key,
            backend: self.backend,
            codec,
            notifier: self.notifier,
            options: self.options,
            clock: self.clock,
            ids: self.ids,
            state: self.state,
        }
    }

    /// Share a notifier with other stores.
    pub fn with_notifier(mut self, notifier: ChangeNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_options(mut self, options: StoreOptions) -> Self {
        self.ids.set_strategy(options.id_strategy);
        self.options = options;
        self
    }

    pub fn with_clock<K: Clock + 'static>(mut self, clock: K) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Backend key this store owns.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    pub fn is_loaded(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Read the collection from the backend, replacing the in-memory copy.
    ///
    /// A missing key loads as an empty collection. A blob that fails to decode
    /// is reported as [`StoreError::Corrupt`] and the in-memory copy is left
    /// as it was.
    pub fn load(&self) -> Result<(), StoreError> {
        let mut state = self.write_state("load")?;
        *state = Some(self.read_backend()?);
        Ok(())
    }

    fn read_backend(&self) -> Result<Vec<R>, StoreError> {
        match self.backend.get(&self.key)? {
            None => {
                debug!(collection = %self.key, "collection absent, starting empty");
                Ok(Vec::new())
            }
            Some(blob) => match self.codec.decode::<R>(&blob) {
                Ok(records) => {
                    debug!(collection = %self.key, records = records.len(), "collection loaded");
                    Ok(records)
                }
                Err(source) => {
                    warn!(collection = %self.key, error = %source, "stored collection is corrupt");
                    Err(StoreError::Corrupt {
                        collection: self.key.clone(),
                        source,
                    })
                }
            },
        }
    }

    fn write_state(
        &self,
        operation: &'static str,
    ) -> Result<RwLockWriteGuard<'_, Option<Vec<R>>>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::LockPoisoned(operation))
    }

    fn loaded<'a>(&self, state: &'a mut Option<Vec<R>>) -> Result<&'a mut Vec<R>, StoreError> {
        if state.is_none() {
            *state = Some(self.read_backend()?);
        }
        Ok(state.get_or_insert_with(Vec::new))
    }

    /// Run `f` over the loaded collection.
    fn with_records<T>(&self, f: impl FnOnce(&[R]) -> T) -> Result<T, StoreError> {
        {
            let state = self
                .state
                .read()
                .map_err(|_| StoreError::LockPoisoned("read"))?;
            if let Some(records) = state.as_deref() {
                return Ok(f(records));
            }
        }

        let mut state = self.write_state("read")?;
        let records = self.loaded(&mut state)?;
        Ok(f(records))
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Copy of the whole collection, insertion order preserved.
    pub fn get_all(&self) -> Result<Vec<R>, StoreError> {
        self.with_records(|records| records.to_vec())
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<R>, StoreError> {
        self.with_records(|records| records.iter().find(|r| r.id() == id).cloned())
    }

    /// Records matching a predicate, in collection order.
    pub fn find<F>(&self, predicate: F) -> Result<Vec<R>, StoreError>
    where
        F: Fn(&R) -> bool,
    {
        self.with_records(|records| records.iter().filter(|r| predicate(r)).cloned().collect())
    }

    pub fn count<F>(&self, predicate: F) -> Result<usize, StoreError>
    where
        F: Fn(&R) -> bool,
    {
        self.with_records(|records| records.iter().filter(|r| predicate(r)).count())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        self.with_records(|records| records.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        self.with_records(|records| records.is_empty())
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Create a record from a patch over defaults, with a fresh id.
    pub fn create(&self, patch: R::Patch) -> Result<R, StoreError> {
        let mut record = R::default();
        record.apply(patch);
        self.append(record, true)
    }

    /// Insert a fully formed record. Its id is kept unless empty; a taken id
    /// is rejected with [`StoreError::DuplicateId`].
    pub fn insert(&self, record: R) -> Result<R, StoreError> {
        self.append(record, false)
    }

    fn append(&self, mut record: R, fresh_id: bool) -> Result<R, StoreError> {
        let created = {
            let mut state = self.write_state("create")?;
            let records = self.loaded(&mut state)?;

            if fresh_id || record.id().is_empty() {
                record.set_id(self.unique_id(records));
            } else if records.iter().any(|r| r.id() == record.id()) {
                return Err(StoreError::DuplicateId {
                    collection: self.key.clone(),
                    id: record.id().to_string(),
                });
            }
            record.stamp_created(self.clock.now());

            let mut next = records.clone();
            next.push(record.clone());
            self.commit(records, next)?;
            record
        };

        self.notify(ChangeKind::Created, Some(created.id()));
        Ok(created)
    }

    /// Merge `patch` into the record with `id`. Only provided fields change.
    pub fn update(&self, id: &str, patch: R::Patch) -> Result<R, StoreError> {
        self.update_with(id, |record| {
            record.apply(patch);
            Ok(())
        })
    }

    /// Flip a boolean flag (e.g. `needsWashing`, `isFavorite`).
    pub fn toggle_field(&self, id: &str, field: &str) -> Result<R, StoreError> {
        self.update_with(id, |record| {
            let current = record
                .flag(field)
                .ok_or_else(|| StoreError::UnknownField {
                    collection: self.key.clone(),
                    field: field.to_string(),
                })?;
            record.set_flag(field, !current);
            Ok(())
        })
    }

    fn update_with<F>(&self, id: &str, change: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut R) -> Result<(), StoreError>,
    {
        let updated = {
            let mut state = self.write_state("update")?;
            let records = self.loaded(&mut state)?;

            let index = records
                .iter()
                .position(|r| r.id() == id)
                .ok_or_else(|| StoreError::NotFound {
                    collection: self.key.clone(),
                    id: id.to_string(),
                })?;

            let mut record = records[index].clone();
            change(&mut record)?;

            // updatedAt never precedes createdAt, even if the clock stepped back
            let now = self.clock.now();
            let now = match record.created_at() {
                Some(created) if created > now => created,
                _ => now,
            };
            record.stamp_updated(now);

            let mut next = records.clone();
            next[index] = record.clone();
            self.commit(records, next)?;
            record
        };

        self.notify(ChangeKind::Updated, Some(id));
        Ok(updated)
    }

    /// Remove the record with `id`. Returns false (and writes nothing) when
    /// absent. References to it from other collections are left dangling.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        {
            let mut state = self.write_state("delete")?;
            let records = self.loaded(&mut state)?;

            let Some(index) = records.iter().position(|r| r.id() == id) else {
                return Ok(false);
            };

            let mut next = records.clone();
            next.remove(index);
            self.commit(records, next)?;
        }

        self.notify(ChangeKind::Deleted, Some(id));
        Ok(true)
    }

    /// Bulk wipe: remove the backend key and empty the collection.
    pub fn clear(&self) -> Result<(), StoreError> {
        {
            let mut state = self.write_state("clear")?;
            match self.options.write_policy {
                WritePolicy::WriteThenCommit => {
                    self.backend.remove(&self.key)?;
                    *state = Some(Vec::new());
                }
                WritePolicy::Optimistic => {
                    *state = Some(Vec::new());
                    self.backend.remove(&self.key)?;
                }
            }
            debug!(collection = %self.key, "collection cleared");
        }

        self.notify(ChangeKind::Cleared, None);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn unique_id(&self, records: &[R]) -> String {
        loop {
            let id = self.ids.next(self.clock.as_ref());
            if !records.iter().any(|r| r.id() == id) {
                return id;
            }
        }
    }

    fn commit(&self, records: &mut Vec<R>, next: Vec<R>) -> Result<(), StoreError> {
        match self.options.write_policy {
            WritePolicy::WriteThenCommit => {
                self.write_blob(&next)?;
                *records = next;
            }
            WritePolicy::Optimistic => {
                *records = next;
                self.write_blob(records)?;
            }
        }
        Ok(())
    }

    fn write_blob(&self, records: &[R]) -> Result<(), StoreError> {
        let blob = self.codec.encode(records).map_err(StoreError::Encode)?;
        if let Err(err) = self.backend.set(&self.key, &blob) {
            warn!(collection = %self.key, error = %err, "collection write failed");
            return Err(err.into());
        }
        debug!(
            collection = %self.key,
            records = records.len(),
            bytes = blob.len(),
            "collection written"
        );
        Ok(())
    }

    fn notify(&self, kind: ChangeKind, id: Option<&str>) {
        self.notifier
            .notify(&ChangeEvent::new(self.key.clone(), kind, id.map(str::to_string)));
    }
}
