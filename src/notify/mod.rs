//! Change notification - synchronous, per-collection subscriber registry.
//!
//! ## Example
//!
//! ```ignore
//! let notifier = ChangeNotifier::new();
//! let subscription = notifier.subscribe("closetItems", |event| {
//!     println!("{:?} {:?}", event.kind, event.id);
//! });
//!
//! // ... store mutations fire exactly one event each ...
//!
//! subscription.unsubscribe();
//! ```

#[cfg(feature = "emitter")]
mod emitter_bridge;

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use serde::{Deserialize, Serialize};

#[cfg(feature = "emitter")]
pub use emitter_bridge::EmitterBridge;

/// What happened to a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
    /// The whole collection was wiped.
    Cleared,
}

/// One committed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub collection: String,
    pub kind: ChangeKind,
    /// Affected record, `None` for `Cleared`.
    pub id: Option<String>,
}

impl ChangeEvent {
    pub fn new(collection: impl Into<String>, kind: ChangeKind, id: Option<String>) -> Self {
        Self {
            collection: collection.into(),
            kind,
            id,
        }
    }
}

type Callback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

struct Subscriber {
    id: u64,
    collection: String,
    callback: Callback,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

/// Shared subscriber registry. Clones share subscribers.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    registry: Arc<RwLock<Registry>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for mutations on `collection`.
    pub fn subscribe<F>(&self, collection: &str, callback: F) -> Subscription
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let mut registry = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        registry.next_id += 1;
        let id = registry.next_id;
        registry.subscribers.push(Subscriber {
            id,
            collection: collection.to_string(),
            callback: Arc::new(callback),
        });

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Number of live subscribers for `collection`.
    pub fn subscriber_count(&self, collection: &str) -> usize {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .subscribers
            .iter()
            .filter(|s| s.collection == collection)
            .count()
    }

    /// Invoke every subscriber of `event.collection`, in subscription order.
    ///
    /// Callbacks run outside the registry lock, so they may subscribe,
    /// unsubscribe or read stores. A panicking callback is logged and does
    /// not stop the rest.
    pub fn notify(&self, event: &ChangeEvent) {
        let callbacks: Vec<(u64, Callback)> = {
            let registry = self
                .registry
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            registry
                .subscribers
                .iter()
                .filter(|s| s.collection == event.collection)
                .map(|s| (s.id, Arc::clone(&s.callback)))
                .collect()
        };

        for (subscriber, callback) in callbacks {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| callback(event)));
            if outcome.is_err() {
                tracing::warn!(
                    collection = %event.collection,
                    kind = ?event.kind,
                    subscriber,
                    "change subscriber panicked"
                );
            }
        }
    }
}

/// Handle returned by [`ChangeNotifier::subscribe`].
///
/// Dropping the handle keeps the subscription alive; call
/// [`Subscription::unsubscribe`] to stop receiving events.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: u64,
    registry: Weak<RwLock<Registry>>,
}

impl Subscription {
    /// Remove the subscriber. Returns false if it was already removed.
    pub fn unsubscribe(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut registry = registry.write().unwrap_or_else(PoisonError::into_inner);
        let before = registry.subscribers.len();
        registry.subscribers.retain(|s| s.id != self.id);
        registry.subscribers.len() != before
    }
}
