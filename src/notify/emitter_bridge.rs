use std::sync::{Arc, Mutex, PoisonError};

use crate::EventEmitter;

use super::{ChangeEvent, ChangeNotifier, Subscription};

/// Forwards change events into an `EventEmitter` for asynchronous in-process
/// listeners.
///
/// Events are emitted under the collection name with the JSON-encoded
/// [`ChangeEvent`] as a `String` payload. Unlike [`ChangeNotifier`] callbacks,
/// emitter listeners run on their own threads and give no ordering guarantee.
pub struct EmitterBridge {
    emitter: Arc<Mutex<EventEmitter>>,
    subscriptions: Vec<Subscription>,
}

impl EmitterBridge {
    pub fn new(emitter: EventEmitter) -> Self {
        EmitterBridge {
            emitter: Arc::new(Mutex::new(emitter)),
            subscriptions: Vec::new(),
        }
    }

    /// Start forwarding events for `collection`.
    pub fn forward(&mut self, notifier: &ChangeNotifier, collection: &str) {
        let emitter = Arc::clone(&self.emitter);
        let subscription = notifier.subscribe(collection, move |event: &ChangeEvent| {
            let payload = match serde_json::to_string(event) {
                Ok(payload) => payload,
                Err(err) => {
                    tracing::warn!(error = %err, "failed to encode change event for emitter");
                    return;
                }
            };
            let mut emitter = emitter.lock().unwrap_or_else(PoisonError::into_inner);
            emitter.emit(&event.collection, payload);
        });
        self.subscriptions.push(subscription);
    }

    /// Stop forwarding everything.
    pub fn detach(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
    }
}

impl Drop for EmitterBridge {
    fn drop(&mut self) {
        self.detach();
    }
}
