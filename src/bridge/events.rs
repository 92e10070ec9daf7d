/*!
 * Event Listeners
 * Registration-ordered fan-out of push events
 *
 * Fan-out works on a snapshot of the listener list taken when the event
 * arrives, and no lock is held while callbacks run, so a callback may
 * subscribe or unsubscribe freely.
 */

use ahash::RandomState;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

type Callback = Arc<dyn Fn(&Value) + Send + Sync>;

struct Listener {
    id: u64,
    active: AtomicBool,
    callback: Callback,
}

#[derive(Default)]
pub(super) struct EventRegistry {
    listeners: RwLock<HashMap<String, Vec<Arc<Listener>>, RandomState>>,
    next_id: AtomicU64,
}

impl EventRegistry {
    pub(super) fn subscribe(self: &Arc<Self>, event: &str, callback: Callback) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let listener = Arc::new(Listener {
            id,
            active: AtomicBool::new(true),
            callback,
        });
        self.listeners
            .write()
            .entry(event.to_string())
            .or_default()
            .push(listener);

        Subscription {
            registry: Arc::downgrade(self),
            event: event.to_string(),
            id,
        }
    }

    /// Invoke every listener registered for `event`, in registration order
    ///
    /// Returns the number of callbacks run. A listener removed during the
    /// pass is skipped if its turn has not come yet.
    pub(super) fn emit(&self, event: &str, data: &Value) -> usize {
        let snapshot: Vec<Arc<Listener>> = match self.listeners.read().get(event) {
            Some(list) => list.clone(),
            None => return 0,
        };

        let mut delivered = 0;
        for listener in snapshot {
            if listener.active.load(Ordering::Acquire) {
                (listener.callback)(data);
                delivered += 1;
            }
        }
        delivered
    }

    fn remove(&self, event: &str, id: u64) -> bool {
        let mut listeners = self.listeners.write();
        let Some(list) = listeners.get_mut(event) else {
            return false;
        };
        let Some(pos) = list.iter().position(|l| l.id == id) else {
            return false;
        };

        let listener = list.remove(pos);
        listener.active.store(false, Ordering::Release);
        if list.is_empty() {
            listeners.remove(event);
        }
        true
    }

    pub(super) fn listener_count(&self, event: &str) -> usize {
        self.listeners.read().get(event).map(Vec::len).unwrap_or(0)
    }
}

/// Handle for one registered listener
///
/// Dropping it leaves the listener registered; call [`Subscription::unsubscribe`]
/// to remove it.
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    registry: Weak<EventRegistry>,
    event: String,
    id: u64,
}

impl Subscription {
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Remove the listener; returns false if it was already gone
    pub fn unsubscribe(self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.remove(&self.event, self.id),
            None => false,
        }
    }
}
