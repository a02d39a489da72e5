//! In-process publish/subscribe for lifecycle events.
//!
//! Delivery is synchronous and in subscription order within one event kind;
//! there is no ordering guarantee across kinds. The bus does not catch
//! handler panics — handler failures are the handler's own responsibility.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ghosthub_core::events::{GhostEvent, GhostEventKind};

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&GhostEvent) + Send + Sync>;

struct Subscriber {
    id: u64,
    handler: Handler,
}

/// The in-process lifecycle event bus.
pub struct EventBus {
    /// Event kind → subscribers in subscription order.
    subscribers: RwLock<HashMap<GhostEventKind, Vec<Subscriber>>>,
    /// Monotonic subscription id source.
    next_id: AtomicU64,
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers a handler for one event kind.
    pub fn subscribe<F>(&self, kind: GhostEventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&GhostEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut subscribers = self.subscribers.write().expect("bus lock poisoned");
        subscribers.entry(kind).or_default().push(Subscriber {
            id,
            handler: Arc::new(handler),
        });
        SubscriptionId(id)
    }

    /// Removes one subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut subscribers = self.subscribers.write().expect("bus lock poisoned");
        for entries in subscribers.values_mut() {
            entries.retain(|s| s.id != id.0);
        }
        subscribers.retain(|_, entries| !entries.is_empty());
    }

    /// Delivers an event to every current subscriber of its kind,
    /// synchronously, in subscription order.
    pub fn publish(&self, event: &GhostEvent) {
        // Snapshot the handler list so handlers may (un)subscribe reentrantly.
        let handlers: Vec<Handler> = {
            let subscribers = self.subscribers.read().expect("bus lock poisoned");
            subscribers
                .get(&event.kind)
                .map(|entries| entries.iter().map(|s| s.handler.clone()).collect())
                .unwrap_or_default()
        };
        for handler in handlers {
            handler(event);
        }
    }

    /// Removes all subscribers.
    pub fn clear(&self) {
        self.subscribers.write().expect("bus lock poisoned").clear();
    }

    /// Number of subscribers for one kind.
    pub fn subscriber_count(&self, kind: GhostEventKind) -> usize {
        self.subscribers
            .read()
            .expect("bus lock poisoned")
            .get(&kind)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").finish()
    }
}
