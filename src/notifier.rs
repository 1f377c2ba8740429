//! # Change Notifier
//!
//! A lightweight observer registry. Each binding owns one notifier and
//! fans value-changed events out to its registered listeners.
//!
//! ## Subscription Tokens
//!
//! [`subscribe`](ChangeNotifier::subscribe) returns an opaque
//! [`SubscriptionId`]; [`unsubscribe`](ChangeNotifier::unsubscribe) takes
//! that token. Listeners are never compared by identity.
//!
//! ## Delivery Semantics
//!
//! [`publish`](ChangeNotifier::publish) delivers synchronously to a
//! snapshot of the subscribers registered at call time:
//!
//! - a listener added during delivery does not receive the in-flight
//!   event,
//! - a listener removed during delivery still receives the in-flight
//!   event,
//! - re-entrant `publish` from within a listener is permitted (the
//!   registry lock is never held while listeners run),
//! - a panicking listener does not abort delivery to the remaining
//!   listeners; its token is returned to the publisher for reporting.
//!
//! The lock guards only the snapshot copy, so a slow listener cannot
//! block unrelated `subscribe`/`unsubscribe` calls.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

/// Event key used for value transitions.
pub const VALUE: &str = "value";

/// Opaque token identifying one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A typed value transition handed to listeners.
#[derive(Debug)]
pub struct Change<'a, T> {
    /// Event key; value transitions use [`VALUE`].
    pub key: &'static str,
    /// The value before the transition.
    pub old: &'a T,
    /// The value after the transition.
    pub new: &'a T,
}

type Listener<T> = dyn Fn(&Change<'_, T>) + Send + Sync;

struct Registry<T> {
    next_id: u64,
    closed: bool,
    listeners: Vec<(SubscriptionId, Arc<Listener<T>>)>,
}

/// Observer registry fanning out value-changed events.
pub struct ChangeNotifier<T> {
    registry: Mutex<Registry<T>>,
}

impl<T> Default for ChangeNotifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ChangeNotifier<T> {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry {
                next_id: 0,
                closed: false,
                listeners: Vec::new(),
            }),
        }
    }

    /// Register a listener. Returns the token to unsubscribe with.
    ///
    /// Subscribing to a closed notifier yields a token whose listener
    /// will never be invoked.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&Change<'_, T>) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock().expect("notifier lock poisoned");
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        if !registry.closed {
            registry.listeners.push((id, Arc::new(listener)));
        }
        id
    }

    /// Remove a listener. Returns whether the token was registered.
    ///
    /// A listener removed while a delivery is in flight still receives
    /// the in-flight event (delivery works on a snapshot).
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry.lock().expect("notifier lock poisoned");
        let before = registry.listeners.len();
        registry.listeners.retain(|(lid, _)| *lid != id);
        registry.listeners.len() != before
    }

    /// Deliver an event to every listener registered at call time.
    ///
    /// Returns the tokens of listeners that panicked; the caller is
    /// expected to report them. A closed notifier delivers nothing.
    pub fn publish(&self, key: &'static str, old: &T, new: &T) -> Vec<SubscriptionId> {
        let snapshot: Vec<(SubscriptionId, Arc<Listener<T>>)> = {
            let registry = self.registry.lock().expect("notifier lock poisoned");
            if registry.closed {
                return Vec::new();
            }
            registry.listeners.clone()
        };

        let change = Change { key, old, new };
        let mut failed = Vec::new();
        for (id, listener) in snapshot {
            let listener = listener.as_ref();
            if catch_unwind(AssertUnwindSafe(|| listener(&change))).is_err() {
                failed.push(id);
            }
        }
        failed
    }

    /// Close the notifier: remove all listeners and refuse new deliveries.
    ///
    /// A delivery that snapshotted its subscribers before the close runs
    /// to completion; no delivery starts afterwards.
    pub fn close(&self) {
        let mut registry = self.registry.lock().expect("notifier lock poisoned");
        registry.closed = true;
        registry.listeners.clear();
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.registry
            .lock()
            .expect("notifier lock poisoned")
            .listeners
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.registry.lock().expect("notifier lock poisoned").closed
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================
