// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Listener registry for socket events.
//!
//! The `EventBus` is created once at startup, shared by `Arc`, and shut down
//! at teardown. Listeners are plain callbacks keyed by event name and invoked
//! synchronously, in registration order, for every emitted payload.

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde_json::Value;
use tracing::{debug, error, trace};

/// Callback invoked with the raw payload of an event.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Handle returned by [`EventBus::add_listener`], used to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Errors raised by the bus itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    #[error("event bus is shut down; cannot register listener for `{0}`")]
    ShutDown(String),
}

#[derive(Default)]
struct Registry {
    listeners: HashMap<String, Vec<(ListenerId, Listener)>>,
    next_id: u64,
    shut_down: bool,
}

/// Process-wide registry of socket event listeners.
#[derive(Default)]
pub struct EventBus {
    registry: Mutex<Registry>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.lock();
        f.debug_struct("EventBus")
            .field("events", &registry.listeners.len())
            .field("shut_down", &registry.shut_down)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `listener` for `event`.
    pub fn add_listener<F>(&self, event: &str, listener: F) -> Result<ListenerId, BusError>
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let mut registry = self.lock();
        if registry.shut_down {
            return Err(BusError::ShutDown(event.to_string()));
        }
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        registry
            .listeners
            .entry(event.to_string())
            .or_default()
            .push((id, Arc::new(listener)));
        debug!(event, %id, "listener registered");
        Ok(id)
    }

    /// Removes a listener. Returns `false` if it was not registered, so removing twice is harmless.
    pub fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        let mut registry = self.lock();
        let Some(listeners) = registry.listeners.get_mut(event) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            registry.listeners.remove(event);
        }
        if removed {
            debug!(event, %id, "listener removed");
        }
        removed
    }

    /// Registers `listener` and returns a guard that removes it when dropped.
    pub fn subscribe<F>(self: &Arc<Self>, event: &str, listener: F) -> Result<Subscription, BusError>
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = self.add_listener(event, listener)?;
        Ok(Subscription {
            bus: Arc::downgrade(self),
            event: event.to_string(),
            id,
        })
    }

    /// Delivers `payload` to every listener registered for `event`.
    ///
    /// Listeners run on the caller's thread in registration order. The set of
    /// listeners is fixed when the call starts: one added during dispatch
    /// first sees the next event. A panicking listener is logged and skipped.
    /// Returns how many listeners ran.
    pub fn emit(&self, event: &str, payload: &Value) -> usize {
        let listeners: Vec<(ListenerId, Listener)> = {
            let registry = self.lock();
            if registry.shut_down {
                debug!(event, "event bus is shut down, dropping event");
                return 0;
            }
            match registry.listeners.get(event) {
                Some(listeners) => listeners.clone(),
                None => {
                    trace!(event, "no listeners");
                    return 0;
                }
            }
        };

        for (id, listener) in &listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(payload))).is_err() {
                error!(event, %id, "listener panicked");
            }
        }
        listeners.len()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.lock().listeners.get(event).map_or(0, Vec::len)
    }

    /// Removes every listener and refuses further registrations.
    pub fn shutdown(&self) {
        let mut registry = self.lock();
        let dropped: usize = registry.listeners.values().map(Vec::len).sum();
        registry.listeners.clear();
        registry.shut_down = true;
        debug!(dropped, "event bus shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.lock().shut_down
    }
}

/// Keeps a listener registered for as long as it lives.
#[must_use = "the listener is removed as soon as the subscription is dropped"]
pub struct Subscription {
    bus: Weak<EventBus>,
    event: String,
    id: ListenerId,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn event(&self) -> &str {
        &self.event
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .field("id", &self.id)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.remove_listener(&self.event, self.id);
        }
    }
}
