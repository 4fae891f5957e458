//! Persistence seam and observable state containers.
//!
//! # Design
//! - `KeyValueStore` stands in for browser LocalStorage so session logic runs natively.
//! - `TokenStore` owns the two persisted keys; nothing else touches them.
//! - `StateCell` applies a whole mutation before notifying, so listeners never see a
//!   half-updated value.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;
use tracing::warn;

use crate::core::config::ClientConfig;

/// Failure to persist a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("storage write for `{key}` failed: {detail}")]
pub struct StoreError {
    /// Key that could not be written.
    pub key: String,
    /// Backend-specific failure detail.
    pub detail: String,
}

/// Durable string key/value storage (LocalStorage in the browser).
pub trait KeyValueStore {
    /// Read a value, `None` when absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;
    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend rejects the write (quota, privacy mode).
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Delete a value; deleting a missing key is a no-op.
    fn remove(&self, key: &str);
}

/// In-memory store used natively and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// Typed view over the persisted auth token and cached user profile.
#[derive(Clone)]
pub struct TokenStore {
    backend: Rc<dyn KeyValueStore>,
    token_key: String,
    user_key: String,
}

impl TokenStore {
    /// Bind the store to the keys derived from `config`.
    #[must_use]
    pub fn new(backend: Rc<dyn KeyValueStore>, config: &ClientConfig) -> Self {
        Self {
            backend,
            token_key: config.token_key(),
            user_key: config.user_key(),
        }
    }

    /// Persisted bearer token, ignoring blank values.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.backend
            .get(&self.token_key)
            .filter(|token| !token.trim().is_empty())
    }

    /// Persisted user profile JSON.
    #[must_use]
    pub fn user_json(&self) -> Option<String> {
        self.backend.get(&self.user_key)
    }

    /// Persist a token and its profile as a pair.
    ///
    /// # Errors
    ///
    /// Returns the first [`StoreError`]; both entries are removed again so a
    /// half-written pair is never left behind.
    pub fn save(&self, token: &str, user_json: &str) -> Result<(), StoreError> {
        let written = self
            .backend
            .set(&self.token_key, token)
            .and_then(|()| self.backend.set(&self.user_key, user_json));
        if let Err(err) = &written {
            warn!(error = %err, "failed to persist session");
            self.clear();
        }
        written
    }

    /// Remove both entries.
    pub fn clear(&self) {
        self.backend.remove(&self.token_key);
        self.backend.remove(&self.user_key);
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("token_key", &self.token_key)
            .field("user_key", &self.user_key)
            .finish_non_exhaustive()
    }
}

type Listener<T> = Rc<dyn Fn(&T)>;

struct Listeners<T> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Listener<T>)>>,
}

/// Handle returned by [`StateCell::subscribe`]; dropping it detaches the listener.
#[must_use = "dropping a Subscription detaches the listener"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

/// Observable value with atomic multi-field updates.
pub struct StateCell<T> {
    value: RefCell<T>,
    listeners: Rc<Listeners<T>>,
}

impl<T: Clone + 'static> StateCell<T> {
    /// Wrap an initial value.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            listeners: Rc::new(Listeners {
                next_id: Cell::new(0),
                entries: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Snapshot of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Read the current value without cloning it.
    pub fn with<R>(&self, read: impl FnOnce(&T) -> R) -> R {
        read(&self.value.borrow())
    }

    /// Apply a mutation, then notify every listener once with the new value.
    pub fn update<R>(&self, mutate: impl FnOnce(&mut T) -> R) -> R {
        let (result, snapshot) = {
            let mut value = self.value.borrow_mut();
            let result = mutate(&mut value);
            (result, value.clone())
        };
        self.notify(&snapshot);
        result
    }

    /// Replace the value wholesale.
    pub fn set(&self, value: T) {
        self.update(|current| *current = value);
    }

    /// Register a listener invoked after every update.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = self.listeners.next_id.get();
        self.listeners.next_id.set(id.wrapping_add(1));
        self.listeners
            .entries
            .borrow_mut()
            .push((id, Rc::new(listener)));

        let weak = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = weak.upgrade() {
                listeners
                    .entries
                    .borrow_mut()
                    .retain(|(entry, _)| *entry != id);
            }
        })
    }

    fn notify(&self, snapshot: &T) {
        let listeners: Vec<Listener<T>> = self
            .listeners
            .entries
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("value", &self.value.borrow())
            .finish_non_exhaustive()
    }
}
