// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Settings store abstraction.
//!
//! A key-value store of JSON documents. Besides `get`/`set`, a store lets
//! callers register an observer for one key; the observer fires when the value
//! is changed by someone else (another process, another window), never for the
//! caller's own `set`.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

/// Callback invoked with the key whose value changed externally.
pub type SettingsObserver = Arc<dyn Fn(&str) + Send + Sync>;

/// Error type for settings storage operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage not initialized")]
    NotInitialized,

    #[error("Invalid settings key: {0}")]
    InvalidKey(String),

    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("Writes to `{0}` suspended: stored value is unreadable")]
    WriteSuspended(String),
}

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Key-value persistence used by the account registries.
pub trait SettingsStore: Send + Sync {
    /// Read the value stored under `key`, `None` when absent.
    fn get(&self, key: &str) -> SettingsResult<Option<Value>>;

    /// Store `value` under `key`. Does not notify observers.
    fn set(&self, key: &str, value: Value) -> SettingsResult<()>;

    /// Register an observer for external changes to `key`.
    fn subscribe(&self, key: &str, observer: SettingsObserver);

    /// Move the value under `key` out of the way, keeping it for inspection.
    /// Afterwards `get(key)` returns `None`.
    fn quarantine(&self, key: &str) -> SettingsResult<()>;
}

/// Name under which a quarantined value is kept.
pub fn quarantine_key(key: &str) -> String {
    format!("{key}.corrupt")
}

/// Observers grouped by key.
#[derive(Default)]
pub struct ObserverSet {
    observers: Mutex<HashMap<String, Vec<SettingsObserver>>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, key: &str, observer: SettingsObserver) {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.to_string())
            .or_default()
            .push(observer);
    }

    /// Keys with at least one observer.
    pub fn keys(&self) -> Vec<String> {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Invoke every observer of `key`. The lock is released before calling out.
    pub fn notify(&self, key: &str) {
        let observers = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .unwrap_or_default();

        for observer in observers {
            observer(key);
        }
    }
}

/// In-process settings store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemorySettingsStore {
    values: Mutex<HashMap<String, Value>>,
    observers: ObserverSet,
    writes: Mutex<usize>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a write by another writer: store the value, then notify.
    pub fn set_external(&self, key: &str, value: Value) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        self.observers.notify(key);
    }

    /// Number of `set` calls so far.
    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> SettingsResult<Option<Value>> {
        Ok(self
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: Value) -> SettingsResult<()> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }

    fn subscribe(&self, key: &str, observer: SettingsObserver) {
        self.observers.add(key, observer);
    }

    fn quarantine(&self, key: &str) -> SettingsResult<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = values.remove(key) {
            values.insert(quarantine_key(key), value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_observer() -> (SettingsObserver, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let observer: SettingsObserver = Arc::new(move |_key: &str| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (observer, count)
    }

    #[test]
    fn get_returns_none_for_missing_key() {
        let store = MemorySettingsStore::new();
        assert!(store.get("testaccounts").unwrap().is_none());
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = MemorySettingsStore::new();
        store.set("testaccounts", json!([1, 2])).unwrap();
        assert_eq!(store.get("testaccounts").unwrap(), Some(json!([1, 2])));
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn own_writes_do_not_notify() {
        let store = MemorySettingsStore::new();
        let (observer, count) = counting_observer();
        store.subscribe("testaccounts", observer);

        store.set("testaccounts", json!([])).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn external_writes_notify_only_matching_key() {
        let store = MemorySettingsStore::new();
        let (observer, count) = counting_observer();
        store.subscribe("testaccounts", observer);

        store.set_external("publicaccounts", json!([]));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        store.set_external("testaccounts", json!([]));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn quarantine_moves_value_aside() {
        let store = MemorySettingsStore::new();
        store.set("testaccounts", json!({"broken": true})).unwrap();

        store.quarantine("testaccounts").unwrap();

        assert!(store.get("testaccounts").unwrap().is_none());
        assert_eq!(
            store.get("testaccounts.corrupt").unwrap(),
            Some(json!({"broken": true}))
        );
    }

    #[test]
    fn observer_may_read_store_during_notification() {
        let store = Arc::new(MemorySettingsStore::new());
        let reader = Arc::downgrade(&store);
        let seen = Arc::new(Mutex::new(None));
        let seen_in_observer = seen.clone();

        store.subscribe(
            "testaccounts",
            Arc::new(move |key: &str| {
                if let Some(store) = reader.upgrade() {
                    *seen_in_observer.lock().unwrap() = store.get(key).unwrap();
                }
            }),
        );

        store.set_external("testaccounts", json!(["reloaded"]));
        assert_eq!(*seen.lock().unwrap(), Some(json!(["reloaded"])));
    }
}
