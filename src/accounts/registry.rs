// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account registry for one network context.
//!
//! Owns the authoritative in-memory account list, mirrors it to the settings
//! store under `<network>accounts` and debounces the writes. When the stored
//! list is changed by another writer the registry reloads it and broadcasts
//! [`AccountEvent::AccountsUpdated`].
//!
//! A stored list that exists but cannot be read is never replaced by an empty
//! one. At construction the unreadable value is moved aside first; if that
//! fails, writes stay suspended until a load succeeds. A failed reload keeps
//! the current in-memory list.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use super::debounce::SaveScheduler;
use super::AccountEvent;
use crate::ledger::NetworkContext;
use crate::models::Account;
use crate::storage::{SettingsError, SettingsResult, SettingsStore};

/// In-memory account list plus its persistence for one network context.
#[derive(Clone)]
pub struct AccountRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    network: NetworkContext,
    storage_key: String,
    accounts: Mutex<Vec<Account>>,
    store: Arc<dyn SettingsStore>,
    scheduler: SaveScheduler,
    events: broadcast::Sender<AccountEvent>,
    /// Cleared while the stored list is unreadable and still in place.
    writable: AtomicBool,
}

impl AccountRegistry {
    /// Create the registry, load the persisted list and subscribe to external changes.
    pub fn new(
        network: NetworkContext,
        store: Arc<dyn SettingsStore>,
        scheduler: SaveScheduler,
        events: broadcast::Sender<AccountEvent>,
    ) -> Self {
        let inner = Arc::new(RegistryInner {
            network,
            storage_key: network.accounts_key(),
            accounts: Mutex::new(Vec::new()),
            store,
            scheduler,
            events,
            writable: AtomicBool::new(true),
        });
        inner.load_initial();

        // Weak: the store outlives registries it notifies.
        let weak = Arc::downgrade(&inner);
        inner.store.subscribe(
            &inner.storage_key,
            Arc::new(move |_key: &str| {
                if let Some(inner) = weak.upgrade() {
                    if inner.reload() {
                        inner.broadcast_updated();
                    }
                }
            }),
        );

        Self { inner }
    }

    pub fn network(&self) -> NetworkContext {
        self.inner.network
    }

    pub fn storage_key(&self) -> &str {
        &self.inner.storage_key
    }

    /// Replace the in-memory list with the persisted one (empty if absent).
    ///
    /// Returns `false` and keeps the current list when the stored value
    /// cannot be read.
    pub fn load(&self) -> bool {
        self.inner.reload()
    }

    /// Whether writes are suspended because the stored list is unreadable.
    pub fn is_write_suspended(&self) -> bool {
        !self.inner.writable.load(Ordering::Acquire)
    }

    /// Schedule a debounced write of the current list.
    pub fn save(&self) {
        let weak = Arc::downgrade(&self.inner);
        let scheduled = self.inner.scheduler.schedule(move || {
            if let Some(inner) = weak.upgrade() {
                inner.persist_logged();
            }
        });
        if !scheduled {
            debug!(network = %self.inner.network, "Save already pending");
        }
    }

    /// Write the current list now, regardless of any pending write.
    pub fn flush(&self) -> SettingsResult<()> {
        self.inner.persist()
    }

    pub fn add(&self, account: Account) {
        self.inner.lock().push(account);
        self.save();
    }

    /// Remove the account at `index`. Out-of-range indexes are logged and ignored.
    pub fn delete(&self, index: usize) -> bool {
        {
            let mut accounts = self.inner.lock();
            if index >= accounts.len() {
                warn!(
                    network = %self.inner.network,
                    index,
                    len = accounts.len(),
                    "Account index not found, nothing deleted"
                );
                return false;
            }
            accounts.remove(index);
        }

        self.save();
        true
    }

    /// Overwrite the account at `index`. Out-of-range indexes are logged and ignored.
    pub fn replace(&self, index: usize, account: Account) -> bool {
        {
            let mut accounts = self.inner.lock();
            match accounts.get_mut(index) {
                Some(slot) => *slot = account,
                None => {
                    warn!(
                        network = %self.inner.network,
                        index,
                        len = accounts.len(),
                        "Account index not found, nothing replaced"
                    );
                    return false;
                }
            }
        }

        self.save();
        true
    }

    /// Copy of the current list; mutating it does not touch the registry.
    pub fn accounts(&self) -> Vec<Account> {
        self.inner.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl RegistryInner {
    fn lock(&self) -> MutexGuard<'_, Vec<Account>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_stored(&self) -> SettingsResult<Vec<Account>> {
        match self.store.get(&self.storage_key)? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    fn load_initial(&self) {
        match self.read_stored() {
            Ok(accounts) => self.set_loaded(accounts),
            Err(e) => self.set_aside_unreadable(&e),
        }
    }

    fn set_aside_unreadable(&self, e: &SettingsError) {
        warn!(
            network = %self.network,
            error = %e,
            "Stored account list is unreadable, moving it aside"
        );
        match self.store.quarantine(&self.storage_key) {
            Ok(()) => self.set_loaded(Vec::new()),
            Err(qe) => {
                self.writable.store(false, Ordering::Release);
                error!(
                    network = %self.network,
                    error = %qe,
                    "Could not move unreadable account list aside, writes suspended"
                );
            }
        }
    }

    /// Returns `false` when the stored list could not be read.
    fn reload(&self) -> bool {
        match self.read_stored() {
            Ok(accounts) => {
                self.set_loaded(accounts);
                true
            }
            Err(e) => {
                warn!(
                    network = %self.network,
                    error = %e,
                    "Stored account list is unreadable, keeping in-memory list"
                );
                false
            }
        }
    }

    fn set_loaded(&self, accounts: Vec<Account>) {
        debug!(network = %self.network, count = accounts.len(), "Loaded accounts");
        *self.lock() = accounts;
        self.writable.store(true, Ordering::Release);
    }

    fn persist(&self) -> SettingsResult<()> {
        if !self.writable.load(Ordering::Acquire) {
            return Err(SettingsError::WriteSuspended(self.storage_key.clone()));
        }

        // Snapshot first; the store is never called with the list locked.
        let snapshot = self.lock().clone();
        let value = serde_json::to_value(&snapshot)?;
        self.store.set(&self.storage_key, value)?;

        debug!(network = %self.network, count = snapshot.len(), "Persisted accounts");
        Ok(())
    }

    fn persist_logged(&self) {
        if let Err(e) = self.persist() {
            warn!(network = %self.network, error = %e, "Failed to persist accounts");
        }
    }

    fn broadcast_updated(&self) {
        // No receivers is fine.
        let _ = self.events.send(AccountEvent::AccountsUpdated {
            network: self.network,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetBalance;
    use crate::storage::{FileSettingsStore, MemorySettingsStore, SettingsPaths};
    use std::fs;
    use std::path::Path;
    use std::time::{Duration, SystemTime};

    fn account(name: &str, public_key: &str) -> Account {
        Account {
            name: name.to_string(),
            public_key: public_key.to_string(),
            secret: String::new(),
            asset_balances: vec![AssetBalance::refreshing()],
            tag: None,
        }
    }

    fn registry_with(
        store: Arc<MemorySettingsStore>,
    ) -> (AccountRegistry, broadcast::Receiver<AccountEvent>) {
        let (events, rx) = broadcast::channel(16);
        let registry = AccountRegistry::new(
            NetworkContext::Test,
            store,
            SaveScheduler::new(Duration::from_millis(100)),
            events,
        );
        (registry, rx)
    }

    fn persisted(store: &MemorySettingsStore, key: &str) -> Vec<Account> {
        serde_json::from_value(store.get(key).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn loads_persisted_list_at_construction() {
        let store = Arc::new(MemorySettingsStore::new());
        store
            .set(
                "testaccounts",
                serde_json::to_value(vec![account("Alice", "GA")]).unwrap(),
            )
            .unwrap();

        let (registry, _rx) = registry_with(store);
        assert_eq!(registry.accounts(), vec![account("Alice", "GA")]);
        assert_eq!(registry.storage_key(), "testaccounts");
    }

    #[test]
    fn missing_list_loads_empty() {
        let store = Arc::new(MemorySettingsStore::new());
        let (registry, _rx) = registry_with(store);
        assert!(registry.is_empty());
        assert!(!registry.is_write_suspended());
    }

    #[test]
    fn unreadable_list_at_construction_is_moved_aside() {
        let store = Arc::new(MemorySettingsStore::new());
        store.set("testaccounts", serde_json::json!({"oops": 1})).unwrap();

        let (registry, _rx) = registry_with(store.clone());

        assert!(registry.is_empty());
        assert_eq!(
            store.get("testaccounts.corrupt").unwrap(),
            Some(serde_json::json!({"oops": 1}))
        );
        registry.add(account("Alice", "GA"));
        assert_eq!(persisted(&store, "testaccounts"), vec![account("Alice", "GA")]);
    }

    #[test]
    fn failed_reload_keeps_current_list() {
        let store = Arc::new(MemorySettingsStore::new());
        let (registry, mut rx) = registry_with(store.clone());
        registry.add(account("Alice", "GA"));

        store.set_external("testaccounts", serde_json::json!({"oops": 1}));

        assert_eq!(registry.accounts(), vec![account("Alice", "GA")]);
        assert!(!registry.load());
        assert!(rx.try_recv().is_err());
    }

    /// Store whose reads fail and whose values cannot be moved aside.
    #[derive(Default)]
    struct UnreadableStore {
        broken: AtomicBool,
        inner: MemorySettingsStore,
    }

    impl SettingsStore for UnreadableStore {
        fn get(&self, key: &str) -> SettingsResult<Option<serde_json::Value>> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(std::io::Error::other("disk on fire").into());
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: serde_json::Value) -> SettingsResult<()> {
            self.inner.set(key, value)
        }

        fn subscribe(&self, key: &str, observer: crate::storage::SettingsObserver) {
            self.inner.subscribe(key, observer)
        }

        fn quarantine(&self, _key: &str) -> SettingsResult<()> {
            Err(std::io::Error::other("read-only").into())
        }
    }

    #[test]
    fn writes_suspended_until_a_load_succeeds() {
        let store = Arc::new(UnreadableStore::default());
        store.broken.store(true, Ordering::SeqCst);
        let (events, _rx) = broadcast::channel(16);
        let registry = AccountRegistry::new(
            NetworkContext::Test,
            store.clone(),
            SaveScheduler::default(),
            events,
        );

        assert!(registry.is_write_suspended());
        registry.add(account("Alice", "GA"));
        assert_eq!(store.inner.writes(), 0);
        assert!(matches!(registry.flush(), Err(SettingsError::WriteSuspended(_))));

        store.broken.store(false, Ordering::SeqCst);
        assert!(registry.load());
        assert!(!registry.is_write_suspended());
        registry.flush().unwrap();
        assert_eq!(store.inner.writes(), 1);
    }

    // ---- FileSettingsStore ----

    fn file_registry(store: Arc<FileSettingsStore>) -> AccountRegistry {
        let (events, _) = broadcast::channel(16);
        AccountRegistry::new(NetworkContext::Test, store, SaveScheduler::default(), events)
    }

    fn file_store() -> (Arc<FileSettingsStore>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSettingsStore::new(SettingsPaths::new(dir.path()));
        store.initialize().unwrap();
        (Arc::new(store), dir)
    }

    /// Rewrite a file with a modification time the store has not seen yet.
    fn write_externally(path: &Path, contents: &str) {
        fs::write(path, contents).unwrap();
        let later = SystemTime::now() + Duration::from_secs(5);
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(later)
            .unwrap();
    }

    fn on_disk(store: &FileSettingsStore) -> Vec<String> {
        let value = store.get("testaccounts").unwrap().unwrap();
        let accounts: Vec<Account> = serde_json::from_value(value).unwrap();
        accounts.into_iter().map(|a| a.name).collect()
    }

    #[test]
    fn half_written_file_does_not_wipe_stored_accounts() {
        let (store, _dir) = file_store();
        let registry = file_registry(store.clone());
        registry.add(account("Alice", "GA"));
        registry.add(account("Bob", "GB"));

        let path = store.paths().setting("testaccounts");
        let full = fs::read_to_string(&path).unwrap();
        write_externally(&path, &full[..full.len() / 2]);

        assert_eq!(store.poll_external_changes(), vec!["testaccounts".to_string()]);
        assert_eq!(registry.len(), 2);

        // The other writer finishes, then we mutate.
        write_externally(&path, &full);
        registry.add(account("Carol", "GC"));

        assert_eq!(on_disk(&store), vec!["Alice", "Bob", "Carol"]);
    }

    #[test]
    fn corrupt_file_at_startup_is_preserved() {
        let (store, _dir) = file_store();
        let path = store.paths().setting("testaccounts");
        fs::write(&path, r#"[{"name":"Alice","publicKey":"GA""#).unwrap();

        let registry = file_registry(store.clone());
        assert!(registry.is_empty());

        registry.add(account("Carol", "GC"));

        assert_eq!(on_disk(&store), vec!["Carol"]);
        assert_eq!(
            fs::read_to_string(store.paths().setting("testaccounts.corrupt")).unwrap(),
            r#"[{"name":"Alice","publicKey":"GA""#
        );
    }

    #[test]
    fn valid_external_edit_is_picked_up() {
        let (store, _dir) = file_store();
        let registry = file_registry(store.clone());
        registry.add(account("Alice", "GA"));

        let edited = serde_json::to_string(&vec![account("Dan", "GD")]).unwrap();
        write_externally(&store.paths().setting("testaccounts"), &edited);
        store.poll_external_changes();

        assert_eq!(registry.accounts(), vec![account("Dan", "GD")]);
    }

    #[test]
    fn add_appends_and_persists() {
        let store = Arc::new(MemorySettingsStore::new());
        let (registry, _rx) = registry_with(store.clone());

        registry.add(account("Alice", "GA"));

        assert_eq!(registry.len(), 1);
        // No runtime: the write happens synchronously.
        assert_eq!(persisted(&store, "testaccounts"), vec![account("Alice", "GA")]);
    }

    #[test]
    fn delete_out_of_range_is_noop() {
        let store = Arc::new(MemorySettingsStore::new());
        let (registry, _rx) = registry_with(store.clone());
        registry.add(account("Alice", "GA"));
        registry.add(account("Bob", "GB"));
        let before = registry.accounts();
        let writes = store.writes();

        assert!(!registry.delete(2));
        assert!(!registry.delete(usize::MAX));

        assert_eq!(registry.accounts(), before);
        assert_eq!(store.writes(), writes);
    }

    #[test]
    fn delete_removes_at_index() {
        let store = Arc::new(MemorySettingsStore::new());
        let (registry, _rx) = registry_with(store.clone());
        registry.add(account("Alice", "GA"));
        registry.add(account("Bob", "GB"));

        assert!(registry.delete(0));
        assert_eq!(registry.accounts(), vec![account("Bob", "GB")]);
        assert_eq!(persisted(&store, "testaccounts"), vec![account("Bob", "GB")]);
    }

    #[test]
    fn replace_checks_range() {
        let store = Arc::new(MemorySettingsStore::new());
        let (registry, _rx) = registry_with(store);
        registry.add(account("Alice", "GA"));

        assert!(registry.replace(0, account("Alicia", "GA")));
        assert!(!registry.replace(1, account("Ghost", "GX")));
        assert_eq!(registry.accounts(), vec![account("Alicia", "GA")]);
    }

    #[test]
    fn accounts_returns_a_copy() {
        let store = Arc::new(MemorySettingsStore::new());
        let (registry, _rx) = registry_with(store);
        registry.add(account("Alice", "GA"));

        let mut copy = registry.accounts();
        copy[0].name = "Mallory".to_string();
        copy.clear();

        assert_eq!(registry.accounts(), vec![account("Alice", "GA")]);
    }

    #[test]
    fn external_change_reloads_and_broadcasts() {
        let store = Arc::new(MemorySettingsStore::new());
        let (registry, mut rx) = registry_with(store.clone());
        registry.add(account("Alice", "GA"));

        store.set_external(
            "testaccounts",
            serde_json::to_value(vec![account("Carol", "GC"), account("Dan", "GD")]).unwrap(),
        );

        assert_eq!(registry.len(), 2);
        assert_eq!(
            rx.try_recv().unwrap(),
            AccountEvent::AccountsUpdated {
                network: NetworkContext::Test
            }
        );
    }

    #[test]
    fn changes_to_other_keys_are_ignored() {
        let store = Arc::new(MemorySettingsStore::new());
        let (registry, mut rx) = registry_with(store.clone());

        store.set_external(
            "publicaccounts",
            serde_json::to_value(vec![account("Eve", "GE")]).unwrap(),
        );

        assert!(registry.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn saves_within_window_produce_one_write_with_latest_state() {
        let store = Arc::new(MemorySettingsStore::new());
        let (registry, _rx) = registry_with(store.clone());

        registry.add(account("Alice", "GA"));
        registry.add(account("Bob", "GB"));
        assert_eq!(store.writes(), 0);

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(store.writes(), 1);
        assert_eq!(
            persisted(&store, "testaccounts"),
            vec![account("Alice", "GA"), account("Bob", "GB")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn flush_writes_pending_state_immediately() {
        let store = Arc::new(MemorySettingsStore::new());
        let (registry, _rx) = registry_with(store.clone());

        registry.add(account("Alice", "GA"));
        registry.flush().unwrap();

        assert_eq!(store.writes(), 1);
        assert_eq!(persisted(&store, "testaccounts"), vec![account("Alice", "GA")]);
    }
}
