// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File-backed settings store.
//!
//! Each key is stored as one pretty-printed JSON file under
//! `<root>/settings/`. Writes go to a temp file first and are renamed into
//! place, so readers never observe a half-written document.
//!
//! External edits (another wallet process sharing the directory) are detected
//! by comparing file modification times against the last time this store
//! wrote or observed the file; see [`FileSettingsStore::poll_external_changes`].

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use serde_json::Value;

use super::paths::{is_valid_key, SettingsPaths};
use super::settings::{
    quarantine_key, ObserverSet, SettingsError, SettingsObserver, SettingsResult, SettingsStore,
};

/// Settings store persisting one JSON file per key.
pub struct FileSettingsStore {
    paths: SettingsPaths,
    initialized: bool,
    observers: ObserverSet,
    /// Last known modification time per key (`None`: file absent).
    seen: Mutex<HashMap<String, Option<SystemTime>>>,
}

impl FileSettingsStore {
    /// Create a new store. Call `initialize()` before use.
    pub fn new(paths: SettingsPaths) -> Self {
        Self {
            paths,
            initialized: false,
            observers: ObserverSet::new(),
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn paths(&self) -> &SettingsPaths {
        &self.paths
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Create the settings directory. Safe to call multiple times.
    pub fn initialize(&mut self) -> SettingsResult<()> {
        fs::create_dir_all(self.paths.settings_dir())?;
        self.initialized = true;
        Ok(())
    }

    /// Write-read-delete probe of the settings directory.
    pub fn health_check(&self) -> SettingsResult<()> {
        if !self.initialized {
            return Err(SettingsError::NotInitialized);
        }

        let test_file = self.paths.health_check_file();
        let test_data = b"health_check_data";

        fs::write(&test_file, test_data)?;
        let read_data = fs::read(&test_file)?;
        fs::remove_file(&test_file)?;

        if read_data != test_data {
            return Err(SettingsError::IntegrityViolation(
                "Health check data mismatch".to_string(),
            ));
        }

        Ok(())
    }

    /// Notify observers of every subscribed key whose file changed on disk
    /// since this store last wrote or saw it. Returns the changed keys.
    pub fn poll_external_changes(&self) -> Vec<String> {
        let mut changed = Vec::new();

        for key in self.observers.keys() {
            let current = modified_time(&self.paths.setting(&key));
            let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
            let previous = seen.insert(key.clone(), current);
            drop(seen);

            if previous != Some(current) {
                changed.push(key);
            }
        }

        for key in &changed {
            tracing::debug!(key = %key, "Settings changed on disk");
            self.observers.notify(key);
        }

        changed
    }

    fn checked_key(&self, key: &str) -> SettingsResult<()> {
        if !self.initialized {
            return Err(SettingsError::NotInitialized);
        }
        if !is_valid_key(key) {
            return Err(SettingsError::InvalidKey(key.to_string()));
        }
        Ok(())
    }

    fn remember(&self, key: &str) {
        let current = modified_time(&self.paths.setting(key));
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), current);
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: &str) -> SettingsResult<Option<Value>> {
        self.checked_key(key)?;

        let file = match File::open(self.paths.setting(key)) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = serde_json::from_reader(BufReader::new(file))?;
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: Value) -> SettingsResult<()> {
        self.checked_key(key)?;

        let path = self.paths.setting(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &value)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, &path)?;

        self.remember(key);
        Ok(())
    }

    fn subscribe(&self, key: &str, observer: SettingsObserver) {
        // Baseline so the first poll does not report the current file as a change.
        self.remember(key);
        self.observers.add(key, observer);
    }

    /// Renames `<key>.json` to `<key>.corrupt.json` (numbered if taken).
    fn quarantine(&self, key: &str) -> SettingsResult<()> {
        self.checked_key(key)?;

        let aside = quarantine_key(key);
        let mut target = self.paths.setting(&aside);
        let mut n = 1;
        while target.exists() {
            target = self.paths.setting(&format!("{aside}.{n}"));
            n += 1;
        }

        match fs::rename(self.paths.setting(key), &target) {
            Ok(()) => {
                tracing::warn!(key, target = %target.display(), "Moved unreadable setting aside");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        self.remember(key);
        Ok(())
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn test_store() -> (FileSettingsStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut store = FileSettingsStore::new(SettingsPaths::new(dir.path()));
        store.initialize().expect("Failed to initialize test store");
        (store, dir)
    }

    /// Rewrite a file with a modification time that is guaranteed to differ.
    fn write_externally(path: &Path, contents: &str) {
        fs::write(path, contents).unwrap();
        let later = SystemTime::now() + Duration::from_secs(5);
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(later)
            .unwrap();
    }

    #[test]
    fn initialize_creates_settings_dir() {
        let (store, _dir) = test_store();
        assert!(store.paths().settings_dir().exists());
        assert!(store.is_initialized());
    }

    #[test]
    fn missing_key_reads_as_none() {
        let (store, _dir) = test_store();
        assert!(store.get("testaccounts").unwrap().is_none());
    }

    #[test]
    fn set_and_get_json() {
        let (store, _dir) = test_store();
        let value = json!([{ "name": "Alice", "publicKey": "GALICE" }]);

        store.set("testaccounts", value.clone()).unwrap();

        assert_eq!(store.get("testaccounts").unwrap(), Some(value));
        assert!(!store.paths().setting("testaccounts").with_extension("tmp").exists());
    }

    #[test]
    fn health_check_works() {
        let (store, _dir) = test_store();
        store.health_check().expect("Health check should pass");
    }

    #[test]
    fn rejects_path_like_keys() {
        let (store, _dir) = test_store();
        let result = store.set("../escape", json!(1));
        assert!(matches!(result, Err(SettingsError::InvalidKey(_))));
    }

    #[test]
    fn uninitialized_store_returns_error() {
        let store = FileSettingsStore::new(SettingsPaths::new("/tmp/never-init"));
        let result = store.get("testaccounts");
        assert!(matches!(result, Err(SettingsError::NotInitialized)));
    }

    #[test]
    fn corrupt_file_is_a_json_error() {
        let (store, _dir) = test_store();
        fs::write(store.paths().setting("testaccounts"), "{not json").unwrap();
        assert!(matches!(
            store.get("testaccounts"),
            Err(SettingsError::Json(_))
        ));
    }

    #[test]
    fn quarantine_keeps_unreadable_file_aside() {
        let (store, _dir) = test_store();
        fs::write(store.paths().setting("testaccounts"), "{not json").unwrap();
        fs::write(store.paths().setting("testaccounts.corrupt"), "older").unwrap();

        store.quarantine("testaccounts").unwrap();

        assert!(store.get("testaccounts").unwrap().is_none());
        assert_eq!(
            fs::read_to_string(store.paths().setting("testaccounts.corrupt")).unwrap(),
            "older"
        );
        assert_eq!(
            fs::read_to_string(store.paths().setting("testaccounts.corrupt.1")).unwrap(),
            "{not json"
        );

        // Nothing left to move
        store.quarantine("testaccounts").unwrap();
    }

    #[test]
    fn poll_detects_external_edits_but_not_own_writes() {
        let (store, _dir) = test_store();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        store.subscribe(
            "testaccounts",
            Arc::new(move |_key: &str| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );

        store.set("testaccounts", json!([])).unwrap();
        assert!(store.poll_external_changes().is_empty());

        write_externally(&store.paths().setting("testaccounts"), "[]");
        assert_eq!(store.poll_external_changes(), vec!["testaccounts".to_string()]);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Nothing new since the last poll
        assert!(store.poll_external_changes().is_empty());
    }
}
