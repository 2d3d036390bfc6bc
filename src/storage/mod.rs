// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Settings Storage Module
//!
//! Local key-value persistence for the wallet. The account registries store
//! their lists under `testaccounts` and `publicaccounts`.
//!
//! ## Storage Layout
//!
//! ```text
//! <DATA_DIR>/
//!   settings/
//!     testaccounts.json     # Accounts of the test network context
//!     publicaccounts.json   # Accounts of the public network context
//! ```
//!
//! ## Backends
//!
//! - [`FileSettingsStore`]: JSON files, atomic rename, external edit detection
//! - [`MemorySettingsStore`]: in-process, used by tests and ephemeral runs

pub mod file_store;
pub mod paths;
pub mod settings;
pub mod watcher;

pub use file_store::FileSettingsStore;
pub use paths::SettingsPaths;
pub use settings::{
    quarantine_key, MemorySettingsStore, ObserverSet, SettingsError, SettingsObserver,
    SettingsResult, SettingsStore,
};
pub use watcher::SettingsWatcher;
