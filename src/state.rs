// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::accounts::{AccountService, NetworkSwitch, ServiceOptions};
use crate::ledger::NetworkContext;
use crate::storage::{FileSettingsStore, MemorySettingsStore, SettingsStore};

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    /// Runtime network selector shared with `accounts`.
    pub network: NetworkSwitch,
    /// Backing file store, probed by the health check (absent in memory mode).
    pub settings: Option<Arc<FileSettingsStore>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SettingsStore>,
        network: NetworkSwitch,
        options: ServiceOptions,
    ) -> Self {
        let accounts = AccountService::new(store, Arc::new(network.clone()), options);
        Self {
            accounts: Arc::new(accounts),
            network,
            settings: None,
        }
    }

    /// Build state on top of a file store, keeping a handle for health checks.
    pub fn with_file_store(
        store: Arc<FileSettingsStore>,
        network: NetworkSwitch,
        options: ServiceOptions,
    ) -> Self {
        let mut state = Self::new(store.clone(), network, options);
        state.settings = Some(store);
        state
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(
            Arc::new(MemorySettingsStore::new()),
            NetworkSwitch::new(NetworkContext::Test),
            ServiceOptions::default(),
        )
    }
}
