// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Network-context dispatcher.
//!
//! [`AccountService`] exposes the account manager contract as one facade and
//! routes every call to the manager of the network context that is current
//! *at call time*. Per-context state (registry, manager, Horizon client) is
//! created on first use, so nothing is read from storage before the service is
//! actually asked for accounts.
//!
//! The two contexts never share state: different storage keys, lists and
//! debounce timers. The same public key may exist in both.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{info, warn};

use super::debounce::{SaveScheduler, DEFAULT_SAVE_DELAY};
use super::manager::AccountManager;
use super::registry::AccountRegistry;
use super::AccountEvent;
use crate::error::AccountsError;
use crate::ledger::{Asset, HorizonClient, HorizonError, KeyPair, KeyPairError, NetworkContext};
use crate::models::{Account, AssetBalance, RefreshSummary};
use crate::storage::{SettingsResult, SettingsStore};

/// Capacity of the account event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Source of the "is test network" flag, read on every dispatch.
pub trait NetworkSelector: Send + Sync {
    fn is_testnet(&self) -> bool;
}

/// Runtime-switchable network flag.
#[derive(Debug, Clone)]
pub struct NetworkSwitch {
    testnet: Arc<AtomicBool>,
}

impl NetworkSwitch {
    pub fn new(network: NetworkContext) -> Self {
        Self {
            testnet: Arc::new(AtomicBool::new(network == NetworkContext::Test)),
        }
    }

    pub fn set(&self, network: NetworkContext) {
        self.testnet
            .store(network == NetworkContext::Test, Ordering::Release);
    }

    pub fn current(&self) -> NetworkContext {
        NetworkContext::from_testnet_flag(self.is_testnet())
    }
}

impl NetworkSelector for NetworkSwitch {
    fn is_testnet(&self) -> bool {
        self.testnet.load(Ordering::Acquire)
    }
}

/// Endpoints and timings used when building per-context state.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub save_delay: Duration,
    pub horizon_testnet_url: String,
    pub horizon_public_url: String,
    pub friendbot_url: String,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            save_delay: DEFAULT_SAVE_DELAY,
            horizon_testnet_url: NetworkContext::Test.config().horizon_url.to_string(),
            horizon_public_url: NetworkContext::Public.config().horizon_url.to_string(),
            friendbot_url: NetworkContext::Test
                .config()
                .friendbot_url
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Lazily created state of one network context.
struct ContextSlot {
    manager: OnceLock<AccountManager>,
    horizon: OnceLock<HorizonClient>,
}

impl ContextSlot {
    fn new() -> Self {
        Self {
            manager: OnceLock::new(),
            horizon: OnceLock::new(),
        }
    }
}

/// Account manager facade dispatching on the current network context.
pub struct AccountService {
    store: Arc<dyn SettingsStore>,
    selector: Arc<dyn NetworkSelector>,
    options: ServiceOptions,
    events: broadcast::Sender<AccountEvent>,
    test: ContextSlot,
    public: ContextSlot,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn SettingsStore>,
        selector: Arc<dyn NetworkSelector>,
        options: ServiceOptions,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            selector,
            options,
            events,
            test: ContextSlot::new(),
            public: ContextSlot::new(),
        }
    }

    /// Network context that calls are routed to right now.
    pub fn current_network(&self) -> NetworkContext {
        NetworkContext::from_testnet_flag(self.selector.is_testnet())
    }

    /// Receive "accounts updated" events from both contexts.
    pub fn subscribe(&self) -> broadcast::Receiver<AccountEvent> {
        self.events.subscribe()
    }

    /// Manager of the current context, created on first use.
    pub fn manager(&self) -> &AccountManager {
        self.manager_for(self.current_network())
    }

    pub fn manager_for(&self, network: NetworkContext) -> &AccountManager {
        self.slot(network).manager.get_or_init(|| {
            info!(network = %network, "Initializing account manager");
            let registry = AccountRegistry::new(
                network,
                self.store.clone(),
                SaveScheduler::new(self.options.save_delay),
                self.events.clone(),
            );
            AccountManager::new(registry)
        })
    }

    /// Raw registry of the current context (list views).
    pub fn registry(&self) -> &AccountRegistry {
        self.manager().registry()
    }

    /// Horizon client of the given context, created on first use.
    pub fn horizon_for(&self, network: NetworkContext) -> Result<&HorizonClient, HorizonError> {
        let slot = self.slot(network);
        if let Some(client) = slot.horizon.get() {
            return Ok(client);
        }

        let client = match network {
            NetworkContext::Test => {
                let friendbot =
                    Some(self.options.friendbot_url.as_str()).filter(|u| !u.is_empty());
                HorizonClient::new(network, &self.options.horizon_testnet_url, friendbot)?
            }
            NetworkContext::Public => {
                HorizonClient::new(network, &self.options.horizon_public_url, None)?
            }
        };
        Ok(slot.horizon.get_or_init(|| client))
    }

    // ========== Manager Contract ==========

    pub fn add_account<K>(
        &self,
        key_pair: &K,
        name: Option<&str>,
        tag: Option<&str>,
    ) -> Result<Option<Account>, KeyPairError>
    where
        K: KeyPair + ?Sized,
    {
        self.manager().add_account(key_pair, name, tag)
    }

    pub fn delete_account(&self, public_key: &str) {
        self.manager().delete_account(public_key)
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.manager().accounts()
    }

    pub fn account_with_name(&self, name: &str) -> Option<Account> {
        self.manager().account_with_name(name)
    }

    pub fn account_with_public_key(&self, public_key: &str) -> Option<Account> {
        self.manager().account_with_public_key(public_key)
    }

    pub fn update_balance(
        &self,
        public_key: &str,
        balance: Option<AssetBalance>,
        remove_all: bool,
    ) {
        self.manager().update_balance(public_key, balance, remove_all)
    }

    pub fn ethereum_asset(&self) -> Option<Asset> {
        self.manager().ethereum_asset()
    }

    pub fn bitcoin_asset(&self) -> Option<Asset> {
        self.manager().bitcoin_asset()
    }

    pub fn lambo_token_asset(&self) -> Option<Asset> {
        self.manager().lambo_token_asset()
    }

    // ========== Ledger Operations ==========

    /// Fetch balances for every account of the current context.
    ///
    /// The context is fixed when the sweep starts; switching networks midway
    /// does not redirect updates. Failed fetches record the error marker.
    pub async fn refresh_balances(&self) -> Result<RefreshSummary, AccountsError> {
        let network = self.current_network();
        let manager = self.manager_for(network);
        let horizon = self.horizon_for(network)?;

        let mut summary = RefreshSummary {
            network,
            refreshed: 0,
            failed: 0,
        };

        for account in manager.accounts() {
            if refresh_account(manager, horizon, &account.public_key).await {
                summary.refreshed += 1;
            } else {
                summary.failed += 1;
            }
        }

        info!(
            network = %network,
            refreshed = summary.refreshed,
            failed = summary.failed,
            "Balance refresh complete"
        );
        Ok(summary)
    }

    /// Add a key pair on the test network and fund it through friendbot.
    ///
    /// If funding or the first balance fetch fails the freshly added account
    /// is removed again and the error is returned.
    pub async fn create_test_account<K>(
        &self,
        key_pair: &K,
        name: Option<&str>,
    ) -> Result<Account, AccountsError>
    where
        K: KeyPair + ?Sized,
    {
        let network = self.current_network();
        if network != NetworkContext::Test {
            return Err(AccountsError::TestNetworkOnly);
        }

        let manager = self.manager_for(network);
        let horizon = self.horizon_for(network)?;
        let public_key = key_pair.public_key();

        if manager.add_account(key_pair, name, None)?.is_none() {
            return Err(AccountsError::AlreadyExists(public_key));
        }

        let funded = async {
            horizon.fund_with_friendbot(&public_key).await?;
            horizon.balances(&public_key).await
        }
        .await;

        match funded {
            Ok(balances) => {
                apply_balances(manager, &public_key, balances);
                manager
                    .account_with_public_key(&public_key)
                    .ok_or(AccountsError::NotFound(public_key))
            }
            Err(e) => {
                warn!(
                    network = %network,
                    public_key = %public_key,
                    error = %e,
                    "Test account funding failed, discarding account"
                );
                manager.delete_account(&public_key);
                Err(e.into())
            }
        }
    }

    /// Write pending state of every initialized context now.
    pub fn flush(&self) -> SettingsResult<()> {
        for slot in [&self.test, &self.public] {
            if let Some(manager) = slot.manager.get() {
                manager.registry().flush()?;
            }
        }
        Ok(())
    }

    fn slot(&self, network: NetworkContext) -> &ContextSlot {
        match network {
            NetworkContext::Test => &self.test,
            NetworkContext::Public => &self.public,
        }
    }
}

/// Returns `false` when the fetch failed and the error marker was written.
async fn refresh_account(
    manager: &AccountManager,
    horizon: &HorizonClient,
    public_key: &str,
) -> bool {
    match horizon.balances(public_key).await {
        Ok(balances) => {
            apply_balances(manager, public_key, balances);
            true
        }
        Err(e) => {
            warn!(
                network = %manager.network(),
                public_key = %public_key,
                error = %e,
                "Balance fetch failed"
            );
            manager.update_balance(public_key, None, true);
            false
        }
    }
}

/// First balance replaces the list, the rest are appended.
fn apply_balances(manager: &AccountManager, public_key: &str, balances: Vec<AssetBalance>) {
    if balances.is_empty() {
        manager.update_balance(public_key, Some(AssetBalance::native("0")), true);
        return;
    }

    for (i, balance) in balances.into_iter().enumerate() {
        manager.update_balance(public_key, Some(balance), i == 0);
    }
}
