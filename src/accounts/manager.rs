// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account operations for one network context.
//!
//! Business rules the registry does not know about: duplicate prevention by
//! public key, placeholder balances for new accounts, balance updates and the
//! reserve-issuer asset lookups.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, info};

use super::registry::AccountRegistry;
use crate::ledger::{Asset, KeyPair, KeyPairError, NetworkContext};
use crate::models::{generate_name, Account, AssetBalance};

/// Name of the account issuing the reserve-backed assets.
pub const RESERVE_ISSUER_NAME: &str = "Issuer: LMB";

pub const ETHEREUM_CODE: &str = "ETH";
pub const BITCOIN_CODE: &str = "BTC";
pub const LAMBO_TOKEN_CODE: &str = "LMB";

/// Higher-level account operations layered on an [`AccountRegistry`].
pub struct AccountManager {
    registry: AccountRegistry,
    /// Serializes read-modify-write sequences (lookup then mutate).
    write_guard: Mutex<()>,
}

impl AccountManager {
    pub fn new(registry: AccountRegistry) -> Self {
        Self {
            registry,
            write_guard: Mutex::new(()),
        }
    }

    pub fn network(&self) -> NetworkContext {
        self.registry.network()
    }

    /// Raw registry access for list views.
    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    /// Add a key pair as a new account.
    ///
    /// Returns `Ok(None)` when an account with the same public key already
    /// exists. Errors raised by the key pair itself are passed through.
    pub fn add_account<K>(
        &self,
        key_pair: &K,
        name: Option<&str>,
        tag: Option<&str>,
    ) -> Result<Option<Account>, KeyPairError>
    where
        K: KeyPair + ?Sized,
    {
        // Asking a non-signing key pair for its secret is an error.
        let secret = if key_pair.can_sign() {
            key_pair.secret()?
        } else {
            String::new()
        };
        let public_key = key_pair.public_key();

        let _guard = self.write_guard.lock().unwrap_or_else(PoisonError::into_inner);
        if self.index_of(&public_key).is_some() {
            debug!(network = %self.network(), public_key = %public_key, "Account already exists");
            return Ok(None);
        }

        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => generate_name(),
        };

        let account = Account {
            name,
            public_key,
            secret,
            asset_balances: vec![AssetBalance::refreshing()],
            tag: tag.map(str::to_string),
        };
        self.registry.add(account.clone());

        info!(
            network = %self.network(),
            public_key = %account.public_key,
            can_sign = account.can_sign(),
            "Account added"
        );
        Ok(Some(account))
    }

    /// Delete the account with this public key; unknown keys are ignored.
    pub fn delete_account(&self, public_key: &str) {
        let _guard = self.write_guard.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(index) = self.index_of(public_key) {
            self.registry.delete(index);
            info!(network = %self.network(), public_key = %public_key, "Account deleted");
        }
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.registry.accounts()
    }

    pub fn account_with_name(&self, name: &str) -> Option<Account> {
        self.accounts().into_iter().find(|a| a.name == name)
    }

    pub fn account_with_public_key(&self, public_key: &str) -> Option<Account> {
        self.accounts().into_iter().find(|a| a.public_key == public_key)
    }

    /// Append a balance entry to an account, optionally clearing the old ones.
    ///
    /// `None` records the error marker (the upstream fetch failed). The whole
    /// account is written back through the registry. Unknown keys are ignored.
    pub fn update_balance(
        &self,
        public_key: &str,
        balance: Option<AssetBalance>,
        remove_all: bool,
    ) {
        let _guard = self.write_guard.lock().unwrap_or_else(PoisonError::into_inner);
        let accounts = self.accounts();
        let Some(index) = accounts.iter().position(|a| a.public_key == public_key) else {
            debug!(
                network = %self.network(),
                public_key = %public_key,
                "Balance for unknown account ignored"
            );
            return;
        };

        let mut account = accounts[index].clone();
        if remove_all {
            account.asset_balances.clear();
        }

        let balance = balance.unwrap_or_else(AssetBalance::error_marker);
        account
            .asset_balances
            .push(AssetBalance::new(balance.symbol, balance.amount, balance.issuer));

        self.registry.replace(index, account);
    }

    pub fn ethereum_asset(&self) -> Option<Asset> {
        self.reserve_asset(ETHEREUM_CODE)
    }

    pub fn bitcoin_asset(&self) -> Option<Asset> {
        self.reserve_asset(BITCOIN_CODE)
    }

    pub fn lambo_token_asset(&self) -> Option<Asset> {
        self.reserve_asset(LAMBO_TOKEN_CODE)
    }

    fn reserve_asset(&self, code: &str) -> Option<Asset> {
        self.account_with_name(RESERVE_ISSUER_NAME)
            .map(|issuer| Asset::credit(code, issuer.public_key))
    }

    fn index_of(&self, public_key: &str) -> Option<usize> {
        self.accounts()
            .iter()
            .position(|a| a.public_key == public_key)
    }
}
