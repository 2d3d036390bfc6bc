// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Accounts
//!
//! The wallet's account bookkeeping, layered bottom-up:
//!
//! - [`SaveScheduler`]: single-slot debounce for settings writes
//! - [`AccountRegistry`]: in-memory list per network context, persisted under
//!   `<network>accounts`, reloaded on external changes
//! - [`AccountManager`]: duplicate prevention, balances, reserve-issuer assets
//! - [`AccountService`]: dispatches to the manager of the current network

pub mod debounce;
pub mod manager;
pub mod registry;
pub mod service;

pub use debounce::{SaveScheduler, DEFAULT_SAVE_DELAY};
pub use manager::{AccountManager, RESERVE_ISSUER_NAME};
pub use registry::AccountRegistry;
pub use service::{AccountService, NetworkSelector, NetworkSwitch, ServiceOptions};

use crate::ledger::NetworkContext;

/// Domain events broadcast to listeners such as UI layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEvent {
    /// The stored account list of `network` changed externally and was reloaded.
    AccountsUpdated { network: NetworkContext },
}
