// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stellar Account Manager - Wallet Account Registry Service
//!
//! Keeps the wallet's Stellar accounts for two independent network contexts
//! (test and public), persists each list to local settings with debounced
//! writes, and routes every call to the context selected at call time.
//!
//! ## Modules
//!
//! - `accounts` - Registry, manager and network-context dispatcher
//! - `api` - HTTP API handlers (Axum)
//! - `balance_poller` - Periodic balance refresh
//! - `ledger` - Stellar network types, key pairs and Horizon client
//! - `storage` - Settings persistence (JSON files, external change detection)

pub mod accounts;
pub mod api;
pub mod balance_poller;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod state;
pub mod storage;
