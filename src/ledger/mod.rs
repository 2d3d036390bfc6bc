// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stellar ledger integration.
//!
//! This module provides:
//! - Network context selection (test / public) and endpoints
//! - The key pair abstraction consumed by the account manager
//! - A Horizon client for balances and friendbot funding

pub mod client;
pub mod keypair;
pub mod types;

pub use client::{HorizonClient, HorizonError};
pub use keypair::{KeyPair, KeyPairError, StellarKeyPair};
pub use types::*;
