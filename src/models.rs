// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Account Data Models
//!
//! Persisted account records plus the request and response structures used
//! by the REST API. Persisted types keep the camelCase field names of the
//! settings format so existing account lists load unchanged.
//!
//! ## Model Categories
//!
//! - **Accounts**: key pair records stored per network context
//! - **Balances**: per-asset balances attached to an account
//! - **API**: request/response bodies (never carry secrets outward)

use std::fmt;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ledger::{Asset, NetworkContext, NATIVE_SYMBOL};

/// Amount shown until the first balance refresh completes.
pub const REFRESHING_AMOUNT: &str = "refreshing...";

/// Amount recorded when a balance fetch failed upstream.
pub const ERROR_AMOUNT: &str = "Error";

// =============================================================================
// Balances
// =============================================================================

/// Balance of a single asset held by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AssetBalance {
    /// Asset code ("XLM" for the native asset)
    pub symbol: String,
    /// Amount as a decimal string with trailing zeros stripped
    pub amount: String,
    /// Issuer public key (empty for the native asset)
    #[serde(default)]
    pub issuer: String,
}

impl AssetBalance {
    pub fn new(
        symbol: impl Into<String>,
        amount: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            amount: strip_zeros(&amount.into()),
            issuer: issuer.into(),
        }
    }

    pub fn native(amount: impl Into<String>) -> Self {
        Self::new(NATIVE_SYMBOL, amount, "")
    }

    /// Placeholder attached to freshly added accounts.
    pub fn refreshing() -> Self {
        Self::native(REFRESHING_AMOUNT)
    }

    /// Marker written when the balance could not be fetched.
    pub fn error_marker() -> Self {
        Self::native(ERROR_AMOUNT)
    }

    pub fn is_native(&self) -> bool {
        self.issuer.is_empty()
    }
}

/// Strip trailing fractional zeros ("10.5000000" -> "10.5", "100.000" -> "100").
///
/// Non-numeric markers and integers pass through untouched.
pub fn strip_zeros(amount: &str) -> String {
    let trimmed = amount.trim();
    let numeric = trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || b == b'.' || b == b'-');
    if !numeric || !trimmed.contains('.') {
        return trimmed.to_string();
    }

    let stripped = trimmed.trim_end_matches('0').trim_end_matches('.');
    if stripped.is_empty() || stripped == "-" {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

// =============================================================================
// Accounts
// =============================================================================

/// A key pair tracked by the wallet for one network context.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub name: String,
    pub public_key: String,
    /// Secret seed, empty when the key pair cannot sign (hardware wallets)
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub asset_balances: Vec<AssetBalance>,
    #[serde(default)]
    pub tag: Option<String>,
}

impl Account {
    pub fn can_sign(&self) -> bool {
        !self.secret.is_empty()
    }

    /// Balance entry for the given symbol, if present.
    pub fn balance(&self, symbol: &str) -> Option<&AssetBalance> {
        self.asset_balances.iter().find(|b| b.symbol == symbol)
    }
}

// Secrets never end up in logs.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("name", &self.name)
            .field("public_key", &self.public_key)
            .field("secret", &if self.can_sign() { "<redacted>" } else { "" })
            .field("asset_balances", &self.asset_balances)
            .field("tag", &self.tag)
            .finish()
    }
}

/// Words combined by [`generate_name`].
const NAME_ADJECTIVES: &[&str] = &[
    "Amber", "Ancient", "Bold", "Brave", "Bright", "Calm", "Clever", "Cosmic", "Crimson", "Dapper",
    "Dusty", "Eager", "Electric", "Fancy", "Fearless", "Frosty", "Fuzzy", "Gentle", "Golden",
    "Hasty", "Humble", "Icy", "Jolly", "Keen", "Lively", "Lucky", "Lunar", "Mellow", "Mighty",
    "Misty", "Nimble", "Noble", "Olive", "Patient", "Proud", "Quiet", "Quick", "Rapid", "Rusty",
    "Silent", "Silver", "Sleepy", "Snowy", "Solar", "Stellar", "Sunny", "Swift", "Tidy", "Velvet",
    "Vivid", "Wandering", "Witty", "Zesty",
];

const NAME_NOUNS: &[&str] = &[
    "Albatross", "Badger", "Beacon", "Bison", "Comet", "Condor", "Coyote", "Dolphin", "Falcon",
    "Ferret", "Gecko", "Glacier", "Harbor", "Heron", "Ibis", "Jaguar", "Kestrel", "Koala",
    "Lantern", "Lynx", "Marlin", "Meadow", "Meteor", "Nebula", "Ocelot", "Orca", "Otter", "Panda",
    "Pelican", "Puffin", "Quasar", "Quokka", "Raven", "Reef", "Salmon", "Sparrow", "Summit",
    "Tapir", "Tiger", "Toucan", "Tundra", "Valley", "Vulture", "Walrus", "Willow", "Wombat",
    "Yak", "Zebra",
];

/// Generate a human-readable account name ("Brave Otter").
pub fn generate_name() -> String {
    let mut rng = rand::thread_rng();
    let adjective = NAME_ADJECTIVES.choose(&mut rng).copied().unwrap_or("New");
    let noun = NAME_NOUNS.choose(&mut rng).copied().unwrap_or("Account");
    format!("{adjective} {noun}")
}

// =============================================================================
// API Models
// =============================================================================

/// Account as returned to API clients (never includes the secret).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub name: String,
    pub public_key: String,
    /// Whether a secret seed is stored for this account
    pub can_sign: bool,
    pub asset_balances: Vec<AssetBalance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            can_sign: account.can_sign(),
            name: account.name,
            public_key: account.public_key,
            asset_balances: account.asset_balances,
            tag: account.tag,
        }
    }
}

/// Request to add an existing key pair to the current network context.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddAccountRequest {
    /// Stellar public key (G...)
    pub public_key: String,
    /// Optional secret seed (S...); omit for watch-only or hardware accounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Request to create a friendbot-funded test account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTestAccountRequest {
    pub public_key: String,
    pub secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Currently selected network context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NetworkResponse {
    pub network: NetworkContext,
    /// Display name of the network
    pub name: String,
    pub horizon_url: String,
}

/// Request to switch the network context.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SwitchNetworkRequest {
    pub network: NetworkContext,
}

/// Assets issued by the well-known reserve issuer account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReserveAssetsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ethereum: Option<Asset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitcoin: Option<Asset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lambo_token: Option<Asset>,
}

/// Outcome of a balance refresh sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RefreshSummary {
    pub network: NetworkContext,
    /// Accounts whose balances were fetched
    pub refreshed: usize,
    /// Accounts marked with the error balance
    pub failed: usize,
}
