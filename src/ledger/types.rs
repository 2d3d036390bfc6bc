// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger network types and constants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stellar network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Network passphrase used when signing
    pub passphrase: &'static str,
    /// Horizon endpoint URL
    pub horizon_url: &'static str,
    /// Friendbot endpoint (test network only)
    pub friendbot_url: Option<&'static str>,
}

/// Stellar public network configuration.
pub const STELLAR_PUBLIC: NetworkConfig = NetworkConfig {
    name: "Stellar Public Network",
    passphrase: "Public Global Stellar Network ; September 2015",
    horizon_url: "https://horizon.stellar.org",
    friendbot_url: None,
};

/// Stellar test network configuration.
pub const STELLAR_TESTNET: NetworkConfig = NetworkConfig {
    name: "Stellar Test Network",
    passphrase: "Test SDF Network ; September 2015",
    horizon_url: "https://horizon-testnet.stellar.org",
    friendbot_url: Some("https://horizon-testnet.stellar.org/friendbot"),
};

/// One of the two independent ledger environments.
///
/// Each context owns its own persisted account list and Horizon server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NetworkContext {
    Test,
    Public,
}

impl NetworkContext {
    /// Short identifier, also the prefix of the settings key.
    pub fn as_str(self) -> &'static str {
        match self {
            NetworkContext::Test => "test",
            NetworkContext::Public => "public",
        }
    }

    /// Settings key holding this context's account list (`testaccounts`, `publicaccounts`).
    pub fn accounts_key(self) -> String {
        format!("{}accounts", self.as_str())
    }

    pub fn config(self) -> &'static NetworkConfig {
        match self {
            NetworkContext::Test => &STELLAR_TESTNET,
            NetworkContext::Public => &STELLAR_PUBLIC,
        }
    }

    pub fn from_testnet_flag(is_testnet: bool) -> Self {
        if is_testnet {
            NetworkContext::Test
        } else {
            NetworkContext::Public
        }
    }
}

impl fmt::Display for NetworkContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" | "testnet" => Ok(NetworkContext::Test),
            "public" | "pubnet" | "mainnet" => Ok(NetworkContext::Public),
            other => Err(format!(
                "Unknown network `{other}` (expected `test` or `public`)"
            )),
        }
    }
}

/// Asset descriptor (native lumens or a credit asset with its issuer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Asset {
    Native,
    Credit {
        /// Asset code (e.g. "ETH")
        code: String,
        /// Issuing account public key
        issuer: String,
    },
}

impl Asset {
    pub fn credit(code: impl Into<String>, issuer: impl Into<String>) -> Self {
        Asset::Credit {
            code: code.into(),
            issuer: issuer.into(),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Asset::Native => NATIVE_SYMBOL,
            Asset::Credit { code, .. } => code,
        }
    }
}

/// Symbol used for the native asset in balance lists.
pub const NATIVE_SYMBOL: &str = "XLM";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accounts_key_is_prefixed_by_network() {
        assert_eq!(NetworkContext::Test.accounts_key(), "testaccounts");
        assert_eq!(NetworkContext::Public.accounts_key(), "publicaccounts");
    }

    #[test]
    fn parses_network_names() {
        assert_eq!("test".parse::<NetworkContext>(), Ok(NetworkContext::Test));
        assert_eq!(" TESTNET ".parse::<NetworkContext>(), Ok(NetworkContext::Test));
        assert_eq!("public".parse::<NetworkContext>(), Ok(NetworkContext::Public));
        assert!("fuji".parse::<NetworkContext>().is_err());
    }

    #[test]
    fn only_testnet_has_friendbot() {
        assert!(NetworkContext::Test.config().friendbot_url.is_some());
        assert!(NetworkContext::Public.config().friendbot_url.is_none());
    }

    #[test]
    fn asset_code_for_native_is_xlm() {
        assert_eq!(Asset::Native.code(), "XLM");
        assert_eq!(Asset::credit("LMB", "GISSUER").code(), "LMB");
    }
}
