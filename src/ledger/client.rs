// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Horizon API client for balance lookups and test-network funding.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use super::types::{NetworkContext, NATIVE_SYMBOL};
use crate::models::AssetBalance;

/// Timeout applied to every Horizon request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Horizon client bound to one network context.
#[derive(Debug, Clone)]
pub struct HorizonClient {
    network: NetworkContext,
    horizon_url: Url,
    friendbot_url: Option<Url>,
    http: Client,
}

impl HorizonClient {
    /// Create a client for the given Horizon (and optional friendbot) endpoint.
    pub fn new(
        network: NetworkContext,
        horizon_url: &str,
        friendbot_url: Option<&str>,
    ) -> Result<Self, HorizonError> {
        let horizon_url = parse_url(horizon_url)?;
        let friendbot_url = friendbot_url.map(parse_url).transpose()?;

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| HorizonError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            network,
            horizon_url,
            friendbot_url,
            http,
        })
    }

    /// Client using the built-in endpoints for a network context.
    pub fn for_network(network: NetworkContext) -> Result<Self, HorizonError> {
        let config = network.config();
        Self::new(network, config.horizon_url, config.friendbot_url)
    }

    pub fn network(&self) -> NetworkContext {
        self.network
    }

    pub fn horizon_url(&self) -> &Url {
        &self.horizon_url
    }

    /// Fetch all balances of an account in Horizon's order (native last).
    pub async fn balances(&self, public_key: &str) -> Result<Vec<AssetBalance>, HorizonError> {
        let url = self.endpoint(&format!("accounts/{public_key}"))?;
        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| HorizonError::Request(format!("GET account {public_key} failed: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(HorizonError::AccountNotFound(public_key.to_string()));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(HorizonError::Request(format!(
                "GET account {public_key} returned {status}: {body}"
            )));
        }

        let account: HorizonAccount = response
            .json()
            .await
            .map_err(|e| HorizonError::InvalidResponse(format!("account {public_key}: {e}")))?;

        Ok(account.into_asset_balances())
    }

    /// Ask friendbot to create and fund an account (test network only).
    pub async fn fund_with_friendbot(&self, public_key: &str) -> Result<(), HorizonError> {
        let mut url = self
            .friendbot_url
            .clone()
            .ok_or(HorizonError::FriendbotUnavailable(self.network))?;
        url.query_pairs_mut().append_pair("addr", public_key);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| HorizonError::Request(format!("friendbot request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(HorizonError::Request(format!(
                "friendbot returned {status}: {body}"
            )));
        }

        tracing::info!(
            network = %self.network,
            public_key = %public_key,
            "Friendbot funded account"
        );
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, HorizonError> {
        let base = self.horizon_url.as_str().trim_end_matches('/');
        parse_url(&format!("{base}/{path}"))
    }
}

fn parse_url(raw: &str) -> Result<Url, HorizonError> {
    raw.parse()
        .map_err(|e: url::ParseError| HorizonError::InvalidUrl(format!("{raw}: {e}")))
}

/// Subset of the Horizon account resource used here.
#[derive(Debug, Deserialize)]
struct HorizonAccount {
    #[serde(default)]
    balances: Vec<HorizonBalance>,
}

#[derive(Debug, Deserialize)]
struct HorizonBalance {
    balance: String,
    asset_type: String,
    #[serde(default)]
    asset_code: Option<String>,
    #[serde(default)]
    asset_issuer: Option<String>,
}

impl HorizonAccount {
    fn into_asset_balances(self) -> Vec<AssetBalance> {
        self.balances
            .into_iter()
            .filter_map(HorizonBalance::into_asset_balance)
            .collect()
    }
}

impl HorizonBalance {
    /// Liquidity pool shares carry no asset code and are skipped.
    fn into_asset_balance(self) -> Option<AssetBalance> {
        if self.asset_type == "native" {
            return Some(AssetBalance::native(self.balance));
        }

        let code = self.asset_code?;
        Some(AssetBalance::new(
            code,
            self.balance,
            self.asset_issuer.unwrap_or_default(),
        ))
    }
}

/// Errors that can occur while talking to Horizon.
#[derive(Debug, thiserror::Error)]
pub enum HorizonError {
    #[error("Invalid Horizon URL: {0}")]
    InvalidUrl(String),

    #[error("Account not found on ledger: {0}")]
    AccountNotFound(String),

    #[error("Friendbot is not available on the {0} network")]
    FriendbotUnavailable(NetworkContext),

    #[error("Horizon request failed: {0}")]
    Request(String),

    #[error("Horizon response was invalid: {0}")]
    InvalidResponse(String),
}
