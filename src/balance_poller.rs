// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Balance Poller
//!
//! Background task that periodically refreshes the balances of every account
//! in the current network context from Horizon, so list views stay current
//! without a client asking for a refresh.
//!
//! ## Strategy
//!
//! Every `poll_interval` (default 60 s) the poller calls
//! [`AccountService::refresh_balances`]. The network context is read at the
//! start of each sweep, so a network switch takes effect on the next sweep.
//! Accounts whose fetch fails get the error balance marker.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown, following
//! the same pattern as the `SettingsWatcher`.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::accounts::AccountService;

/// Default interval between refresh sweeps.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Background balance refresher.
pub struct BalancePoller {
    service: Arc<AccountService>,
    poll_interval: Duration,
}

impl BalancePoller {
    pub fn new(service: Arc<AccountService>) -> Self {
        Self {
            service,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run the poller loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(poller.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "Balance poller starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Balance poller shutting down");
                return;
            }

            self.poll_step().await;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Balance poller shutting down");
                    return;
                }
            }
        }
    }

    /// Execute one sweep over the current network's accounts.
    async fn poll_step(&self) {
        if self.service.accounts().is_empty() {
            return;
        }

        match self.service.refresh_balances().await {
            Ok(summary) if summary.failed > 0 => {
                warn!(
                    network = %summary.network,
                    refreshed = summary.refreshed,
                    failed = summary.failed,
                    "Balance poller: some accounts could not be refreshed"
                );
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Balance poller: refresh failed");
            }
        }
    }
}
