// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Settings Watcher
//!
//! Background task that polls the file-backed settings store for edits made
//! by other processes and lets the store notify its observers (the account
//! registries reload and broadcast an update).
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown, following
//! the same pattern as the `BalancePoller`.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::FileSettingsStore;

/// Default interval between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Polls a [`FileSettingsStore`] for external changes.
pub struct SettingsWatcher {
    store: Arc<FileSettingsStore>,
    poll_interval: Duration,
}

impl SettingsWatcher {
    pub fn new(store: Arc<FileSettingsStore>) -> Self {
        Self {
            store,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run the watcher loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(watcher.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_ms = self.poll_interval.as_millis() as u64,
            "Settings watcher starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Settings watcher shutting down");
                return;
            }

            let changed = self.store.poll_external_changes();
            if !changed.is_empty() {
                debug!(keys = ?changed, "Settings watcher: external changes applied");
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Settings watcher shutting down");
                    return;
                }
            }
        }
    }
}
