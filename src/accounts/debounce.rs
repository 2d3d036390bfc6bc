// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Single-slot write scheduler.
//!
//! At most one write is pending at a time. While a write is scheduled,
//! further requests are dropped; the write reads the state when it fires, so
//! everything mutated in between is still persisted. A scheduled write cannot
//! be cancelled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

/// Default debounce window for settings writes.
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(100);

/// Debounces deferred writes behind an in-flight flag.
#[derive(Debug, Clone)]
pub struct SaveScheduler {
    delay: Duration,
    pending: Arc<AtomicBool>,
}

impl Default for SaveScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_DELAY)
    }
}

impl SaveScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether a write is scheduled and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Schedule `write` to run after the debounce delay.
    ///
    /// Returns `false` when a write was already pending (the call is a no-op).
    /// Outside a tokio runtime the write runs immediately.
    pub fn schedule<F>(&self, write: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.pending.swap(true, Ordering::AcqRel) {
            return false;
        }

        match Handle::try_current() {
            Ok(handle) => {
                let pending = self.pending.clone();
                let delay = self.delay;
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    // Cleared before writing so mutations made during the
                    // write schedule a fresh one.
                    pending.store(false, Ordering::Release);
                    write();
                });
            }
            Err(_) => {
                self.pending.store(false, Ordering::Release);
                write();
            }
        }

        true
    }
}
