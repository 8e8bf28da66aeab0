// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Sweeper
//!
//! Background task that periodically evicts idle wallet sessions so
//! abandoned connects do not accumulate. Reads already treat idle sessions
//! as absent; the sweep only reclaims their memory.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken`, like every other background
//! loop in the service.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::SessionRegistry;

/// Default interval between sweeps (5 minutes).
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

pub struct SessionSweeper {
    registry: Arc<SessionRegistry>,
    interval: Duration,
}

impl SessionSweeper {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self {
            registry,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run the sweep loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            timeout_secs = self.registry.timeout().num_seconds(),
            "Session sweeper starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Session sweeper shutting down");
                    return;
                }
            }

            self.sweep_step();
        }
    }

    fn sweep_step(&self) {
        let removed = self.registry.sweep_expired();
        if removed > 0 {
            info!(
                removed,
                remaining = self.registry.active_session_count(),
                "Cleaned up expired wallet sessions"
            );
        } else {
            debug!("Session sweep found nothing to evict");
        }
    }
}
