// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::config::DEFAULT_MESSAGEBOX_HOST;
use crate::sdk::{IdentityProvider, MessageRelayClient};
use crate::session::SessionRegistry;
use crate::storage::CertificationStore;

/// Shared handles passed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CertificationStore>,
    pub sessions: Arc<SessionRegistry>,
    pub wallets: Arc<dyn IdentityProvider>,
    pub relay: Arc<dyn MessageRelayClient>,
    /// Relay host anointed by certifications and recorded in each record.
    pub messagebox_host: String,
}

impl AppState {
    pub fn new(
        store: Arc<CertificationStore>,
        sessions: Arc<SessionRegistry>,
        wallets: Arc<dyn IdentityProvider>,
        relay: Arc<dyn MessageRelayClient>,
    ) -> Self {
        Self {
            store,
            sessions,
            wallets,
            relay,
            messagebox_host: DEFAULT_MESSAGEBOX_HOST.to_string(),
        }
    }

    pub fn with_messagebox_host(mut self, host: impl Into<String>) -> Self {
        self.messagebox_host = host.into();
        self
    }
}
