// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixture wiring an [`AppState`] to in-memory storage and SDK doubles.

use std::sync::Arc;

use axum::Router;

use crate::sdk::mock::{MockIdentityProvider, MockRelay};
use crate::session::clock::ManualClock;
use crate::session::SessionRegistry;
use crate::state::AppState;
use crate::storage::CertificationStore;

pub const TEST_HOST: &str = "https://relay.test";

pub struct TestApp {
    pub state: AppState,
    pub relay: Arc<MockRelay>,
    pub wallets: Arc<MockIdentityProvider>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_relay(MockRelay::new())
    }

    pub fn with_relay(relay: MockRelay) -> Self {
        let relay = Arc::new(relay);
        let wallets = Arc::new(MockIdentityProvider::new());
        let clock = Arc::new(ManualClock::new());
        let sessions = Arc::new(SessionRegistry::new(wallets.clone()).with_clock(clock.clone()));
        let store = Arc::new(CertificationStore::in_memory().expect("in-memory store"));

        let state = AppState::new(store, sessions, wallets.clone(), relay.clone())
            .with_messagebox_host(TEST_HOST);

        Self {
            state,
            relay,
            wallets,
            clock,
        }
    }

    pub fn router(&self) -> Router {
        super::router(self.state.clone())
    }

    /// Open a session directly in the registry.
    pub fn connect(&self, identity: &str) -> String {
        self.state
            .sessions
            .create_session_with_identity(identity.into())
            .expect("session created")
    }
}
