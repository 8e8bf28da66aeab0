// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session registry with idle-timeout expiry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use tracing::{debug, info};

use super::clock::{Clock, SystemClock};
use crate::models::{truncate, IdentityKey};
use crate::sdk::{IdentityProvider, WalletHandle};

/// Idle time after which a session is treated as gone (30 minutes).
pub const DEFAULT_SESSION_TIMEOUT: TimeDelta = TimeDelta::minutes(30);

/// Random bytes per session token (hex encoded, 64 chars).
const SESSION_ID_BYTES: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to generate session id")]
    Entropy,
}

/// Public view of a live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub identity_key: IdentityKey,
    pub created_at: DateTime<Utc>,
}

struct WalletSession {
    identity_key: IdentityKey,
    wallet: Option<Arc<dyn WalletHandle>>,
    created_at: DateTime<Utc>,
    last_accessed_at: DateTime<Utc>,
}

/// Maps session tokens to identities and wallet handles.
///
/// One mutex guards the whole map, so an expiry check and the refresh or
/// handle creation that follows it happen atomically per lookup, and the
/// sweep never races a reader.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, WalletSession>>,
    wallets: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
    timeout: TimeDelta,
    rng: SystemRandom,
}

impl SessionRegistry {
    pub fn new(wallets: Arc<dyn IdentityProvider>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            wallets,
            clock: Arc::new(SystemClock),
            timeout: DEFAULT_SESSION_TIMEOUT,
            rng: SystemRandom::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: TimeDelta) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn timeout(&self) -> TimeDelta {
        self.timeout
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, WalletSession>> {
        // The map holds no invariants a panicking holder could break halfway.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, session: &WalletSession, now: DateTime<Utc>) -> bool {
        now - session.last_accessed_at > self.timeout
    }

    fn generate_session_id(&self) -> Result<String, SessionError> {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        self.rng.fill(&mut bytes).map_err(|_| SessionError::Entropy)?;
        Ok(hex::encode(bytes))
    }

    /// Open a session for an identity key obtained by the client's wallet.
    ///
    /// The key is not verified here. No wallet handle is created until the
    /// session is first used.
    pub fn create_session_with_identity(
        &self,
        identity_key: IdentityKey,
    ) -> Result<String, SessionError> {
        let session_id = self.generate_session_id()?;
        let now = self.clock.now();

        info!(
            session = %truncate(&session_id, 8),
            identity_key = %identity_key.short(),
            "Wallet session created"
        );

        self.sessions().insert(
            session_id.clone(),
            WalletSession {
                identity_key,
                wallet: None,
                created_at: now,
                last_accessed_at: now,
            },
        );

        Ok(session_id)
    }

    /// Wallet handle for a live session, creating it on first use.
    ///
    /// Refreshes the idle window. An expired session is removed and `None`
    /// is returned.
    pub fn get_wallet_client(&self, session_id: &str) -> Option<Arc<dyn WalletHandle>> {
        let now = self.clock.now();
        let mut sessions = self.sessions();

        let expired = self.is_expired(sessions.get(session_id)?, now);
        if expired {
            sessions.remove(session_id);
            info!(session = %truncate(session_id, 8), "Wallet session expired");
            return None;
        }

        let session = sessions.get_mut(session_id)?;
        session.last_accessed_at = now;
        let wallet = session
            .wallet
            .get_or_insert_with(|| {
                debug!(session = %truncate(session_id, 8), "Creating wallet handle for session");
                self.wallets.create_wallet()
            })
            .clone();
        Some(wallet)
    }

    /// Identity and creation time of a live session.
    ///
    /// Does not refresh the idle window, so status polling alone cannot keep
    /// a session alive.
    pub fn get_session_info(&self, session_id: &str) -> Option<SessionInfo> {
        let now = self.clock.now();
        let mut sessions = self.sessions();

        let session = sessions.get(session_id)?;
        if self.is_expired(session, now) {
            sessions.remove(session_id);
            info!(session = %truncate(session_id, 8), "Wallet session expired");
            return None;
        }

        Some(SessionInfo {
            identity_key: session.identity_key.clone(),
            created_at: session.created_at,
        })
    }

    /// Remove a session. Returns whether one existed.
    pub fn delete_session(&self, session_id: &str) -> bool {
        let deleted = self.sessions().remove(session_id).is_some();
        if deleted {
            info!(session = %truncate(session_id, 8), "Wallet session deleted");
        }
        deleted
    }

    /// Evict every session idle for longer than the timeout.
    /// Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions();
        let before = sessions.len();
        sessions.retain(|_, session| now - session.last_accessed_at <= self.timeout);
        before - sessions.len()
    }

    /// Sessions currently held, including expired ones not yet swept.
    pub fn active_session_count(&self) -> usize {
        self.sessions().len()
    }
}
