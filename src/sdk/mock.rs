// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process SDK doubles for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{
    IdentityProvider, InternalizeRequest, MessageRelayClient, SdkError, SdkResult, WalletHandle,
};
use crate::models::{IdentityKey, RelayMessage};

/// Wallet with a fixed identity that records internalized payments.
pub struct MockWallet {
    identity: IdentityKey,
    pub internalized: Mutex<Vec<InternalizeRequest>>,
    pub fail_internalize: bool,
}

impl MockWallet {
    pub fn new(identity: impl Into<IdentityKey>) -> Self {
        Self {
            identity: identity.into(),
            internalized: Mutex::new(Vec::new()),
            fail_internalize: false,
        }
    }
}

#[async_trait]
impl WalletHandle for MockWallet {
    async fn identity_key(&self) -> SdkResult<IdentityKey> {
        Ok(self.identity.clone())
    }

    async fn internalize_payment(&self, request: &InternalizeRequest) -> SdkResult<()> {
        if self.fail_internalize {
            return Err(SdkError::Rejected("internalize refused".into()));
        }
        self.internalized.lock().unwrap().push(request.clone());
        Ok(())
    }
}

/// Creates wallets with sequential identities `02mock0`, `02mock1`, ...
#[derive(Default)]
pub struct MockIdentityProvider {
    created: AtomicUsize,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl IdentityProvider for MockIdentityProvider {
    fn create_wallet(&self) -> Arc<dyn WalletHandle> {
        let n = self.created.fetch_add(1, Ordering::SeqCst);
        Arc::new(MockWallet::new(format!("02mock{n}")))
    }
}

/// A payment observed by [`MockRelay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPayment {
    pub sender: IdentityKey,
    pub recipient: IdentityKey,
    pub amount: u64,
}

/// Relay double: anoints, records payments and serves canned inboxes.
#[derive(Default)]
pub struct MockRelay {
    calls: AtomicUsize,
    pub fail: bool,
    pub anointed: Mutex<Vec<(IdentityKey, String)>>,
    pub payments: Mutex<Vec<SentPayment>>,
    pub inboxes: Mutex<HashMap<String, Vec<RelayMessage>>>,
    pub acknowledged: Mutex<Vec<String>>,
}

impl MockRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Total number of relay operations invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn deliver(&self, message_box: &str, message: RelayMessage) {
        self.inboxes
            .lock()
            .unwrap()
            .entry(message_box.to_string())
            .or_default()
            .push(message);
    }

    fn enter(&self) -> SdkResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(SdkError::Transport("relay unreachable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MessageRelayClient for MockRelay {
    async fn anoint_host(&self, wallet: &dyn WalletHandle, host: &str) -> SdkResult<String> {
        self.enter()?;
        let identity = wallet.identity_key().await?;
        let mut anointed = self.anointed.lock().unwrap();
        anointed.push((identity, host.to_string()));
        Ok(format!("txid-{}", anointed.len()))
    }

    async fn send_payment(
        &self,
        wallet: &dyn WalletHandle,
        recipient: &IdentityKey,
        amount: u64,
    ) -> SdkResult<String> {
        self.enter()?;
        let sender = wallet.identity_key().await?;
        let mut payments = self.payments.lock().unwrap();
        payments.push(SentPayment {
            sender,
            recipient: recipient.clone(),
            amount,
        });
        Ok(format!("msg-{}", payments.len()))
    }

    async fn list_messages(
        &self,
        _wallet: &dyn WalletHandle,
        message_box: &str,
    ) -> SdkResult<Vec<RelayMessage>> {
        self.enter()?;
        Ok(self
            .inboxes
            .lock()
            .unwrap()
            .get(message_box)
            .cloned()
            .unwrap_or_default())
    }

    async fn acknowledge_messages(
        &self,
        _wallet: &dyn WalletHandle,
        message_ids: &[String],
    ) -> SdkResult<()> {
        self.enter()?;
        let mut inboxes = self.inboxes.lock().unwrap();
        for messages in inboxes.values_mut() {
            messages.retain(|m| {
                m.message_id
                    .as_ref()
                    .map_or(true, |id| !message_ids.contains(id))
            });
        }
        self.acknowledged
            .lock()
            .unwrap()
            .extend(message_ids.iter().cloned());
        Ok(())
    }
}
