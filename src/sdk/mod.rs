// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet & Message-Relay Capabilities
//!
//! The wallet SDK and the message-box SDK are external collaborators. This
//! module names the operations the service consumes from them and nothing
//! more; signing, transaction construction and the relay wire protocol stay
//! on the other side of these traits.
//!
//! - [`IdentityProvider`] hands out wallet handles.
//! - [`WalletHandle`] exposes the identity key and payment internalization.
//! - [`MessageRelayClient`] anoints hosts, sends payments and manages inboxes.
//!
//! [`http`] holds the JSON-over-HTTP bindings used in production.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::models::{IdentityKey, RelayMessage};

pub mod http;
#[cfg(test)]
pub mod mock;

pub use http::{HttpRelayClient, HttpWalletProvider};

/// Protocol tag for BRC-29 style wallet payments.
pub const WALLET_PAYMENT_PROTOCOL: &str = "wallet payment";

/// Label attached to internalized incoming payments.
pub const RECEIVED_PAYMENT_LABEL: &str = "received_payment";

#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    #[error("SDK transport failed: {0}")]
    Transport(String),

    #[error("SDK response was invalid: {0}")]
    InvalidResponse(String),

    #[error("SDK rejected the request: {0}")]
    Rejected(String),
}

pub type SdkResult<T> = Result<T, SdkError>;

/// Arguments for claiming an incoming payment output.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InternalizeRequest {
    pub tx: Value,
    pub outputs: Vec<InternalizeOutput>,
    pub description: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InternalizeOutput {
    pub output_index: u32,
    pub protocol: String,
    pub payment_remittance: PaymentRemittance,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRemittance {
    pub sender_identity_key: IdentityKey,
    pub derivation_prefix: String,
    pub derivation_suffix: String,
}

/// A user's wallet as seen by this service.
#[async_trait]
pub trait WalletHandle: Send + Sync {
    /// The wallet's public identity key.
    async fn identity_key(&self) -> SdkResult<IdentityKey>;

    /// Claim a received payment output into the wallet.
    async fn internalize_payment(&self, request: &InternalizeRequest) -> SdkResult<()>;
}

/// Source of wallet handles.
///
/// Creating a handle is cheap and performs no network I/O; the first
/// operation on it is what reaches the wallet.
pub trait IdentityProvider: Send + Sync {
    fn create_wallet(&self) -> Arc<dyn WalletHandle>;
}

/// Operations of the message-box relay, acting as `wallet`.
#[async_trait]
pub trait MessageRelayClient: Send + Sync {
    /// Register `wallet`'s identity against `host`. Returns the txid.
    async fn anoint_host(&self, wallet: &dyn WalletHandle, host: &str) -> SdkResult<String>;

    /// Build and deliver a payment token of `amount` satoshis.
    /// Returns the relay message id.
    async fn send_payment(
        &self,
        wallet: &dyn WalletHandle,
        recipient: &IdentityKey,
        amount: u64,
    ) -> SdkResult<String>;

    /// Unacknowledged messages in `message_box`.
    async fn list_messages(
        &self,
        wallet: &dyn WalletHandle,
        message_box: &str,
    ) -> SdkResult<Vec<RelayMessage>>;

    /// Permanently remove messages from the relay.
    async fn acknowledge_messages(
        &self,
        wallet: &dyn WalletHandle,
        message_ids: &[String],
    ) -> SdkResult<()>;
}
