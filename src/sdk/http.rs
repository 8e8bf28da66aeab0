// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-over-HTTP bindings for the wallet and message-relay SDKs.
//!
//! The wallet is reached through its local JSON API (`POST /<method>` with
//! the SDK's argument object as body). Relay operations go through a bridge
//! that exposes the message-box client methods the same way and signs with
//! the wallet identified in each request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use super::{
    IdentityProvider, InternalizeRequest, MessageRelayClient, SdkError, SdkResult, WalletHandle,
};
use crate::models::{IdentityKey, RelayMessage};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

fn build_http_client() -> SdkResult<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| SdkError::Transport(format!("failed to build HTTP client: {e}")))
}

fn endpoint(base: &Url, method: &str) -> SdkResult<Url> {
    base.join(method)
        .map_err(|e| SdkError::Transport(format!("invalid endpoint {method}: {e}")))
}

/// POST `body` to `base/method` and decode the JSON reply.
///
/// Non-2xx replies become [`SdkError::Rejected`] carrying the remote
/// `message`/`error` field when present.
async fn post_json<B, R>(http: &Client, base: &Url, method: &str, body: &B) -> SdkResult<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let url = endpoint(base, method)?;
    let response = http
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| SdkError::Transport(format!("{method}: {e}")))?;

    let status = response.status();
    let payload: Value = response
        .json()
        .await
        .map_err(|e| SdkError::InvalidResponse(format!("{method}: {e}")))?;

    if !status.is_success() {
        let reason = payload
            .get("message")
            .or_else(|| payload.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {status}"));
        return Err(SdkError::Rejected(format!("{method}: {reason}")));
    }

    serde_json::from_value(payload).map_err(|e| SdkError::InvalidResponse(format!("{method}: {e}")))
}

// =============================================================================
// Wallet
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicKeyResponse {
    public_key: String,
}

#[derive(Deserialize)]
struct InternalizeResponse {
    #[serde(default)]
    accepted: bool,
}

/// Wallet reached through its local JSON API.
#[derive(Debug, Clone)]
pub struct HttpWallet {
    base_url: Url,
    http: Client,
}

#[async_trait]
impl WalletHandle for HttpWallet {
    async fn identity_key(&self) -> SdkResult<IdentityKey> {
        let response: PublicKeyResponse = post_json(
            &self.http,
            &self.base_url,
            "getPublicKey",
            &json!({ "identityKey": true }),
        )
        .await?;
        Ok(IdentityKey(response.public_key))
    }

    async fn internalize_payment(&self, request: &InternalizeRequest) -> SdkResult<()> {
        let response: InternalizeResponse =
            post_json(&self.http, &self.base_url, "internalizeAction", request).await?;
        if response.accepted {
            Ok(())
        } else {
            Err(SdkError::Rejected("internalizeAction: not accepted".to_string()))
        }
    }
}

/// Hands out [`HttpWallet`] handles sharing one connection pool.
#[derive(Debug, Clone)]
pub struct HttpWalletProvider {
    base_url: Url,
    http: Client,
}

impl HttpWalletProvider {
    pub fn new(base_url: Url) -> SdkResult<Self> {
        Ok(Self {
            base_url,
            http: build_http_client()?,
        })
    }
}

impl IdentityProvider for HttpWalletProvider {
    fn create_wallet(&self) -> Arc<dyn WalletHandle> {
        Arc::new(HttpWallet {
            base_url: self.base_url.clone(),
            http: self.http.clone(),
        })
    }
}

// =============================================================================
// Message relay
// =============================================================================

#[derive(Deserialize)]
struct AnointResponse {
    txid: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendPaymentResponse {
    #[serde(default)]
    message_id: Option<String>,
}

#[derive(Deserialize)]
struct ListMessagesResponse {
    #[serde(default)]
    messages: Option<Vec<RelayMessage>>,
}

/// Message-box client reached through the relay bridge.
#[derive(Debug, Clone)]
pub struct HttpRelayClient {
    bridge_url: Url,
    relay_host: String,
    http: Client,
}

impl HttpRelayClient {
    /// `relay_host` is the message-box host the bridge should talk to.
    pub fn new(bridge_url: Url, relay_host: impl Into<String>) -> SdkResult<Self> {
        Ok(Self {
            bridge_url,
            relay_host: relay_host.into(),
            http: build_http_client()?,
        })
    }
}

#[async_trait]
impl MessageRelayClient for HttpRelayClient {
    async fn anoint_host(&self, wallet: &dyn WalletHandle, host: &str) -> SdkResult<String> {
        let identity_key = wallet.identity_key().await?;
        let response: AnointResponse = post_json(
            &self.http,
            &self.bridge_url,
            "anointHost",
            &json!({
                "identityKey": identity_key,
                "messageBoxHost": self.relay_host,
                "host": host,
            }),
        )
        .await?;
        Ok(response.txid)
    }

    async fn send_payment(
        &self,
        wallet: &dyn WalletHandle,
        recipient: &IdentityKey,
        amount: u64,
    ) -> SdkResult<String> {
        let identity_key = wallet.identity_key().await?;
        let response: SendPaymentResponse = post_json(
            &self.http,
            &self.bridge_url,
            "sendPayment",
            &json!({
                "identityKey": identity_key,
                "messageBoxHost": self.relay_host,
                "recipient": recipient,
                "amount": amount,
            }),
        )
        .await?;
        Ok(response
            .message_id
            .unwrap_or_else(|| "Payment sent successfully".to_string()))
    }

    async fn list_messages(
        &self,
        wallet: &dyn WalletHandle,
        message_box: &str,
    ) -> SdkResult<Vec<RelayMessage>> {
        let identity_key = wallet.identity_key().await?;
        let response: ListMessagesResponse = post_json(
            &self.http,
            &self.bridge_url,
            "listMessages",
            &json!({
                "identityKey": identity_key,
                "messageBoxHost": self.relay_host,
                "messageBox": message_box,
            }),
        )
        .await?;
        Ok(response.messages.unwrap_or_default())
    }

    async fn acknowledge_messages(
        &self,
        wallet: &dyn WalletHandle,
        message_ids: &[String],
    ) -> SdkResult<()> {
        let identity_key = wallet.identity_key().await?;
        let _: Value = post_json(
            &self.http,
            &self.bridge_url,
            "acknowledgeMessage",
            &json!({
                "identityKey": identity_key,
                "messageBoxHost": self.relay_host,
                "messageIds": message_ids,
            }),
        )
        .await?;
        Ok(())
    }
}
