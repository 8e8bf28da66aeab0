// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet-side operations run by the user's client.

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::ClientError;
use crate::models::{
    IdentityKey, PaymentToken, ReceivedMessage, RelayMessage, StoreCertificationRequest,
};
use crate::sdk::{
    InternalizeOutput, InternalizeRequest, MessageRelayClient, PaymentRemittance, WalletHandle,
    RECEIVED_PAYMENT_LABEL, WALLET_PAYMENT_PROTOCOL,
};

/// Inbox payments are delivered to.
pub const DEFAULT_MESSAGE_BOX: &str = "payment_inbox";

const UNKNOWN: &str = "unknown";

/// Outcome of a client-side certification, ready to be recorded by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserCertification {
    pub identity_key: IdentityKey,
    pub txid: String,
    pub alias: Option<String>,
}

impl From<BrowserCertification> for StoreCertificationRequest {
    fn from(cert: BrowserCertification) -> Self {
        StoreCertificationRequest {
            identity_key: Some(cert.identity_key),
            txid: Some(cert.txid),
            alias: cert.alias,
        }
    }
}

/// Anoint `host` with the user's wallet, then read back its identity key.
///
/// Nothing is persisted; post the result to `/api/store-certification`.
pub async fn certify_identity(
    relay: &dyn MessageRelayClient,
    wallet: &dyn WalletHandle,
    host: &str,
    alias: Option<String>,
) -> Result<BrowserCertification, ClientError> {
    let txid = relay
        .anoint_host(wallet, host)
        .await
        .map_err(ClientError::sdk("certify identity"))?;
    let identity_key = wallet
        .identity_key()
        .await
        .map_err(ClientError::sdk("certify identity"))?;

    info!(identity_key = %identity_key.short(), %txid, "Host anointed");

    Ok(BrowserCertification {
        identity_key,
        txid,
        alias,
    })
}

/// Send `amount` satoshis to `recipient`. Returns the relay message id.
pub async fn send_payment(
    relay: &dyn MessageRelayClient,
    wallet: &dyn WalletHandle,
    recipient: &IdentityKey,
    amount: u64,
) -> Result<String, ClientError> {
    if recipient.is_empty() {
        return Err(ClientError::InvalidInput("Recipient is required".into()));
    }
    if amount == 0 {
        return Err(ClientError::InvalidInput("Amount must be greater than 0".into()));
    }

    relay
        .send_payment(wallet, recipient, amount)
        .await
        .map_err(ClientError::sdk("send payment"))
}

/// List `message_box` and claim every payment token found in it.
///
/// A token the wallet refuses to internalize is logged and skipped; the
/// message is still returned so the user can inspect or acknowledge it.
/// Messages are not acknowledged here.
pub async fn check_inbox(
    relay: &dyn MessageRelayClient,
    wallet: &dyn WalletHandle,
    message_box: &str,
) -> Result<Vec<ReceivedMessage>, ClientError> {
    let messages = relay
        .list_messages(wallet, message_box)
        .await
        .map_err(ClientError::sdk("check inbox"))?;

    debug!(message_box, count = messages.len(), "Inbox listed");

    let mut received = Vec::with_capacity(messages.len());
    for message in messages {
        if let Some(token) = PaymentToken::from_body(&message.body) {
            internalize(wallet, &message, token).await;
        }
        received.push(into_received(message, message_box));
    }
    Ok(received)
}

async fn internalize(wallet: &dyn WalletHandle, message: &RelayMessage, token: PaymentToken) {
    let Some(sender) = message.sender.clone() else {
        warn!(message_id = ?message.message_id, "Payment token without sender, not internalized");
        return;
    };

    let request = InternalizeRequest {
        tx: token.transaction,
        outputs: vec![InternalizeOutput {
            output_index: token.output_index.unwrap_or(0),
            protocol: WALLET_PAYMENT_PROTOCOL.to_string(),
            payment_remittance: PaymentRemittance {
                sender_identity_key: sender.clone(),
                derivation_prefix: token.custom_instructions.derivation_prefix,
                derivation_suffix: token.custom_instructions.derivation_suffix,
            },
        }],
        description: format!("Payment from {}...", sender.short()),
        labels: vec![RECEIVED_PAYMENT_LABEL.to_string()],
    };

    match wallet.internalize_payment(&request).await {
        Ok(()) => info!(sender = %sender.short(), "Payment internalized"),
        Err(e) => warn!(error = %e, sender = %sender.short(), "Failed to internalize payment"),
    }
}

fn into_received(message: RelayMessage, message_box: &str) -> ReceivedMessage {
    let body = if message.body.is_null() {
        serde_json::to_value(&message).unwrap_or(Value::Null)
    } else {
        message.body.clone()
    };

    ReceivedMessage {
        message_id: message.message_id.unwrap_or_else(|| UNKNOWN.to_string()),
        sender: message.sender.unwrap_or_else(|| UNKNOWN.into()),
        message_box: message_box.to_string(),
        body,
        timestamp: message.created_at.unwrap_or_else(Utc::now),
    }
}

/// Remove a message from the relay. Irreversible.
pub async fn acknowledge_message(
    relay: &dyn MessageRelayClient,
    wallet: &dyn WalletHandle,
    message_id: &str,
) -> Result<(), ClientError> {
    relay
        .acknowledge_messages(wallet, &[message_id.to_string()])
        .await
        .map_err(ClientError::sdk("acknowledge message"))?;
    info!(message_id, "Message acknowledged");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    use crate::sdk::mock::{MockRelay, MockWallet};

    fn token(prefix: &str, output_index: Option<u32>) -> Value {
        let mut token = json!({
            "transaction": [1, 0, 1],
            "customInstructions": { "derivationPrefix": prefix, "derivationSuffix": "sfx" },
            "amount": 500
        });
        if let Some(index) = output_index {
            token["outputIndex"] = json!(index);
        }
        token
    }

    fn message(id: &str, sender: &str, body: Value) -> RelayMessage {
        RelayMessage {
            message_id: Some(id.into()),
            sender: Some(sender.into()),
            body,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn certify_identity_returns_anointed_identity() {
        let relay = MockRelay::new();
        let wallet = MockWallet::new("02alice");

        let cert = certify_identity(&relay, &wallet, "https://relay.test", Some("Alice".into()))
            .await
            .unwrap();

        assert_eq!(cert.identity_key, IdentityKey::from("02alice"));
        assert_eq!(cert.txid, "txid-1");

        let request: StoreCertificationRequest = cert.into();
        assert_eq!(request.alias.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn certify_identity_wraps_relay_failure() {
        let relay = MockRelay::failing();
        let wallet = MockWallet::new("02alice");

        let err = certify_identity(&relay, &wallet, "https://relay.test", None)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to certify identity"));
    }

    #[tokio::test]
    async fn send_payment_rejects_zero_amount() {
        let relay = MockRelay::new();
        let wallet = MockWallet::new("02alice");

        let err = send_payment(&relay, &wallet, &"02bob".into(), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
        assert_eq!(relay.calls(), 0);

        let id = send_payment(&relay, &wallet, &"02bob".into(), 250).await.unwrap();
        assert_eq!(id, "msg-1");
    }

    #[tokio::test]
    async fn check_inbox_internalizes_payment_tokens() {
        let relay = MockRelay::new();
        let wallet = MockWallet::new("02bob");
        relay.deliver(DEFAULT_MESSAGE_BOX, message("m1", "02alice", token("pfx", None)));
        relay.deliver(
            DEFAULT_MESSAGE_BOX,
            message("m2", "02carol", Value::String(token("pfx2", Some(1)).to_string())),
        );
        relay.deliver(DEFAULT_MESSAGE_BOX, message("m3", "02dave", json!("hello")));

        let received = check_inbox(&relay, &wallet, DEFAULT_MESSAGE_BOX).await.unwrap();

        assert_eq!(received.len(), 3);
        let internalized = wallet.internalized.lock().unwrap();
        assert_eq!(internalized.len(), 2);

        let first = &internalized[0];
        assert_eq!(first.labels, [RECEIVED_PAYMENT_LABEL]);
        assert_eq!(first.outputs[0].output_index, 0);
        assert_eq!(first.outputs[0].protocol, WALLET_PAYMENT_PROTOCOL);
        assert_eq!(
            first.outputs[0].payment_remittance.sender_identity_key,
            IdentityKey::from("02alice")
        );
        assert_eq!(internalized[1].outputs[0].output_index, 1);
        assert_eq!(internalized[1].outputs[0].payment_remittance.derivation_prefix, "pfx2");
    }

    #[tokio::test]
    async fn internalize_failure_does_not_abort_scan() {
        let relay = MockRelay::new();
        let mut wallet = MockWallet::new("02bob");
        wallet.fail_internalize = true;
        relay.deliver(DEFAULT_MESSAGE_BOX, message("m1", "02alice", token("a", None)));
        relay.deliver(DEFAULT_MESSAGE_BOX, message("m2", "02alice", token("b", None)));

        let received = check_inbox(&relay, &wallet, DEFAULT_MESSAGE_BOX).await.unwrap();

        let ids: Vec<_> = received.iter().map(|m| m.message_id.as_str()).collect();
        assert_eq!(ids, ["m1", "m2"]);
    }

    #[tokio::test]
    async fn missing_fields_default_to_unknown() {
        let relay = MockRelay::new();
        let wallet = MockWallet::new("02bob");
        let sent_at = Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap();
        relay.deliver(
            "notes",
            RelayMessage {
                message_id: None,
                sender: None,
                body: json!({ "note": "hi" }),
                created_at: None,
            },
        );
        relay.deliver(
            "notes",
            RelayMessage {
                created_at: Some(sent_at),
                ..message("m2", "02alice", json!("text"))
            },
        );

        let received = check_inbox(&relay, &wallet, "notes").await.unwrap();

        assert_eq!(received[0].message_id, "unknown");
        assert_eq!(received[0].sender, IdentityKey::from("unknown"));
        assert_eq!(received[0].message_box, "notes");
        assert_eq!(received[1].timestamp, sent_at);
        assert!(wallet.internalized.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn acknowledge_removes_message() {
        let relay = MockRelay::new();
        let wallet = MockWallet::new("02bob");
        relay.deliver(DEFAULT_MESSAGE_BOX, message("m1", "02alice", json!("hi")));

        acknowledge_message(&relay, &wallet, "m1").await.unwrap();

        assert!(check_inbox(&relay, &wallet, DEFAULT_MESSAGE_BOX)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(relay.acknowledged.lock().unwrap().as_slice(), ["m1"]);
    }
}
