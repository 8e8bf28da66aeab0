// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API plus the persisted
//! [`CertifiedUser`] document. JSON field names are camelCase to match the
//! browser front-end.
//!
//! ## Model Categories
//!
//! - **Identity**: [`IdentityKey`] newtype
//! - **Certification**: stored record, certify/store requests, list views
//! - **Wallet sessions**: connect/status/disconnect bodies
//! - **Payments**: initiate-payment bodies, relay messages, payment tokens

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

// =============================================================================
// Identity Key Type
// =============================================================================

/// Public identity key of a relay participant.
///
/// Opaque to this service; it is produced by the user's wallet and is the
/// primary key of a certification record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct IdentityKey(pub String);

impl IdentityKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Shortened form used in log lines.
    pub fn short(&self) -> &str {
        truncate(&self.0, 20)
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for IdentityKey {
    fn from(value: String) -> Self {
        IdentityKey(value)
    }
}

impl From<&str> for IdentityKey {
    fn from(value: &str) -> Self {
        IdentityKey(value.to_string())
    }
}

impl From<IdentityKey> for String {
    fn from(value: IdentityKey) -> Self {
        value.0
    }
}

pub(crate) fn truncate(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

// =============================================================================
// Certification Models
// =============================================================================

/// A certified identity, one document per identity key.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CertifiedUser {
    pub identity_key: IdentityKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub certification_date: DateTime<Utc>,
    /// Transaction that anointed the host for this identity.
    pub certification_txid: String,
    /// Relay host the identity registered against.
    pub host: String,
}

/// Public listing shape of a certified user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CertifiedUserView {
    pub identity_key: IdentityKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// ISO-8601 timestamp, millisecond precision.
    pub certification_date: String,
    pub host: String,
}

impl From<CertifiedUser> for CertifiedUserView {
    fn from(user: CertifiedUser) -> Self {
        Self {
            identity_key: user.identity_key,
            alias: user.alias,
            certification_date: user
                .certification_date
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            host: user.host,
        }
    }
}

/// Normalises an optional alias: blank strings count as absent.
pub fn normalize_alias(alias: Option<String>) -> Option<String> {
    alias.filter(|a| !a.trim().is_empty())
}

/// Body of `POST /api/certify`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CertifyRequest {
    #[serde(default)]
    pub alias: Option<String>,
}

/// Result of a server-initiated certification.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertifyResponse {
    pub success: bool,
    pub identity_key: IdentityKey,
    pub txid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub message: String,
}

/// Body of `POST /api/store-certification`, sent after a browser-side anoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreCertificationRequest {
    #[serde(default)]
    pub identity_key: Option<IdentityKey>,
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
}

/// Generic `{success, message}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Response of the list and search endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CertifiedUsersResponse {
    pub success: bool,
    pub users: Vec<CertifiedUserView>,
}

// =============================================================================
// Wallet Session Models
// =============================================================================

/// Body of `POST /api/wallet/connect`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    #[serde(default)]
    pub identity_key: Option<IdentityKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectResponse {
    pub success: bool,
    pub session_id: String,
    pub identity_key: IdentityKey,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub success: bool,
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_key: Option<IdentityKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DisconnectResponse {
    pub success: bool,
    pub disconnected: bool,
    pub message: String,
}

// =============================================================================
// Payment Models
// =============================================================================

/// Body of `POST /api/initiate-payment`. Amount is in satoshis.
///
/// Any JSON number is accepted here; the handler requires a positive whole
/// number.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct InitiatePaymentRequest {
    #[serde(default)]
    pub recipient: Option<IdentityKey>,
    #[serde(default)]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentResponse {
    pub success: bool,
    pub message_id: String,
}

/// Message as delivered by the relay, before client-side processing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelayMessage {
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub sender: Option<IdentityKey>,
    #[serde(default)]
    pub body: Value,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Client-facing view of an unacknowledged inbox message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedMessage {
    pub message_id: String,
    pub sender: IdentityKey,
    pub message_box: String,
    #[schema(value_type = Object)]
    pub body: Value,
    pub timestamp: DateTime<Utc>,
}

/// Key-derivation metadata attached to a payment token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomInstructions {
    pub derivation_prefix: String,
    pub derivation_suffix: String,
}

/// Serialized payment sent through the relay so the recipient can claim funds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentToken {
    /// Opaque transaction payload, passed back to the wallet untouched.
    pub transaction: Value,
    pub custom_instructions: CustomInstructions,
    #[serde(default)]
    pub amount: Option<u64>,
    #[serde(default)]
    pub output_index: Option<u32>,
}

impl PaymentToken {
    /// Parses a message body into a payment token.
    ///
    /// The body may be the token object itself or a JSON string encoding it.
    /// Anything without a transaction and derivation instructions is `None`.
    pub fn from_body(body: &Value) -> Option<Self> {
        let parsed = match body {
            Value::String(raw) => serde_json::from_str::<Value>(raw).ok()?,
            other => other.clone(),
        };
        let token: PaymentToken = serde_json::from_value(parsed).ok()?;
        if token.transaction.is_null() {
            return None;
        }
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn identity_key_from_and_into_string() {
        let from_str: IdentityKey = "02abc".into();
        assert_eq!(from_str.0, "02abc");

        let to_string: String = IdentityKey("03def".into()).into();
        assert_eq!(to_string, "03def");
    }

    #[test]
    fn identity_key_short_truncates_on_char_boundary() {
        let key = IdentityKey::from("0".repeat(66));
        assert_eq!(key.short().len(), 20);
        assert_eq!(IdentityKey::from("abc").short(), "abc");
    }

    #[test]
    fn view_serializes_iso_date_and_camel_case() {
        let user = CertifiedUser {
            identity_key: "02aa".into(),
            alias: Some("Alice".into()),
            certification_date: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            certification_txid: "tx1".into(),
            host: "https://relay.example".into(),
        };

        let value = serde_json::to_value(CertifiedUserView::from(user)).unwrap();
        assert_eq!(value["identityKey"], "02aa");
        assert_eq!(value["certificationDate"], "2026-03-01T12:00:00.000Z");
        assert!(value.get("certificationTxid").is_none());
    }

    #[test]
    fn blank_alias_is_absent() {
        assert_eq!(normalize_alias(Some("  ".into())), None);
        assert_eq!(normalize_alias(Some("Bob".into())), Some("Bob".into()));
        assert_eq!(normalize_alias(None), None);
    }

    #[test]
    fn payment_token_parses_object_and_string_bodies() {
        let token = json!({
            "transaction": [1, 2, 3],
            "customInstructions": { "derivationPrefix": "p", "derivationSuffix": "s" },
            "amount": 1000
        });

        let parsed = PaymentToken::from_body(&token).expect("object body");
        assert_eq!(parsed.custom_instructions.derivation_prefix, "p");
        assert_eq!(parsed.output_index, None);

        let as_string = Value::String(token.to_string());
        assert_eq!(PaymentToken::from_body(&as_string), Some(parsed));
    }

    #[test]
    fn payment_token_rejects_plain_messages() {
        assert!(PaymentToken::from_body(&json!("hello")).is_none());
        assert!(PaymentToken::from_body(&json!({ "transaction": [1] })).is_none());
        assert!(PaymentToken::from_body(&json!({
            "transaction": null,
            "customInstructions": { "derivationPrefix": "p", "derivationSuffix": "s" }
        }))
        .is_none());
    }
}
