// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! REST client holding the local side of a wallet session.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use super::ClientError;
use crate::api::extract::SESSION_HEADER;
use crate::models::{
    CertifiedUserView, CertifiedUsersResponse, CertifyResponse, ConnectResponse,
    DisconnectResponse, IdentityKey, InitiatePaymentResponse, MessageResponse,
    SessionStatusResponse, StoreCertificationRequest,
};
use crate::sdk::WalletHandle;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Session token and identity remembered between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSession {
    pub session_id: String,
    pub identity_key: IdentityKey,
}

/// Client for the certifier REST API.
///
/// Attaches `X-Session-Id` while a session is held. Any 401 whose error
/// mentions the session drops the local session and yields
/// [`ClientError::SessionExpired`].
pub struct ApiClient {
    base_url: Url,
    http: Client,
    session: Option<LocalSession>,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:3000/`.
    pub fn new(base_url: Url) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            base_url,
            http,
            session: None,
        })
    }

    /// Resume a session persisted by a previous run.
    pub fn with_session(mut self, session: LocalSession) -> Self {
        self.session = Some(session);
        self
    }

    pub fn session(&self) -> Option<&LocalSession> {
        self.session.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidInput(format!("invalid endpoint {path}: {e}")))
    }

    async fn request<T: DeserializeOwned>(
        &mut self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        let mut request = self.http.request(method, url);
        if let Some(session) = &self.session {
            request = request.header(SESSION_HEADER, &session.session_id);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let payload: Value = response.json().await?;
        let error = payload
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string);

        if status == StatusCode::UNAUTHORIZED
            && error.as_deref().is_some_and(|e| e.contains("session"))
        {
            warn!("Session expired, clearing local session");
            self.session = None;
            return Err(ClientError::SessionExpired);
        }
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: error.unwrap_or_else(|| format!("HTTP error! status: {status}")),
            });
        }

        serde_json::from_value(payload).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Read the identity key from `wallet` and register a session for it.
    ///
    /// Any failure leaves the client disconnected.
    pub async fn connect(&mut self, wallet: &dyn WalletHandle) -> Result<IdentityKey, ClientError> {
        self.session = None;

        let identity_key = wallet
            .identity_key()
            .await
            .map_err(ClientError::sdk("connect wallet"))?;

        let url = self.endpoint("api/wallet/connect")?;
        let response: ConnectResponse = self
            .request(Method::POST, url, Some(json!({ "identityKey": identity_key })))
            .await?;

        debug!(identity_key = %identity_key.short(), "Wallet session registered");
        self.session = Some(LocalSession {
            session_id: response.session_id,
            identity_key: identity_key.clone(),
        });
        Ok(identity_key)
    }

    /// Whether the server still holds the session. Clears it locally if not,
    /// or if the server cannot be reached.
    pub async fn check_status(&mut self) -> bool {
        if self.session.is_none() {
            return false;
        }

        let status: Result<SessionStatusResponse, ClientError> = match self.endpoint("api/wallet/status") {
            Ok(url) => self.request(Method::GET, url, None).await,
            Err(e) => Err(e),
        };

        match status {
            Ok(SessionStatusResponse {
                success: true,
                connected: true,
                identity_key: Some(identity_key),
                ..
            }) => {
                if let Some(session) = self.session.as_mut() {
                    session.identity_key = identity_key;
                }
                true
            }
            Ok(_) => {
                self.session = None;
                false
            }
            Err(e) => {
                warn!(error = %e, "Failed to check wallet status");
                self.session = None;
                false
            }
        }
    }

    /// End the session on the server. The local session is dropped even
    /// when the server cannot be reached; the return value says whether the
    /// server acknowledged.
    pub async fn disconnect(&mut self) -> bool {
        if self.session.is_none() {
            return true;
        }

        let result: Result<DisconnectResponse, ClientError> = match self.endpoint("api/wallet/disconnect") {
            Ok(url) => self.request(Method::POST, url, None).await,
            Err(e) => Err(e),
        };
        self.session = None;

        match result {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Failed to disconnect wallet");
                false
            }
        }
    }

    /// Server-side certification with the session's wallet (or a fresh one).
    pub async fn certify(&mut self, alias: Option<&str>) -> Result<CertifyResponse, ClientError> {
        let url = self.endpoint("api/certify")?;
        self.request(Method::POST, url, Some(json!({ "alias": alias })))
            .await
    }

    /// Record a certification produced by [`super::certify_identity`].
    pub async fn store_certification(
        &mut self,
        request: &StoreCertificationRequest,
    ) -> Result<MessageResponse, ClientError> {
        let url = self.endpoint("api/store-certification")?;
        let body = serde_json::to_value(request)
            .map_err(|e| ClientError::InvalidInput(e.to_string()))?;
        self.request(Method::POST, url, Some(body)).await
    }

    pub async fn list_certified_users(&mut self) -> Result<Vec<CertifiedUserView>, ClientError> {
        let url = self.endpoint("api/certified-users")?;
        let response: CertifiedUsersResponse = self.request(Method::GET, url, None).await?;
        Ok(response.users)
    }

    pub async fn search_certified_users(
        &mut self,
        query: &str,
    ) -> Result<Vec<CertifiedUserView>, ClientError> {
        let mut url = self.endpoint("api/certified-users/search")?;
        url.query_pairs_mut().append_pair("q", query);
        let response: CertifiedUsersResponse = self.request(Method::GET, url, None).await?;
        Ok(response.users)
    }

    /// Ask the server to pay `recipient` from the session's wallet.
    pub async fn initiate_payment(
        &mut self,
        recipient: &IdentityKey,
        amount: i64,
    ) -> Result<InitiatePaymentResponse, ClientError> {
        let url = self.endpoint("api/initiate-payment")?;
        self.request(
            Method::POST,
            url,
            Some(json!({ "recipient": recipient, "amount": amount })),
        )
        .await
    }
}
