// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Certification endpoints.
//!
//! `POST /api/certify` anoints the relay host with a server-side wallet and
//! records the result. `POST /api/store-certification` records a
//! certification the browser already anointed with its own wallet.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::{
    api::extract::SessionHeader,
    error::ApiError,
    models::{
        normalize_alias, CertifiedUser, CertifyRequest, CertifyResponse, MessageResponse,
        StoreCertificationRequest,
    },
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/api/certify",
    request_body = CertifyRequest,
    params(("X-Session-Id" = Option<String>, Header, description = "Wallet session token")),
    tag = "Certification",
    responses(
        (status = 200, body = CertifyResponse),
        (status = 500, description = "Wallet or relay failure")
    )
)]
pub async fn certify(
    State(state): State<AppState>,
    session: SessionHeader,
    payload: Result<Json<CertifyRequest>, JsonRejection>,
) -> Result<Json<CertifyResponse>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        // A bare POST carries no alias.
        Err(JsonRejection::MissingJsonContentType(_)) => CertifyRequest::default(),
        Err(rejection) => return Err(rejection.into()),
    };
    let alias = normalize_alias(request.alias);

    let session_wallet = session
        .0
        .as_deref()
        .and_then(|id| state.sessions.get_wallet_client(id));
    let wallet = match session_wallet {
        Some(wallet) => wallet,
        None => {
            debug!("No live wallet session, certifying with a fresh wallet");
            state.wallets.create_wallet()
        }
    };

    let certification_failed = |e: crate::sdk::SdkError| {
        warn!(error = %e, "Certification failed");
        ApiError::internal(format!("Failed to certify identity: {e}"))
    };

    let identity_key = wallet.identity_key().await.map_err(certification_failed)?;
    let txid = state
        .relay
        .anoint_host(wallet.as_ref(), &state.messagebox_host)
        .await
        .map_err(certification_failed)?;

    let user = CertifiedUser {
        identity_key: identity_key.clone(),
        alias: alias.clone(),
        certification_date: Utc::now(),
        certification_txid: txid.clone(),
        host: state.messagebox_host.clone(),
    };
    state.store.store_certification(&user)?;

    info!(identity_key = %identity_key.short(), %txid, "Identity certified");

    Ok(Json(CertifyResponse {
        success: true,
        identity_key,
        txid,
        alias,
        message: "Identity certified successfully".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/store-certification",
    request_body = StoreCertificationRequest,
    tag = "Certification",
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, description = "identityKey or txid missing")
    )
)]
pub async fn store_certification(
    State(state): State<AppState>,
    payload: Result<Json<StoreCertificationRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;

    let identity_key = request.identity_key.filter(|key| !key.is_empty());
    let txid = request.txid.filter(|txid| !txid.trim().is_empty());
    let (Some(identity_key), Some(txid)) = (identity_key, txid) else {
        return Err(ApiError::bad_request("identityKey and txid are required"));
    };

    let user = CertifiedUser {
        identity_key,
        alias: normalize_alias(request.alias),
        certification_date: Utc::now(),
        certification_txid: txid,
        host: state.messagebox_host.clone(),
    };
    state.store.store_certification(&user)?;

    info!(identity_key = %user.identity_key.short(), "Certification stored");

    Ok(Json(MessageResponse {
        success: true,
        message: "Certification stored successfully".to_string(),
    }))
}
