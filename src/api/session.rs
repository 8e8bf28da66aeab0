// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet session endpoints: connect, status, disconnect.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::{info, warn};

use crate::{
    api::extract::SessionHeader,
    error::ApiError,
    models::{ConnectRequest, ConnectResponse, DisconnectResponse, SessionStatusResponse},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/api/wallet/connect",
    request_body = ConnectRequest,
    tag = "Wallet",
    responses(
        (status = 200, body = ConnectResponse),
        (status = 400, description = "Identity key missing")
    )
)]
pub async fn connect(
    State(state): State<AppState>,
    payload: Result<Json<ConnectRequest>, JsonRejection>,
) -> Result<Json<ConnectResponse>, ApiError> {
    let Json(request) = payload?;
    let identity_key = request
        .identity_key
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ApiError::bad_request("Identity key is required"))?;

    let session_id = state
        .sessions
        .create_session_with_identity(identity_key.clone())
        .map_err(|e| {
            warn!(error = %e, "Failed to open wallet session");
            ApiError::internal(format!("Failed to connect wallet: {e}"))
        })?;

    Ok(Json(ConnectResponse {
        success: true,
        session_id,
        identity_key,
        message: "Wallet connected successfully".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/wallet/status",
    params(("X-Session-Id" = Option<String>, Header, description = "Wallet session token")),
    tag = "Wallet",
    responses(
        (status = 200, body = SessionStatusResponse),
        (status = 400, description = "Session header missing")
    )
)]
pub async fn status(
    State(state): State<AppState>,
    session: SessionHeader,
) -> Result<Json<SessionStatusResponse>, ApiError> {
    let session_id = session.require()?;

    let response = match state.sessions.get_session_info(&session_id) {
        Some(info) => SessionStatusResponse {
            success: true,
            connected: true,
            identity_key: Some(info.identity_key),
            connected_at: Some(info.created_at),
            message: None,
        },
        None => SessionStatusResponse {
            success: true,
            connected: false,
            identity_key: None,
            connected_at: None,
            message: Some("No active session".to_string()),
        },
    };

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/wallet/disconnect",
    params(("X-Session-Id" = Option<String>, Header, description = "Wallet session token")),
    tag = "Wallet",
    responses(
        (status = 200, body = DisconnectResponse),
        (status = 400, description = "Session header missing")
    )
)]
pub async fn disconnect(
    State(state): State<AppState>,
    session: SessionHeader,
) -> Result<Json<DisconnectResponse>, ApiError> {
    let session_id = session.require()?;
    let disconnected = state.sessions.delete_session(&session_id);
    if disconnected {
        info!("Wallet disconnected");
    }

    Ok(Json(DisconnectResponse {
        success: true,
        disconnected,
        message: if disconnected {
            "Wallet disconnected successfully"
        } else {
            "Session not found"
        }
        .to_string(),
    }))
}
