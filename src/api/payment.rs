// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::{info, warn};

use crate::{
    api::extract::SessionHeader,
    error::ApiError,
    models::{InitiatePaymentRequest, InitiatePaymentResponse},
    state::AppState,
};

/// A positive whole number of satoshis, or `None`.
fn whole_satoshis(amount: f64) -> Option<u64> {
    if amount.is_finite() && amount > 0.0 && amount.fract() == 0.0 && amount <= u64::MAX as f64 {
        Some(amount as u64)
    } else {
        None
    }
}

/// Send a payment from the session's wallet to a certified user.
///
/// Checks run in order: session header, body, live session, recipient
/// certification. Nothing reaches the relay unless all of them pass.
#[utoipa::path(
    post,
    path = "/api/initiate-payment",
    request_body = InitiatePaymentRequest,
    params(("X-Session-Id" = String, Header, description = "Wallet session token")),
    tag = "Payments",
    responses(
        (status = 200, body = InitiatePaymentResponse),
        (status = 400, description = "Recipient missing or amount not positive"),
        (status = 401, description = "No live wallet session"),
        (status = 404, description = "Recipient is not certified"),
        (status = 500, description = "Relay failure")
    )
)]
pub async fn initiate_payment(
    State(state): State<AppState>,
    session: SessionHeader,
    payload: Result<Json<InitiatePaymentRequest>, JsonRejection>,
) -> Result<Json<InitiatePaymentResponse>, ApiError> {
    let Some(session_id) = session.0 else {
        return Err(ApiError::unauthorized(
            "Wallet session required. Connect your wallet first.",
        ));
    };

    let Json(request) = payload?;
    let (Some(recipient), Some(amount)) = (
        request.recipient.filter(|r| !r.is_empty()),
        request.amount,
    ) else {
        return Err(ApiError::bad_request("Recipient and amount are required"));
    };
    let amount = whole_satoshis(amount)
        .ok_or_else(|| ApiError::bad_request("Amount must be a whole number greater than 0"))?;

    let wallet = state
        .sessions
        .get_wallet_client(&session_id)
        .ok_or_else(|| {
            ApiError::unauthorized("Wallet session expired or not found. Please reconnect.")
        })?;

    if state.store.get_certified_user(&recipient)?.is_none() {
        return Err(ApiError::not_found("Recipient is not a certified user"));
    }

    info!(recipient = %recipient.short(), amount, "Sending payment");

    let message_id = state
        .relay
        .send_payment(wallet.as_ref(), &recipient, amount)
        .await
        .map_err(|e| {
            warn!(error = %e, recipient = %recipient.short(), "Payment failed");
            ApiError::internal(format!("Failed to send payment: {e}"))
        })?;

    Ok(Json(InitiatePaymentResponse {
        success: true,
        message_id,
    }))
}
