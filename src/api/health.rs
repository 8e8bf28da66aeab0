// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Liveness response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Wallet sessions currently held, including idle ones not yet swept.
    pub active_sessions: usize,
}

/// Service name, version and route map.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceIndex {
    pub name: String,
    pub version: String,
    pub endpoints: BTreeMap<String, String>,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is alive", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        active_sessions: state.sessions.active_session_count(),
    })
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, body = ServiceIndex))
)]
pub async fn index() -> Json<ServiceIndex> {
    let endpoints = [
        ("health", "GET /health"),
        ("docs", "GET /docs"),
        ("connect", "POST /api/wallet/connect"),
        ("status", "GET /api/wallet/status"),
        ("disconnect", "POST /api/wallet/disconnect"),
        ("certify", "POST /api/certify"),
        ("storeCertification", "POST /api/store-certification"),
        ("certifiedUsers", "GET /api/certified-users"),
        ("search", "GET /api/certified-users/search?q="),
        ("initiatePayment", "POST /api/initiate-payment"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    Json(ServiceIndex {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints,
    })
}
