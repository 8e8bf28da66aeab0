// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request extractors shared by the route handlers.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

/// Header carrying the wallet session token.
pub const SESSION_HEADER: &str = "x-session-id";

/// Value of the `X-Session-Id` header, if present and non-blank.
///
/// Never rejects; each route decides whether a missing header is a 400, a
/// 401 or simply means "no session".
///
/// ```rust,ignore
/// async fn status(session: SessionHeader) -> Result<Json<_>, ApiError> {
///     let session_id = session.require()?;
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHeader(pub Option<String>);

impl SessionHeader {
    /// The session id, or a 400 when the header is missing.
    pub fn require(self) -> Result<String, ApiError> {
        self.0
            .ok_or_else(|| ApiError::bad_request("No session ID provided"))
    }
}

impl<S> FromRequestParts<S> for SessionHeader
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        Ok(SessionHeader(value))
    }
}
