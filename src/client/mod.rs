// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Client Side
//!
//! What the browser does on the user's behalf, expressed against the same
//! capability traits the server uses:
//!
//! - [`ApiClient`] keeps the local copy of a wallet session and talks to the
//!   REST API, dropping the session when the server says it is gone.
//! - [`flows`] runs the operations that need the user's own wallet:
//!   browser-side certification, payments, inbox processing.

pub mod api;
pub mod flows;

pub use api::{ApiClient, LocalSession};
pub use flows::{
    acknowledge_message, certify_identity, check_inbox, send_payment, BrowserCertification,
    DEFAULT_MESSAGE_BOX,
};

use crate::sdk::SdkError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Wallet session expired. Please reconnect.")]
    SessionExpired,

    /// Error envelope returned by the API.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Failed to {action}: {source}")]
    Sdk {
        action: &'static str,
        #[source]
        source: SdkError,
    },
}

impl ClientError {
    pub(crate) fn sdk(action: &'static str) -> impl FnOnce(SdkError) -> Self {
        move |source| ClientError::Sdk { action, source }
    }
}
