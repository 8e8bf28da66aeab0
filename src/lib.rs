// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! MessageBox Certifier - identity certification and peer payments
//!
//! REST service that certifies identity keys against a message-relay host,
//! keeps a directory of certified users, and relays payments between them
//! through the wallet and message-box SDKs.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `client` - REST client and wallet-side flows used by the front-end
//! - `sdk` - Wallet and message-relay capabilities and their HTTP bindings
//! - `session` - In-memory wallet sessions with idle expiry
//! - `storage` - Certified-user directory (redb)

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod sdk;
pub mod session;
pub mod state;
pub mod storage;
pub mod tls;
