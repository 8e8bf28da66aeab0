// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Sessions
//!
//! In-memory registry binding opaque session tokens to identity keys and
//! lazily created wallet handles. Contents do not survive a restart; clients
//! reconnect through their wallet.
//!
//! ## Lifecycle
//!
//! ```text
//! connect ──► active ──(idle > timeout)──► expired ──► removed
//!                │                                      ▲
//!                └───────────── disconnect ─────────────┘
//! ```
//!
//! Expired and removed sessions look the same to callers. Expiry is
//! enforced on every read; [`SessionSweeper`] only reclaims memory held by
//! sessions nobody reads again.

pub mod clock;
pub mod registry;
pub mod sweeper;

pub use clock::{Clock, SystemClock};
pub use registry::{SessionError, SessionInfo, SessionRegistry, DEFAULT_SESSION_TIMEOUT};
pub use sweeper::{SessionSweeper, DEFAULT_SWEEP_INTERVAL};
