// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Certified-User Storage
//!
//! Certification records are kept in an embedded redb database, one JSON
//! document per identity key.
//!
//! ## Table Layout
//!
//! - `certified_users`: identity_key → serialized [`CertifiedUser`](crate::models::CertifiedUser)
//! - `certified_by_date`: `!timestamp_micros_be | identity_key` → identity_key
//!
//! The date index keeps listings in newest-first order without sorting in
//! memory. Both tables are written in the same transaction, so an upsert
//! never leaves a stale index entry behind.

pub mod certifications;

pub use certifications::{CertificationStore, StorageError, StorageResult};
