// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! redb-backed store for certified users.

use std::path::Path;

use redb::{
    backends::InMemoryBackend, Database, ReadableDatabase, ReadableTable, ReadableTableMetadata,
    TableDefinition,
};

use crate::models::{CertifiedUser, IdentityKey};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: identity_key → serialized CertifiedUser (JSON bytes).
const CERTIFIED_USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("certified_users");

/// Index: `!timestamp_be|identity_key` → identity_key, for newest-first scans.
const CERTIFIED_BY_DATE: TableDefinition<&[u8], &str> = TableDefinition::new("certified_by_date");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Build the date index key for a record.
///
/// Format: `inverted_timestamp_micros_be | identity_key`. Inverting the
/// timestamp makes a forward scan return the most recent certification first.
fn make_date_key(user: &CertifiedUser) -> Vec<u8> {
    let micros = user.certification_date.timestamp_micros();
    let identity = user.identity_key.as_str();
    let mut key = Vec::with_capacity(8 + 1 + identity.len());
    key.extend_from_slice(&(!(micros as u64)).to_be_bytes());
    key.push(b'|');
    key.extend_from_slice(identity.as_bytes());
    key
}

// =============================================================================
// CertificationStore
// =============================================================================

/// Persistent store of certified users keyed by identity key.
pub struct CertificationStore {
    db: Database,
}

impl CertificationStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Database::create(path)?)
    }

    /// Volatile store for tests and local experiments.
    pub fn in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        // Pre-create tables so read transactions on a fresh file don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CERTIFIED_USERS)?;
            let _ = write_txn.open_table(CERTIFIED_BY_DATE)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Insert or replace the record for `user.identity_key`.
    ///
    /// All fields are overwritten. Storing the same record twice leaves the
    /// database in the same state as storing it once.
    pub fn store_certification(&self, user: &CertifiedUser) -> StorageResult<()> {
        let json = serde_json::to_vec(user)?;
        let identity = user.identity_key.as_str();

        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(CERTIFIED_USERS)?;
            let mut by_date = write_txn.open_table(CERTIFIED_BY_DATE)?;

            let previous = users.get(identity)?.map(|v| v.value().to_vec());
            if let Some(bytes) = previous {
                let old: CertifiedUser = serde_json::from_slice(&bytes)?;
                by_date.remove(make_date_key(&old).as_slice())?;
            }

            users.insert(identity, json.as_slice())?;
            by_date.insert(make_date_key(user).as_slice(), identity)?;
        }
        write_txn.commit()?;

        tracing::debug!(identity_key = %user.identity_key.short(), "Certification stored");
        Ok(())
    }

    /// Exact-match lookup. A missing record is `Ok(None)`.
    pub fn get_certified_user(&self, identity_key: &IdentityKey) -> StorageResult<Option<CertifiedUser>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CERTIFIED_USERS)?;
        match table.get(identity_key.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All records, most recent certification first.
    pub fn list_all_certified_users(&self) -> StorageResult<Vec<CertifiedUser>> {
        let read_txn = self.db.begin_read()?;
        let by_date = read_txn.open_table(CERTIFIED_BY_DATE)?;
        let users = read_txn.open_table(CERTIFIED_USERS)?;

        let mut results = Vec::new();
        for entry in by_date.iter()? {
            let (_, identity) = entry?;
            if let Some(value) = users.get(identity.value())? {
                results.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(results)
    }

    /// Case-insensitive substring match on alias, most recent first.
    ///
    /// Records without an alias never match. Rejecting an empty query is the
    /// caller's job.
    pub fn search_by_alias(&self, query: &str) -> StorageResult<Vec<CertifiedUser>> {
        let needle = query.to_lowercase();
        Ok(self
            .list_all_certified_users()?
            .into_iter()
            .filter(|user| {
                user.alias
                    .as_deref()
                    .is_some_and(|alias| alias.to_lowercase().contains(&needle))
            })
            .collect())
    }

    /// Remove one record. Returns whether it existed.
    pub fn delete_certification(&self, identity_key: &IdentityKey) -> StorageResult<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut users = write_txn.open_table(CERTIFIED_USERS)?;
            let mut by_date = write_txn.open_table(CERTIFIED_BY_DATE)?;

            let removed = users
                .remove(identity_key.as_str())?
                .map(|v| v.value().to_vec());
            match removed {
                Some(bytes) => {
                    let old: CertifiedUser = serde_json::from_slice(&bytes)?;
                    by_date.remove(make_date_key(&old).as_slice())?;
                    true
                }
                None => false,
            }
        };
        write_txn.commit()?;
        Ok(existed)
    }

    /// Number of stored certifications.
    pub fn count(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CERTIFIED_USERS)?;
        Ok(table.len()?)
    }
}

// =============================================================================
// Tests
// =============================================================================
