// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded wallet database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user id → serialized UserRecord
//! - `user_logins`: login → user id
//! - `balances`: user id → coin balance
//! - `merch`: item name → price
//! - `orders`: (user id, sequence) → serialized Order
//! - `coin_transactions`: (user id, sequence) → serialized CoinTransaction
//! - `sequences`: counter name → next value
//!
//! Table definitions live next to the component that owns them; this module
//! only opens the file, pre-creates every table and hands out redb
//! transactions.

use std::path::Path;

use redb::{Database, ReadTransaction, ReadableDatabase, TableDefinition, WriteTransaction};

use super::records::UserId;

// =============================================================================
// Table Definitions
// =============================================================================

/// Counters: name → last allocated value.
pub(crate) const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

/// Database file name inside the data directory.
pub const DATABASE_FILE: &str = "wallet.redb";

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
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

    /// Row lock not acquired within the configured timeout.
    #[error("timed out waiting for row lock on user {0}")]
    LockTimeout(UserId),

    /// A scope tried to lock a row below one it already holds.
    #[error("lock order violation: user {requested} requested while holding user {held}")]
    LockOrder { requested: UserId, held: UserId },

    #[error("balance write for user {0} without a row lock in this scope")]
    RowNotLocked(UserId),

    #[error("ledger append for user {0} without a balance write in this scope")]
    LedgerAhead(UserId),

    #[error("balance row for user {0} disappeared before commit")]
    MissingRow(UserId),

    #[error("scope already finished")]
    ScopeFinished,

    #[error("login already exists: {0}")]
    DuplicateLogin(String),

    #[error("catalog item '{0}' must have a positive price")]
    InvalidPrice(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// WalletDatabase
// =============================================================================

/// Embedded ACID wallet database.
pub struct WalletDatabase {
    db: Database,
}

impl WalletDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(super::users::USERS)?;
            let _ = write_txn.open_table(super::users::USER_LOGINS)?;
            let _ = write_txn.open_table(super::balances::BALANCES)?;
            let _ = write_txn.open_table(super::catalog::MERCH)?;
            let _ = write_txn.open_table(super::ledger::ORDERS)?;
            let _ = write_txn.open_table(super::ledger::COIN_TRANSACTIONS)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "Wallet database opened");
        Ok(Self { db })
    }

    /// Open `wallet.redb` inside `data_dir`.
    pub fn open_in(data_dir: &Path) -> StoreResult<Self> {
        Self::open(&data_dir.join(DATABASE_FILE))
    }

    /// Point-in-time, non-locking view of committed state.
    pub fn snapshot(&self) -> StoreResult<Snapshot> {
        Ok(Snapshot {
            txn: self.db.begin_read()?,
        })
    }

    pub(crate) fn begin_write(&self) -> StoreResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }
}

/// A consistent read view over every table.
///
/// Components read through the same snapshot so a view assembled from several
/// tables never mixes states from different commits.
pub struct Snapshot {
    txn: ReadTransaction,
}

impl Snapshot {
    pub(crate) fn txn(&self) -> &ReadTransaction {
        &self.txn
    }
}

/// Increment and return the counter `name` inside an open write transaction.
pub(crate) fn next_sequence(write_txn: &WriteTransaction, name: &str) -> StoreResult<u64> {
    use redb::ReadableTable;

    let mut table = write_txn.open_table(SEQUENCES)?;
    let next = table.get(name)?.map(|v| v.value()).unwrap_or(0) + 1;
    table.insert(name, next)?;
    Ok(next)
}

// =============================================================================
// Tests
// =============================================================================
