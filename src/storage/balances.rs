// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Balance store: user id → coin balance.
//!
//! Inside a scope, [`BalanceStore::locked_read`] takes the row lock and
//! [`BalanceStore::write`] stages the new value. Outside a scope,
//! [`BalanceStore::read`] is a point-in-time, non-locking read.

use std::sync::Arc;

use redb::{ReadableTable, TableDefinition, WriteTransaction};

use super::database::{Snapshot, StoreError, StoreResult, WalletDatabase};
use super::records::UserId;
use super::scope::Scope;

/// Balances: user id → coins.
pub(crate) const BALANCES: TableDefinition<u64, u64> = TableDefinition::new("balances");

#[derive(Clone)]
pub struct BalanceStore {
    db: Arc<WalletDatabase>,
}

impl BalanceStore {
    pub fn new(db: Arc<WalletDatabase>) -> Self {
        Self { db }
    }

    /// Read `user`'s balance under a row lock held until the scope ends.
    ///
    /// Returns `Ok(None)` when the user is unknown; no lock is kept in that
    /// case. Reading a row the scope already holds returns the staged value.
    pub async fn locked_read(&self, scope: &mut Scope, user: UserId) -> StoreResult<Option<u64>> {
        if let Some(balance) = scope.held_balance(user) {
            return Ok(Some(balance));
        }

        let guard = scope.lock_row(user).await?;
        // Read committed state only after the lock is ours
        match read_committed(scope.database(), user)? {
            Some(balance) => {
                scope.adopt_row(user, guard, balance);
                Ok(Some(balance))
            }
            None => {
                scope.discard_lock(user, guard);
                Ok(None)
            }
        }
    }

    /// Stage `balance` as `user`'s new value. Requires a prior locked read.
    pub fn write(&self, scope: &mut Scope, user: UserId, balance: u64) -> StoreResult<()> {
        scope.stage_balance(user, balance)
    }

    /// Non-locking read of committed state.
    pub fn read(&self, user: UserId) -> StoreResult<Option<u64>> {
        read_committed(&self.db, user)
    }
}

fn read_committed(db: &WalletDatabase, user: UserId) -> StoreResult<Option<u64>> {
    read_in(&db.snapshot()?, user)
}

/// Balance of `user` as of `snapshot`.
pub(crate) fn read_in(snapshot: &Snapshot, user: UserId) -> StoreResult<Option<u64>> {
    let table = snapshot.txn().open_table(BALANCES)?;
    Ok(table.get(user.0)?.map(|v| v.value()))
}

/// Sum of every balance as of `snapshot`.
pub(crate) fn total_in(snapshot: &Snapshot) -> StoreResult<u128> {
    let table = snapshot.txn().open_table(BALANCES)?;
    let mut total = 0u128;
    for entry in table.iter()? {
        let (_, balance) = entry?;
        total += u128::from(balance.value());
    }
    Ok(total)
}

/// Write staged balances. Every row must already exist.
pub(crate) fn flush(write_txn: &WriteTransaction, writes: &[(UserId, u64)]) -> StoreResult<()> {
    let mut table = write_txn.open_table(BALANCES)?;
    for (user, balance) in writes {
        if table.get(user.0)?.is_none() {
            return Err(StoreError::MissingRow(*user));
        }
        table.insert(user.0, *balance)?;
    }
    Ok(())
}

/// Insert the opening balance for a new user.
pub(crate) fn insert_opening(write_txn: &WriteTransaction, user: UserId, balance: u64) -> StoreResult<()> {
    let mut table = write_txn.open_table(BALANCES)?;
    table.insert(user.0, balance)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::records::STARTING_BALANCE;
    use crate::storage::users::UserDirectory;

    #[test]
    fn read_unknown_user_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(WalletDatabase::open_in(dir.path()).unwrap());
        let store = BalanceStore::new(db);
        assert_eq!(store.read(UserId(42)).unwrap(), None);
    }

    #[test]
    fn total_sums_all_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(WalletDatabase::open_in(dir.path()).unwrap());
        let users = UserDirectory::new(Arc::clone(&db));
        users.create("a", "h").unwrap();
        users.create("b", "h").unwrap();

        let snapshot = db.snapshot().unwrap();
        assert_eq!(
            total_in(&snapshot).unwrap(),
            2 * u128::from(STARTING_BALANCE)
        );
    }

    #[test]
    fn flush_rejects_missing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db = WalletDatabase::open_in(dir.path()).unwrap();
        let write_txn = db.begin_write().unwrap();
        let err = flush(&write_txn, &[(UserId(9), 10)]).unwrap_err();
        assert!(matches!(err, StoreError::MissingRow(UserId(9))));
    }
}
