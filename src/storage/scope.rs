// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction coordinator: one atomic unit of work per purchase or transfer.
//!
//! A [`Scope`] is an explicit value threaded through every store call of a
//! unit of work. It owns the row locks taken by locked reads, stages balance
//! writes and ledger appends, and flushes them in a single redb write
//! transaction on [`Scope::commit`]. Nothing is written before commit, so
//! rolling back is just dropping the scope. That covers early returns,
//! panics and cancelled futures alike.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::database::{StoreError, StoreResult, WalletDatabase};
use super::locks::{RowGuard, RowLocks};
use super::records::{CoinTransaction, Order, UserId};
use super::{balances, ledger};

/// Default wait for a contended row lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

/// Opens scopes against one database and one row-lock table.
#[derive(Clone)]
pub struct TransactionCoordinator {
    db: Arc<WalletDatabase>,
    locks: RowLocks,
    lock_timeout: Duration,
}

impl TransactionCoordinator {
    pub fn new(db: Arc<WalletDatabase>) -> Self {
        Self {
            db,
            locks: RowLocks::new(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn locks(&self) -> &RowLocks {
        &self.locks
    }

    /// Start a new unit of work.
    pub fn begin(&self) -> Scope {
        let scope = Scope {
            id: Uuid::new_v4(),
            db: Arc::clone(&self.db),
            locks: self.locks.clone(),
            lock_timeout: self.lock_timeout,
            rows: BTreeMap::new(),
            orders: Vec::new(),
            transfers: Vec::new(),
            finished: false,
        };
        tracing::debug!(scope = %scope.id, "Scope opened");
        scope
    }
}

/// A row locked by this scope.
struct LockedRow {
    _guard: RowGuard,
    committed: u64,
    staged: Option<u64>,
}

impl LockedRow {
    fn current(&self) -> u64 {
        self.staged.unwrap_or(self.committed)
    }
}

/// One atomic unit of work.
pub struct Scope {
    id: Uuid,
    db: Arc<WalletDatabase>,
    locks: RowLocks,
    lock_timeout: Duration,
    rows: BTreeMap<UserId, LockedRow>,
    orders: Vec<Order>,
    transfers: Vec<CoinTransaction>,
    finished: bool,
}

impl Scope {
    pub(crate) fn database(&self) -> &WalletDatabase {
        &self.db
    }

    /// Balance of a row this scope already holds, including staged writes.
    pub(crate) fn held_balance(&self, user: UserId) -> Option<u64> {
        self.rows.get(&user).map(LockedRow::current)
    }

    /// Acquire the row lock for `user`, enforcing ascending acquisition order.
    pub(crate) async fn lock_row(&mut self, user: UserId) -> StoreResult<RowGuard> {
        self.ensure_open()?;
        if let Some((&held, _)) = self.rows.last_key_value() {
            if user < held {
                return Err(StoreError::LockOrder {
                    requested: user,
                    held,
                });
            }
        }
        self.locks.acquire(user, self.lock_timeout).await
    }

    /// Keep a freshly locked row together with the balance read under the lock.
    pub(crate) fn adopt_row(&mut self, user: UserId, guard: RowGuard, committed: u64) {
        self.rows.insert(
            user,
            LockedRow {
                _guard: guard,
                committed,
                staged: None,
            },
        );
    }

    /// Release a lock taken for a row that turned out not to exist.
    pub(crate) fn discard_lock(&self, user: UserId, guard: RowGuard) {
        drop(guard);
        self.locks.prune(user);
    }

    pub(crate) fn stage_balance(&mut self, user: UserId, balance: u64) -> StoreResult<()> {
        self.ensure_open()?;
        let row = self
            .rows
            .get_mut(&user)
            .ok_or(StoreError::RowNotLocked(user))?;
        row.staged = Some(balance);
        Ok(())
    }

    fn ensure_balance_staged(&self, user: UserId) -> StoreResult<()> {
        match self.rows.get(&user) {
            Some(row) if row.staged.is_some() => Ok(()),
            _ => Err(StoreError::LedgerAhead(user)),
        }
    }

    pub(crate) fn stage_order(&mut self, order: Order) -> StoreResult<()> {
        self.ensure_open()?;
        self.ensure_balance_staged(order.user_id)?;
        self.orders.push(order);
        Ok(())
    }

    pub(crate) fn stage_transfer(&mut self, entry: CoinTransaction) -> StoreResult<()> {
        self.ensure_open()?;
        self.ensure_balance_staged(entry.user_id)?;
        self.transfers.push(entry);
        Ok(())
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.finished {
            return Err(StoreError::ScopeFinished);
        }
        Ok(())
    }

    /// Flush every staged write in one redb transaction, then release locks.
    ///
    /// Locks are held until the redb commit has returned, so the next holder
    /// of a row always reads the balance this scope wrote.
    pub fn commit(mut self) -> StoreResult<()> {
        self.ensure_open()?;

        let writes: Vec<(UserId, u64)> = self
            .rows
            .iter()
            .filter_map(|(user, row)| row.staged.map(|balance| (*user, balance)))
            .collect();

        if writes.is_empty() && self.orders.is_empty() && self.transfers.is_empty() {
            self.finished = true;
            tracing::debug!(scope = %self.id, "Scope committed with no writes");
            return Ok(());
        }

        let write_txn = self.db.begin_write()?;
        balances::flush(&write_txn, &writes)?;
        ledger::flush(&write_txn, &self.orders, &self.transfers)?;
        write_txn.commit()?;

        self.finished = true;
        tracing::debug!(
            scope = %self.id,
            balances = writes.len(),
            orders = self.orders.len(),
            transfers = self.transfers.len(),
            "Scope committed"
        );
        Ok(())
    }

    /// Discard staged writes and release every row lock.
    pub fn rollback(mut self) {
        self.finished = true;
        tracing::debug!(scope = %self.id, "Scope rolled back");
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(scope = %self.id, "Scope dropped before commit; rolled back");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::balances::BalanceStore;
    use crate::storage::records::STARTING_BALANCE;
    use crate::storage::users::UserDirectory;

    struct Fixture {
        coordinator: TransactionCoordinator,
        balances: BalanceStore,
        users: UserDirectory,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(WalletDatabase::open_in(dir.path()).unwrap());
        Fixture {
            coordinator: TransactionCoordinator::new(Arc::clone(&db))
                .with_lock_timeout(Duration::from_millis(100)),
            balances: BalanceStore::new(Arc::clone(&db)),
            users: UserDirectory::new(db),
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn commit_makes_writes_visible() {
        let f = fixture();
        let alice = f.users.create("alice", "hash").unwrap().id;

        let mut scope = f.coordinator.begin();
        let balance = f.balances.locked_read(&mut scope, alice).await.unwrap();
        assert_eq!(balance, Some(STARTING_BALANCE));
        f.balances.write(&mut scope, alice, 900).unwrap();

        // Not visible before commit
        assert_eq!(f.balances.read(alice).unwrap(), Some(STARTING_BALANCE));
        scope.commit().unwrap();
        assert_eq!(f.balances.read(alice).unwrap(), Some(900));
    }

    #[tokio::test]
    async fn rollback_and_drop_discard_writes() {
        let f = fixture();
        let alice = f.users.create("alice", "hash").unwrap().id;

        let mut scope = f.coordinator.begin();
        f.balances.locked_read(&mut scope, alice).await.unwrap();
        f.balances.write(&mut scope, alice, 1).unwrap();
        scope.rollback();
        assert_eq!(f.balances.read(alice).unwrap(), Some(STARTING_BALANCE));

        {
            let mut scope = f.coordinator.begin();
            f.balances.locked_read(&mut scope, alice).await.unwrap();
            f.balances.write(&mut scope, alice, 2).unwrap();
        }
        assert_eq!(f.balances.read(alice).unwrap(), Some(STARTING_BALANCE));
    }

    #[tokio::test]
    async fn held_row_blocks_second_scope_until_release() {
        let f = fixture();
        let alice = f.users.create("alice", "hash").unwrap().id;

        let mut first = f.coordinator.begin();
        f.balances.locked_read(&mut first, alice).await.unwrap();

        let mut second = f.coordinator.begin();
        let err = f.balances.locked_read(&mut second, alice).await.unwrap_err();
        assert!(matches!(err, StoreError::LockTimeout(_)));

        first.rollback();
        let balance = f.balances.locked_read(&mut second, alice).await.unwrap();
        assert_eq!(balance, Some(STARTING_BALANCE));
    }

    #[tokio::test]
    async fn descending_lock_order_is_rejected() {
        let f = fixture();
        let low = f.users.create("low", "hash").unwrap().id;
        let high = f.users.create("high", "hash").unwrap().id;

        let mut scope = f.coordinator.begin();
        f.balances.locked_read(&mut scope, high).await.unwrap();
        let err = f.balances.locked_read(&mut scope, low).await.unwrap_err();
        assert!(matches!(err, StoreError::LockOrder { .. }));
    }

    #[tokio::test]
    async fn write_without_lock_is_rejected() {
        let f = fixture();
        let alice = f.users.create("alice", "hash").unwrap().id;

        let mut scope = f.coordinator.begin();
        let err = f.balances.write(&mut scope, alice, 5).unwrap_err();
        assert!(matches!(err, StoreError::RowNotLocked(_)));
    }

    #[tokio::test]
    async fn unknown_user_lock_is_pruned() {
        let f = fixture();
        let mut scope = f.coordinator.begin();
        let balance = f.balances.locked_read(&mut scope, UserId(999)).await.unwrap();
        assert_eq!(balance, None);
        assert!(f.coordinator.locks().is_empty());
    }
}
