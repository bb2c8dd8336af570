// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Append-only ledger of orders and coin transactions.
//!
//! ## Key Layout
//!
//! Both tables are keyed by `(user_id, sequence)`. The sequence is one global
//! counter shared by both tables, so a prefix scan over a user returns their
//! rows in commit order.
//!
//! The writer only appends. There is no update or delete path.

use redb::{ReadableTable, TableDefinition, WriteTransaction};
use serde::de::DeserializeOwned;

use super::database::{next_sequence, Snapshot, StoreResult};
use super::records::{CoinTransaction, Order, UserId};
use super::scope::Scope;

/// Orders: (user id, sequence) → serialized Order (JSON bytes).
pub(crate) const ORDERS: TableDefinition<(u64, u64), &[u8]> = TableDefinition::new("orders");

/// Coin transactions: (user id, sequence) → serialized CoinTransaction (JSON bytes).
pub(crate) const COIN_TRANSACTIONS: TableDefinition<(u64, u64), &[u8]> =
    TableDefinition::new("coin_transactions");

const LEDGER_SEQUENCE: &str = "ledger";

/// Stages ledger rows inside a scope.
///
/// An append is refused unless the owning user's balance was written in the
/// same scope, so a committed ledger row always has its balance mutation
/// beside it.
#[derive(Clone, Copy, Default)]
pub struct LedgerWriter;

impl LedgerWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn append_order(&self, scope: &mut Scope, order: Order) -> StoreResult<()> {
        scope.stage_order(order)
    }

    pub fn append_transfer(&self, scope: &mut Scope, entry: CoinTransaction) -> StoreResult<()> {
        scope.stage_transfer(entry)
    }
}

/// Insert staged rows. Called once per scope commit.
pub(crate) fn flush(
    write_txn: &WriteTransaction,
    orders: &[Order],
    transfers: &[CoinTransaction],
) -> StoreResult<()> {
    if !orders.is_empty() {
        let mut keyed = Vec::with_capacity(orders.len());
        for order in orders {
            keyed.push((
                (order.user_id.0, next_sequence(write_txn, LEDGER_SEQUENCE)?),
                serde_json::to_vec(order)?,
            ));
        }
        let mut table = write_txn.open_table(ORDERS)?;
        for (key, json) in &keyed {
            table.insert(*key, json.as_slice())?;
        }
    }

    if !transfers.is_empty() {
        let mut keyed = Vec::with_capacity(transfers.len());
        for entry in transfers {
            keyed.push((
                (entry.user_id.0, next_sequence(write_txn, LEDGER_SEQUENCE)?),
                serde_json::to_vec(entry)?,
            ));
        }
        let mut table = write_txn.open_table(COIN_TRANSACTIONS)?;
        for (key, json) in &keyed {
            table.insert(*key, json.as_slice())?;
        }
    }

    Ok(())
}

fn scan_user<T: DeserializeOwned>(
    snapshot: &Snapshot,
    definition: TableDefinition<(u64, u64), &[u8]>,
    user: UserId,
) -> StoreResult<Vec<T>> {
    let table = snapshot.txn().open_table(definition)?;
    let mut rows = Vec::new();
    for entry in table.range((user.0, 0u64)..=(user.0, u64::MAX))? {
        let (_, value) = entry?;
        rows.push(serde_json::from_slice(value.value())?);
    }
    Ok(rows)
}

/// `user`'s orders in commit order.
pub(crate) fn orders_in(snapshot: &Snapshot, user: UserId) -> StoreResult<Vec<Order>> {
    scan_user(snapshot, ORDERS, user)
}

/// `user`'s coin transactions in commit order.
pub(crate) fn transfers_in(snapshot: &Snapshot, user: UserId) -> StoreResult<Vec<CoinTransaction>> {
    scan_user(snapshot, COIN_TRANSACTIONS, user)
}

/// Sum of `total_price` over every order of every user.
pub(crate) fn total_spent_in(snapshot: &Snapshot) -> StoreResult<u128> {
    let table = snapshot.txn().open_table(ORDERS)?;
    let mut total = 0u128;
    for entry in table.iter()? {
        let (_, value) = entry?;
        let order: Order = serde_json::from_slice(value.value())?;
        total += u128::from(order.total_price);
    }
    Ok(total)
}
