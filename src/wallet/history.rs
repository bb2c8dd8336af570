// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-side projection of a user's wallet.
//!
//! Every view is recomputed from one redb read snapshot: the balance, the
//! order rows, the transfer rows and the counterparty logins all come from
//! the same committed state. No locks are taken.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;

use crate::storage::{
    balances, ledger, users, LedgerKind, Snapshot, UserId, WalletDatabase,
};

use super::error::{WalletError, WalletResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryItem {
    pub item: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceivedCoins {
    pub from_user: String,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentCoins {
    pub to_user: String,
    pub amount: u64,
}

/// Balance, inventory and transfer history as of one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletView {
    pub balance: u64,
    /// Sorted by item name.
    pub inventory: Vec<InventoryItem>,
    /// Oldest first.
    pub received: Vec<ReceivedCoins>,
    /// Oldest first.
    pub sent: Vec<SentCoins>,
}

/// Coins held plus coins spent, across all users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SupplyReport {
    pub total_balances: u128,
    pub total_spent: u128,
}

impl SupplyReport {
    pub fn total(&self) -> u128 {
        self.total_balances + self.total_spent
    }
}

#[derive(Clone)]
pub struct HistoryAggregator {
    db: Arc<WalletDatabase>,
}

impl HistoryAggregator {
    pub fn new(db: Arc<WalletDatabase>) -> Self {
        Self { db }
    }

    pub fn view(&self, user: UserId) -> WalletResult<WalletView> {
        let snapshot = self.db.snapshot()?;
        let balance = balances::read_in(&snapshot, user)?.ok_or(WalletError::UserNotFound(user))?;

        let mut grouped: BTreeMap<String, u64> = BTreeMap::new();
        for order in ledger::orders_in(&snapshot, user)? {
            *grouped.entry(order.item).or_default() += u64::from(order.quantity);
        }
        let inventory = grouped
            .into_iter()
            .map(|(item, quantity)| InventoryItem { item, quantity })
            .collect();

        let mut logins = LoginResolver::new(&snapshot);
        let mut received = Vec::new();
        let mut sent = Vec::new();
        for entry in ledger::transfers_in(&snapshot, user)? {
            let counterparty = logins.resolve(entry.counterparty)?;
            match entry.kind {
                LedgerKind::TransferReceived => received.push(ReceivedCoins {
                    from_user: counterparty,
                    amount: entry.amount,
                }),
                LedgerKind::TransferSent => sent.push(SentCoins {
                    to_user: counterparty,
                    amount: entry.amount,
                }),
            }
        }

        Ok(WalletView {
            balance,
            inventory,
            received,
            sent,
        })
    }

    pub fn supply(&self) -> WalletResult<SupplyReport> {
        let snapshot = self.db.snapshot()?;
        Ok(SupplyReport {
            total_balances: balances::total_in(&snapshot)?,
            total_spent: ledger::total_spent_in(&snapshot)?,
        })
    }
}

/// Memoized id → login lookups within one snapshot.
struct LoginResolver<'a> {
    snapshot: &'a Snapshot,
    cache: HashMap<UserId, String>,
}

impl<'a> LoginResolver<'a> {
    fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            cache: HashMap::new(),
        }
    }

    fn resolve(&mut self, id: Option<UserId>) -> WalletResult<String> {
        let Some(id) = id else {
            return Ok(String::new());
        };
        if let Some(login) = self.cache.get(&id) {
            return Ok(login.clone());
        }
        // Users are never deleted, so a missing row means a corrupt ledger
        let login = users::get_in(self.snapshot, id)?
            .map(|user| user.login)
            .ok_or_else(|| {
                WalletError::StorageFailure(format!("ledger references unknown user {id}"))
            })?;
        self.cache.insert(id, login.clone());
        Ok(login)
    }
}
