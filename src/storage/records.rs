// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Persisted record types.
//!
//! Users, merch items, orders and coin-transaction ledger entries. Records
//! that live as table values are stored as JSON bytes; balances and prices
//! are stored as plain `u64` so a negative balance cannot be represented.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Starting balance granted to every newly provisioned user.
pub const STARTING_BALANCE: u64 = 1000;

/// Opaque numeric user identity.
///
/// Ordering on `UserId` is the canonical row-lock acquisition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored user profile. The balance lives in its own table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    /// Unique, case-sensitive login key.
    pub login: String,
    /// Encoded password credential (see `auth::password`).
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Catalog entry. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchItem {
    pub name: String,
    pub price: u64,
}

/// One purchase. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub user_id: UserId,
    /// Catalog key of the purchased item.
    pub item: String,
    pub quantity: u32,
    pub total_price: u64,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Single-unit order for `item` at the catalog price.
    pub fn single(user_id: UserId, item: &MerchItem) -> Self {
        Self {
            user_id,
            item: item.name.clone(),
            quantity: 1,
            total_price: item.price,
            created_at: Utc::now(),
        }
    }
}

/// Direction of a ledger entry relative to its owning user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    TransferSent,
    TransferReceived,
}

/// One balance movement caused by a transfer. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinTransaction {
    pub user_id: UserId,
    pub kind: LedgerKind,
    /// Always positive; the direction is carried by `kind`.
    pub amount: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl CoinTransaction {
    /// The mirrored pair of entries for a transfer, stamped with one timestamp.
    pub fn transfer_pair(sender: UserId, receiver: UserId, amount: u64) -> (Self, Self) {
        let now = Utc::now();
        let sent = Self {
            user_id: sender,
            kind: LedgerKind::TransferSent,
            amount,
            counterparty: Some(receiver),
            created_at: now,
        };
        let received = Self {
            user_id: receiver,
            kind: LedgerKind::TransferReceived,
            amount,
            counterparty: Some(sender),
            created_at: now,
        };
        (sent, received)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_kind_serializes_snake_case() {
        let json = serde_json::to_string(&LedgerKind::TransferReceived).unwrap();
        assert_eq!(json, r#""transfer_received""#);
        let json = serde_json::to_string(&LedgerKind::TransferSent).unwrap();
        assert_eq!(json, r#""transfer_sent""#);
    }

    #[test]
    fn transfer_pair_mirrors_counterparties() {
        let (sent, received) = CoinTransaction::transfer_pair(UserId(1), UserId(2), 100);
        assert_eq!(sent.kind, LedgerKind::TransferSent);
        assert_eq!(sent.counterparty, Some(UserId(2)));
        assert_eq!(received.kind, LedgerKind::TransferReceived);
        assert_eq!(received.counterparty, Some(UserId(1)));
        assert_eq!(sent.amount, received.amount);
        assert_eq!(sent.created_at, received.created_at);
    }

    #[test]
    fn single_order_uses_catalog_price() {
        let item = MerchItem {
            name: "t-shirt".to_string(),
            price: 80,
        };
        let order = Order::single(UserId(7), &item);
        assert_eq!(order.quantity, 1);
        assert_eq!(order.total_price, 80);
        assert_eq!(order.item, "t-shirt");
    }
}
