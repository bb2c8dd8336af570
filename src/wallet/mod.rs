// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Core
//!
//! Balance-consistency engine on top of [`crate::storage`].
//!
//! - [`PurchaseEngine`] - debit a buyer and record an order
//! - [`TransferEngine`] - move coins between two users
//! - [`HistoryAggregator`] - snapshot view of balance, inventory and transfers
//!
//! Each mutating call runs in exactly one storage scope. A failed call leaves
//! no trace; a committed one changes balances and the ledger together.
//!
//! [`WalletService`] wires the three over one database and is what the HTTP
//! layer holds.

pub mod error;
pub mod history;
pub mod purchase;
pub mod retry;
pub mod transfer;

use std::sync::Arc;
use std::time::Duration;

pub use error::{WalletError, WalletResult};
pub use history::{
    HistoryAggregator, InventoryItem, ReceivedCoins, SentCoins, SupplyReport, WalletView,
};
pub use purchase::PurchaseEngine;
pub use retry::RetryPolicy;
pub use transfer::{TransferEngine, TransferReceipt};

use crate::storage::{
    BalanceStore, LedgerWriter, MerchCatalog, Order, TransactionCoordinator, UserDirectory,
    UserId, WalletDatabase,
};

/// Tuning knobs for the wallet core.
#[derive(Debug, Clone, Copy)]
pub struct WalletConfig {
    pub lock_timeout: Duration,
    pub retry_attempts: u32,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            lock_timeout: crate::storage::scope::DEFAULT_LOCK_TIMEOUT,
            retry_attempts: retry::DEFAULT_ATTEMPTS,
        }
    }
}

/// Facade over the purchase, transfer and history components.
#[derive(Clone)]
pub struct WalletService {
    purchases: PurchaseEngine,
    transfers: TransferEngine,
    history: HistoryAggregator,
}

impl WalletService {
    pub fn new(db: Arc<WalletDatabase>, config: WalletConfig) -> Self {
        let coordinator =
            TransactionCoordinator::new(Arc::clone(&db)).with_lock_timeout(config.lock_timeout);
        let balances = BalanceStore::new(Arc::clone(&db));
        let retry = RetryPolicy::new(config.retry_attempts);

        let purchases = PurchaseEngine::new(
            coordinator.clone(),
            balances.clone(),
            MerchCatalog::new(Arc::clone(&db)),
            LedgerWriter::new(),
        )
        .with_retry(retry);
        let transfers = TransferEngine::new(
            coordinator,
            balances,
            UserDirectory::new(Arc::clone(&db)),
            LedgerWriter::new(),
        )
        .with_retry(retry);

        Self {
            purchases,
            transfers,
            history: HistoryAggregator::new(db),
        }
    }

    pub async fn buy(&self, user: UserId, item: &str) -> WalletResult<Order> {
        self.purchases.buy(user, item).await
    }

    pub async fn send(
        &self,
        sender: UserId,
        receiver_login: &str,
        amount: i64,
    ) -> WalletResult<TransferReceipt> {
        self.transfers.send(sender, receiver_login, amount).await
    }

    pub fn view(&self, user: UserId) -> WalletResult<WalletView> {
        self.history.view(user)
    }

    pub fn supply(&self) -> WalletResult<SupplyReport> {
        self.history.supply()
    }
}
