// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Purchase engine: spend coins on a catalog item.

use crate::storage::{
    BalanceStore, LedgerWriter, MerchCatalog, Order, Scope, TransactionCoordinator, UserId,
};

use super::error::{WalletError, WalletResult};
use super::retry::RetryPolicy;

#[derive(Clone)]
pub struct PurchaseEngine {
    coordinator: TransactionCoordinator,
    balances: BalanceStore,
    catalog: MerchCatalog,
    ledger: LedgerWriter,
    retry: RetryPolicy,
}

impl PurchaseEngine {
    pub fn new(
        coordinator: TransactionCoordinator,
        balances: BalanceStore,
        catalog: MerchCatalog,
        ledger: LedgerWriter,
    ) -> Self {
        Self {
            coordinator,
            balances,
            catalog,
            ledger,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Buy one unit of `item_name` for `user`.
    ///
    /// Debit and order row commit together or not at all. Retried only on
    /// storage conflicts, each attempt in a fresh scope.
    pub async fn buy(&self, user: UserId, item_name: &str) -> WalletResult<Order> {
        self.retry
            .run("buy", move || self.buy_once(user, item_name))
            .await
    }

    async fn buy_once(&self, user: UserId, item_name: &str) -> WalletResult<Order> {
        let mut scope = self.coordinator.begin();
        match self.buy_in(&mut scope, user, item_name).await {
            Ok(order) => {
                scope.commit()?;
                tracing::info!(
                    user_id = %user,
                    item = item_name,
                    price = order.total_price,
                    "Purchase completed"
                );
                Ok(order)
            }
            Err(e) => {
                scope.rollback();
                tracing::warn!(user_id = %user, item = item_name, error = %e, "Purchase rejected");
                Err(e)
            }
        }
    }

    async fn buy_in(&self, scope: &mut Scope, user: UserId, item_name: &str) -> WalletResult<Order> {
        let item = self
            .catalog
            .get(item_name)?
            .ok_or_else(|| WalletError::ItemNotFound(item_name.to_string()))?;

        let balance = self
            .balances
            .locked_read(scope, user)
            .await?
            .ok_or(WalletError::UserNotFound(user))?;

        // Check and write happen under the same row lock
        let remaining = balance
            .checked_sub(item.price)
            .ok_or(WalletError::InsufficientFunds {
                balance,
                required: item.price,
            })?;

        self.balances.write(scope, user, remaining)?;
        let order = Order::single(user, &item);
        self.ledger.append_order(scope, order.clone())?;
        Ok(order)
    }
}
