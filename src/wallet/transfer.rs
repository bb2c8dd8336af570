// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transfer engine: move coins from one user to another.
//!
//! Both rows are locked before either balance is touched, lower user id
//! first. Two transfers that cross each other (A→B while B→A) therefore
//! queue on the same first lock instead of deadlocking.

use serde::Serialize;

use crate::storage::{
    BalanceStore, CoinTransaction, LedgerWriter, Scope, TransactionCoordinator, UserDirectory,
    UserId,
};

use super::error::{WalletError, WalletResult};
use super::retry::RetryPolicy;

/// Outcome of a committed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    pub sender: UserId,
    pub receiver: UserId,
    pub amount: u64,
    pub sender_balance: u64,
    pub receiver_balance: u64,
}

#[derive(Clone)]
pub struct TransferEngine {
    coordinator: TransactionCoordinator,
    balances: BalanceStore,
    users: UserDirectory,
    ledger: LedgerWriter,
    retry: RetryPolicy,
}

impl TransferEngine {
    pub fn new(
        coordinator: TransactionCoordinator,
        balances: BalanceStore,
        users: UserDirectory,
        ledger: LedgerWriter,
    ) -> Self {
        Self {
            coordinator,
            balances,
            users,
            ledger,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Send `amount` coins from `sender` to the user whose login is
    /// `receiver_login`.
    ///
    /// Rejects non-positive amounts and self-transfers with
    /// [`WalletError::InvalidTransfer`] before any lock is taken.
    pub async fn send(
        &self,
        sender: UserId,
        receiver_login: &str,
        amount: i64,
    ) -> WalletResult<TransferReceipt> {
        let amount = u64::try_from(amount)
            .ok()
            .filter(|a| *a > 0)
            .ok_or_else(|| {
                WalletError::InvalidTransfer(format!("amount must be positive, got {amount}"))
            })?;

        let receiver = self
            .users
            .id_by_login(receiver_login)?
            .ok_or_else(|| WalletError::RecipientNotFound(receiver_login.to_string()))?;

        if receiver == sender {
            return Err(WalletError::InvalidTransfer(
                "cannot send coins to yourself".to_string(),
            ));
        }

        self.retry
            .run("send_coin", move || self.send_once(sender, receiver, amount))
            .await
    }

    async fn send_once(
        &self,
        sender: UserId,
        receiver: UserId,
        amount: u64,
    ) -> WalletResult<TransferReceipt> {
        let mut scope = self.coordinator.begin();
        match self.send_in(&mut scope, sender, receiver, amount).await {
            Ok(receipt) => {
                scope.commit()?;
                tracing::info!(
                    from = %sender,
                    to = %receiver,
                    amount,
                    "Transfer completed"
                );
                Ok(receipt)
            }
            Err(e) => {
                scope.rollback();
                tracing::warn!(from = %sender, to = %receiver, amount, error = %e, "Transfer rejected");
                Err(e)
            }
        }
    }

    async fn send_in(
        &self,
        scope: &mut Scope,
        sender: UserId,
        receiver: UserId,
        amount: u64,
    ) -> WalletResult<TransferReceipt> {
        let (first, second) = if sender < receiver {
            (sender, receiver)
        } else {
            (receiver, sender)
        };
        let first_balance = self.balances.locked_read(scope, first).await?;
        let second_balance = self.balances.locked_read(scope, second).await?;
        let (sender_balance, receiver_balance) = if first == sender {
            (first_balance, second_balance)
        } else {
            (second_balance, first_balance)
        };

        let sender_balance = sender_balance.ok_or(WalletError::UserNotFound(sender))?;
        let receiver_balance = receiver_balance
            .ok_or_else(|| WalletError::RecipientNotFound(receiver.to_string()))?;

        let sender_after = sender_balance
            .checked_sub(amount)
            .ok_or(WalletError::InsufficientFunds {
                balance: sender_balance,
                required: amount,
            })?;
        let receiver_after = receiver_balance.checked_add(amount).ok_or_else(|| {
            WalletError::InvalidTransfer("receiver balance would overflow".to_string())
        })?;

        self.balances.write(scope, sender, sender_after)?;
        self.balances.write(scope, receiver, receiver_after)?;

        let (sent, received) = CoinTransaction::transfer_pair(sender, receiver, amount);
        self.ledger.append_transfer(scope, sent)?;
        self.ledger.append_transfer(scope, received)?;

        Ok(TransferReceipt {
            sender,
            receiver,
            amount,
            sender_balance: sender_after,
            receiver_balance: receiver_after,
        })
    }
}
