// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet error taxonomy.
//!
//! Every failure of a purchase, transfer or history view is exactly one of
//! these kinds. Storage errors are folded in by [`From<StoreError>`]: a row
//! lock timeout becomes [`WalletError::StorageConflict`] (retryable), every
//! other store error becomes [`WalletError::StorageFailure`].

use thiserror::Error;

use crate::storage::{StoreError, UserId};

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("recipient '{0}' not found")]
    RecipientNotFound(String),

    #[error("item '{0}' not found")]
    ItemNotFound(String),

    #[error("insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds { balance: u64, required: u64 },

    #[error("invalid transfer: {0}")]
    InvalidTransfer(String),

    /// Lock timeout or serialization failure. Safe to retry.
    #[error("storage busy, try again: {0}")]
    StorageConflict(String),

    #[error("storage failure: {0}")]
    StorageFailure(String),
}

impl WalletError {
    /// Whether a caller may retry the whole unit of work.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WalletError::StorageConflict(_))
    }

    /// Stable machine-readable code.
    pub fn error_code(&self) -> &'static str {
        match self {
            WalletError::UserNotFound(_) => "user_not_found",
            WalletError::RecipientNotFound(_) => "recipient_not_found",
            WalletError::ItemNotFound(_) => "item_not_found",
            WalletError::InsufficientFunds { .. } => "insufficient_funds",
            WalletError::InvalidTransfer(_) => "invalid_transfer",
            WalletError::StorageConflict(_) => "storage_conflict",
            WalletError::StorageFailure(_) => "storage_failure",
        }
    }
}

impl From<StoreError> for WalletError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::LockTimeout(_) => WalletError::StorageConflict(e.to_string()),
            other => WalletError::StorageFailure(other.to_string()),
        }
    }
}

pub type WalletResult<T> = Result<T, WalletError>;
