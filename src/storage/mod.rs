// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Durable Storage Module
//!
//! This module provides persistent storage on a single **redb** file. redb
//! is the only shared mutable resource in the service; nothing here caches a
//! balance in memory.
//!
//! ## Components
//!
//! - [`BalanceStore`] - locked read / staged write of coin balances
//! - [`MerchCatalog`] - read-only item prices
//! - [`LedgerWriter`] - append-only orders and coin transactions
//! - [`TransactionCoordinator`] - opens a [`Scope`] per unit of work
//! - [`UserDirectory`] - user provisioning and identity lookups
//!
//! ## Concurrency Model
//!
//! ```text
//! scope A: lock(u1) ─ read ─ lock(u2) ─ read ─ stage ─ commit ─ unlock
//! scope B:              lock(u1) ........ waits ........ ─ read (sees A)
//! ```
//!
//! - Row locks are taken in ascending user id order within a scope
//! - A contended lock waits at most the configured timeout
//! - Writes reach redb only on commit, in one write transaction

pub mod balances;
pub mod catalog;
pub mod database;
pub mod ledger;
pub mod locks;
pub mod records;
pub mod scope;
pub mod users;

pub use balances::BalanceStore;
pub use catalog::{MerchCatalog, DEFAULT_CATALOG};
pub use database::{Snapshot, StoreError, StoreResult, WalletDatabase};
pub use ledger::LedgerWriter;
pub use locks::RowLocks;
pub use records::{
    CoinTransaction, LedgerKind, MerchItem, Order, UserId, UserRecord, STARTING_BALANCE,
};
pub use scope::{Scope, TransactionCoordinator};
pub use users::UserDirectory;
