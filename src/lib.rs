// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Coin Wallet - Virtual Currency Wallet Service
//!
//! Users log in, hold a coin balance, send coins to each other and spend
//! coins on merch. Balances and the ledger live in one embedded redb file.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Password login and JWT session tokens
//! - `storage` - Durable tables, row locks and atomic scopes (redb)
//! - `wallet` - Purchase, transfer and history engines

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;
pub mod wallet;
