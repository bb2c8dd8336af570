// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. Field names on the wire are
//! camelCase. All types derive `ToSchema` for the OpenAPI document.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::wallet::WalletView;

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    /// Bearer token for the `Authorization` header.
    pub token: String,
}

// =============================================================================
// Coins
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendCoinRequest {
    /// Recipient login.
    pub to_user: String,
    /// Must be positive.
    pub amount: i64,
}

// =============================================================================
// Info
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InventoryEntry {
    /// Item name.
    #[serde(rename = "type")]
    pub item_type: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedEntry {
    pub from_user: String,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SentEntry {
    pub to_user: String,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CoinHistory {
    pub received: Vec<ReceivedEntry>,
    pub sent: Vec<SentEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub coins: u64,
    pub inventory: Vec<InventoryEntry>,
    pub coin_history: CoinHistory,
}

impl From<WalletView> for InfoResponse {
    fn from(view: WalletView) -> Self {
        Self {
            coins: view.balance,
            inventory: view
                .inventory
                .into_iter()
                .map(|i| InventoryEntry {
                    item_type: i.item,
                    quantity: i.quantity,
                })
                .collect(),
            coin_history: CoinHistory {
                received: view
                    .received
                    .into_iter()
                    .map(|r| ReceivedEntry {
                        from_user: r.from_user,
                        amount: r.amount,
                    })
                    .collect(),
                sent: view
                    .sent
                    .into_iter()
                    .map(|s| SentEntry {
                        to_user: s.to_user,
                        amount: s.amount,
                    })
                    .collect(),
            },
        }
    }
}
