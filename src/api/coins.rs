// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Coin-moving endpoints: peer transfers and merch purchases.
//!
//! Both return an empty 200 on success. The caller reads the new state from
//! `/api/info`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use super::json::ApiJson;
use crate::{auth::Auth, error::ApiError, models::SendCoinRequest, state::AppState};

/// Send coins to another user by login.
#[utoipa::path(
    post,
    path = "/api/sendCoin",
    tag = "Coins",
    security(("bearer_auth" = [])),
    request_body = SendCoinRequest,
    responses(
        (status = 200, description = "Coins sent"),
        (status = 400, description = "Malformed body, non-positive amount or self-transfer"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipient not found"),
        (status = 409, description = "Account busy, retry"),
        (status = 422, description = "Insufficient funds"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn send_coin(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SendCoinRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .wallet
        .send(user.user_id, &request.to_user, request.amount)
        .await?;
    Ok(StatusCode::OK)
}

/// Buy one unit of a merch item.
#[utoipa::path(
    get,
    path = "/api/buy/{item}",
    tag = "Coins",
    security(("bearer_auth" = [])),
    params(
        ("item" = String, Path, description = "Catalog item name")
    ),
    responses(
        (status = 200, description = "Item bought"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Account busy, retry"),
        (status = 422, description = "Insufficient funds"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn buy_item(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(item): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.wallet.buy(user.user_id, &item).await?;
    Ok(StatusCode::OK)
}
