// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{auth::Auth, error::ApiError, models::InfoResponse, state::AppState};

/// Balance, inventory and coin history of the caller.
#[utoipa::path(
    get,
    path = "/api/info",
    tag = "Wallet",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Wallet view", body = InfoResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_info(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<InfoResponse>, ApiError> {
    let view = state.wallet.view(user.user_id)?;
    Ok(Json(view.into()))
}
