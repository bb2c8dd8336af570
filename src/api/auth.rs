// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login endpoint.

use axum::{extract::State, Json};

use super::json::ApiJson;
use crate::{
    error::ApiError,
    models::{AuthRequest, AuthResponse},
    state::AppState,
};

/// Exchange a username and password for a bearer token.
///
/// The first login with an unseen username creates the account with 1000
/// coins.
#[utoipa::path(
    post,
    path = "/api/auth",
    tag = "Auth",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Token issued", body = AuthResponse),
        (status = 400, description = "Malformed body or empty username or password"),
        (status = 401, description = "Wrong password"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn authenticate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AuthRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let auth = state.auth.clone();
    // Password hashing is CPU bound
    let token = tokio::task::spawn_blocking(move || {
        auth.login(&request.username, &request.password)
    })
    .await
    .map_err(|e| ApiError::internal(format!("login task failed: {e}")))??;

    Ok(Json(AuthResponse { token }))
}
