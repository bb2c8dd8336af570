// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        AuthRequest, AuthResponse, CoinHistory, InfoResponse, InventoryEntry, ReceivedEntry,
        SendCoinRequest, SentEntry,
    },
    state::AppState,
};

pub mod auth;
pub mod coins;
pub mod health;
pub mod info;
pub mod json;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/auth", post(auth::authenticate))
        .route("/info", get(info::get_info))
        .route("/sendCoin", post(coins::send_coin))
        .route("/buy/{item}", get(coins::buy_item));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        auth::authenticate,
        info::get_info,
        coins::send_coin,
        coins::buy_item,
        health::health,
        health::liveness
    ),
    components(
        schemas(
            AuthRequest,
            AuthResponse,
            SendCoinRequest,
            InfoResponse,
            InventoryEntry,
            CoinHistory,
            ReceivedEntry,
            SentEntry,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Auth", description = "Login and first-login provisioning"),
        (name = "Wallet", description = "Balance, inventory and history"),
        (name = "Coins", description = "Transfers and purchases"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::state::test_state;

    async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn login(app: &Router, username: &str) -> String {
        let request = Request::post("/api/auth")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"username": username, "password": "pw"}).to_string(),
            ))
            .unwrap();
        let (status, body) = call(app, request).await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    fn get(uri: &str, token: &str) -> Request<Body> {
        Request::get(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    fn send(token: &str, to: &str, amount: i64) -> Request<Body> {
        Request::post("/api/sendCoin")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"toUser": to, "amount": amount}).to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn buy_then_info_shows_inventory() {
        let (state, _dir) = test_state();
        let app = router(state);
        let token = login(&app, "alice").await;

        for _ in 0..2 {
            let (status, _) = call(&app, get("/api/buy/t-shirt", &token)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = call(&app, get("/api/info", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["coins"], 840);
        assert_eq!(body["inventory"], json!([{"type": "t-shirt", "quantity": 2}]));
    }

    #[tokio::test]
    async fn send_coin_updates_both_histories() {
        let (state, _dir) = test_state();
        let app = router(state);
        let alice = login(&app, "alice").await;
        let bob = login(&app, "bob").await;

        let (status, _) = call(&app, send(&alice, "bob", 100)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, alice_info) = call(&app, get("/api/info", &alice)).await;
        assert_eq!(alice_info["coins"], 900);
        assert_eq!(
            alice_info["coinHistory"]["sent"],
            json!([{"toUser": "bob", "amount": 100}])
        );

        let (_, bob_info) = call(&app, get("/api/info", &bob)).await;
        assert_eq!(bob_info["coins"], 1100);
        assert_eq!(
            bob_info["coinHistory"]["received"],
            json!([{"fromUser": "alice", "amount": 100}])
        );
    }

    #[tokio::test]
    async fn error_kinds_map_to_statuses() {
        let (state, _dir) = test_state();
        let app = router(state);
        let alice = login(&app, "alice").await;
        login(&app, "bob").await;

        let (status, body) = call(&app, get("/api/buy/nonexistent_item", &alice)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error_code"], "item_not_found");

        let (status, _) = call(&app, send(&alice, "ghost", 10)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(&app, send(&alice, "bob", 0)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "invalid_transfer");

        let (status, body) = call(&app, send(&alice, "bob", 5000)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error_code"], "insufficient_funds");
    }

    #[tokio::test]
    async fn malformed_bodies_are_json_bad_requests() {
        let (state, _dir) = test_state();
        let app = router(state);
        let alice = login(&app, "alice").await;
        login(&app, "bob").await;

        let payloads = [
            json!({"toUser": "bob", "amount": "ten"}),
            json!({"toUser": "bob"}),
            json!({"toUser": "bob", "amount": 1.5}),
        ];
        for payload in payloads {
            let request = Request::post("/api/sendCoin")
                .header(header::AUTHORIZATION, format!("Bearer {alice}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap();
            let (status, body) = call(&app, request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
            assert_eq!(body["error_code"], "bad_request", "{payload}");
        }

        let request = Request::post("/api/auth")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"username\": \"carol\""))
            .unwrap();
        let (status, body) = call(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "bad_request");

        let (_, info) = call(&app, get("/api/info", &alice)).await;
        assert_eq!(info["coins"], 1000);
    }

    #[tokio::test]
    async fn wallet_routes_require_a_token() {
        let (state, _dir) = test_state();
        let app = router(state);
        let request = Request::get("/api/info").body(Body::empty()).unwrap();
        let (status, body) = call(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "missing_auth_header");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let (state, _dir) = test_state();
        let app = router(state);
        login(&app, "alice").await;

        let request = Request::post("/api/auth")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"username": "alice", "password": "nope"}).to_string(),
            ))
            .unwrap();
        let (status, _) = call(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn health_probes_respond() {
        let (state, _dir) = test_state();
        let app = router(state);
        let (status, body) = call(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["database"], "ok");

        let (status, _) = call(&app, Request::get("/health/live").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
    }
}
