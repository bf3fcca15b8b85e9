//! HTTP surface of the relay.

use std::sync::Arc;

use axum::http::Method;
use axum::routing::get;
use axum::{Json, Router, extract::State};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::mint::{self, TokenResponse};

/// Shared state for the handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<RelayConfig>,
    http: reqwest::Client,
}

/// Build the relay application.
///
/// Kept separate from binding/serving so tests can drive the router
/// directly with `tower::ServiceExt::oneshot`.
pub fn create_app(config: RelayConfig) -> Router {
    let state = AppState { config: Arc::new(config), http: reqwest::Client::new() };

    // The browser client is served from a different origin in development,
    // so CORS stays permissive for the two routes we expose.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_origin(AllowOrigin::any());

    Router::new()
        .route("/api/token", get(issue_token).fallback(method_not_allowed))
        .route("/api/health", get(health))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
}

/// `GET /api/token` — mint and return a short-lived session credential.
async fn issue_token(
    State(state): State<AppState>,
) -> Result<Json<TokenResponse>, RelayError> {
    let token = mint::mint_session(&state.http, &state.config).await?;
    tracing::info!(model = %token.model, "issued ephemeral session key");
    Ok(Json(token))
}

/// Anything but GET on `/api/token`.
async fn method_not_allowed() -> RelayError {
    RelayError::MethodNotAllowed
}

/// `GET /api/health` — liveness probe.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
