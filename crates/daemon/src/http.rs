// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon's HTTP surface, per spec.md §6: JSON-RPC, chat-tool (MCP +
//! OAuth stub), webhook, health, and dashboard endpoints on one axum
//! router.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::error::DaemonError;
use crate::rpc::{self, RpcRequest};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/healthz", get(health))
        .route("/dashboard", get(dashboard))
        .route("/rpc", post(rpc_handler))
        .route("/mcp", post(mcp_handler))
        .route("/webhooks/github", post(webhook_handler))
        .route("/oauth/register", post(oauth_register))
        .route("/oauth/authorize", post(oauth_authorize))
        .route("/oauth/token", post(oauth_token))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn dashboard(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.dashboard.snapshot().await))
}

fn check_bearer(state: &AppState, headers: &HeaderMap) -> Result<(), DaemonError> {
    let Some(expected) = &state.config.rpc_token else {
        return Ok(());
    };
    let provided = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match provided {
        Some(token) if token == expected => Ok(()),
        Some(token) if state.oauth.validate_token(token) => Ok(()),
        _ => Err(DaemonError::Unauthorized),
    }
}

async fn rpc_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RpcRequest>,
) -> Result<Json<Value>, DaemonError> {
    check_bearer(&state, &headers)?;
    let response = rpc::dispatch(&state, request).await;
    Ok(Json(json!(response)))
}

/// Same capability surface as `/rpc`, addressed as MCP tool calls. The
/// chat-tool framing (tool schemas, `tools/call` envelope) is a thin
/// wrapper over the same method table — a real MCP transport is out of
/// scope, per spec.md's own Non-goal on "JSON-RPC/chat-tool HTTP framing
/// semantics beyond what's needed to expose the methods".
async fn mcp_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RpcRequest>,
) -> Result<Json<Value>, DaemonError> {
    check_bearer(&state, &headers)?;
    let response = rpc::dispatch(&state, request).await;
    Ok(Json(json!(response)))
}

#[derive(serde::Deserialize)]
struct RegisterRequest {
    #[serde(default)]
    redirect_uris: Vec<String>,
}

async fn oauth_register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Value>, DaemonError> {
    let client = state
        .oauth
        .register_client(request.redirect_uris)
        .map_err(|err| DaemonError::InvalidRequest(err.to_string()))?;
    Ok(Json(json!(client)))
}

#[derive(serde::Deserialize)]
struct AuthorizeRequest {
    client_id: String,
    code_challenge: String,
}

async fn oauth_authorize(
    State(state): State<AppState>,
    Json(request): Json<AuthorizeRequest>,
) -> Result<Json<Value>, DaemonError> {
    let code = state
        .oauth
        .authorize(&request.client_id, &request.code_challenge)
        .map_err(|err| DaemonError::InvalidRequest(err.to_string()))?;
    Ok(Json(json!({ "code": code })))
}

#[derive(serde::Deserialize)]
struct TokenRequest {
    code: String,
    code_verifier: String,
}

async fn oauth_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<Value>, DaemonError> {
    let token = state
        .oauth
        .exchange_token(&request.code, &request.code_verifier)
        .map_err(|err| DaemonError::InvalidRequest(err.to_string()))?;
    Ok(Json(json!(token)))
}

async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<(StatusCode, Json<Value>), DaemonError> {
    let event = headers
        .get("X-GitHub-Event")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let delivery_id = headers
        .get("X-GitHub-Delivery")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| format!("delivery-{}", state.clock.now_ms()));
    let signature = headers
        .get("X-Hub-Signature-256")
        .and_then(|v| v.to_str().ok());

    state
        .webhooks
        .handle(&state, event, &delivery_id, signature, &body)
        .await
        .map_err(|err| DaemonError::InvalidRequest(err.to_string()))?;

    Ok((StatusCode::OK, Json(json!({ "deliveryId": delivery_id }))))
}
