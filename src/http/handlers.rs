//! Public route handlers.

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};

use crate::http::request::request_id;
use crate::http::response::{outcome_result, ApiError};
use crate::http::server::AppState;
use crate::security::headers::client_identity;

/// `POST /infer`: run the body through the pipeline.
pub async fn infer(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let client = client_identity(&headers, peer, state.trust_forwarded_for);
    tracing::debug!(
        request_id = %request_id(&headers),
        client = %client,
        bytes = body.len(),
        "Inference request received"
    );

    let outcome = state.pipeline.handle(&body, &headers, &client).await;
    outcome_result(outcome)
}

/// `GET /health`: liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
