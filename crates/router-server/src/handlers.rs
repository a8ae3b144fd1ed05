//! HTTP handlers for the public endpoints.

use crate::error::ApiError;
use crate::forward;
use crate::state::AppState;
use crate::tokens;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;

/// `POST /v1/messages` — the forwarding gateway.
pub async fn messages_handler(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    forward::handle_messages(&state, &uri, &headers, &body).await
}

/// `POST /v1/messages/count_tokens` — local token estimation.
///
/// The whole body is estimated as serialized; no upstream call is made.
pub async fn count_tokens_handler(body: Bytes) -> Response {
    match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(value) => {
            let tokens = tokens::estimate_tokens(&value.to_string());
            Json(json!({ "tokens": tokens })).into_response()
        }
        Err(_) => ApiError::bad_request("Invalid JSON body").into_response(),
    }
}

/// `GET /health` — liveness, with server start context.
pub async fn health_handler(State(state): State<AppState>) -> Response {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": state.telemetry.uptime().as_secs(),
    }))
    .into_response()
}

/// Router-level fallback: no route matched the path.
pub async fn not_found(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Not Found", "path": uri.path() })),
    )
        .into_response()
}

/// Method-level fallback: the path exists but the method is wrong.
pub async fn method_not_allowed(method: Method, uri: Uri) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "error": "Method Not Allowed",
            "method": method.as_str(),
            "path": uri.path(),
        })),
    )
        .into_response()
}
