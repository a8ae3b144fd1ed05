//! The forwarding pipeline.
//!
//! One inbound chat-completion request becomes: a parsed envelope, a routing
//! decision, a rewritten upstream request, one upstream call, a reconciled
//! response, and exactly one telemetry record. Every error in the sequence is
//! caught at this boundary, recorded, and converted into a JSON error
//! response; nothing propagates further.

use crate::error::ApiError;
use crate::state::AppState;
use crate::tokens;
use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use router_config::ConfigError;
use router_core::{AgentType, ChatRequest};
use router_routing::{route, RoutingError, RoutingReason};
use router_telemetry::{RequestMetric, RequestStatus, UNKNOWN_MODEL};
use std::time::Instant;
use tracing::{error, info};

/// Internal failure taxonomy for the pipeline. The public response never
/// carries these messages; they go to the log and the telemetry record.
#[derive(Debug, thiserror::Error)]
enum PipelineError {
    #[error("invalid JSON body: {0}")]
    InvalidBody(serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Routing(#[from] RoutingError),
    #[error("resolved model is not configured: {0}")]
    ModelNotConfigured(String),
    #[error("resolved credential is not a valid header value")]
    InvalidCredential,
    #[error("failed to serialize outbound body: {0}")]
    Serialize(serde_json::Error),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl PipelineError {
    /// The client-visible rendition: 400 for a malformed body, 500 for
    /// everything else.
    fn public(&self) -> ApiError {
        match self {
            Self::InvalidBody(_) => ApiError::bad_request("Invalid JSON body"),
            _ => ApiError::internal("Internal server error"),
        }
    }
}

/// What the pipeline has resolved so far, carried across the error boundary
/// so failure metrics report as much context as was established.
#[derive(Debug, Default)]
struct Trace {
    original_model: String,
    model: String,
    input_tokens: u64,
    agent_type: Option<AgentType>,
    routing_reason: Option<RoutingReason>,
}

struct Forwarded {
    response: Response,
    output_tokens: u64,
}

/// Runs the full pipeline for one `/v1/messages` request and records its
/// metric, success or failure, before returning the response.
pub(crate) async fn handle_messages(
    state: &AppState,
    uri: &Uri,
    headers: &HeaderMap,
    body: &[u8],
) -> Response {
    let started = Instant::now();
    let mut trace = Trace::default();

    match run_pipeline(state, uri, headers, body, &mut trace).await {
        Ok(forwarded) => {
            let latency_ms = started.elapsed().as_millis() as u64;
            let tokens_per_second = if forwarded.output_tokens > 0 && latency_ms > 0 {
                forwarded.output_tokens as f64 / latency_ms as f64 * 1000.0
            } else {
                0.0
            };

            let metric = RequestMetric {
                id: uuid::Uuid::new_v4(),
                timestamp: Utc::now(),
                model: trace.model.clone(),
                original_model: trace.original_model.clone(),
                input_tokens: trace.input_tokens,
                output_tokens: forwarded.output_tokens,
                latency_ms,
                tokens_per_second,
                status: RequestStatus::Success,
                error_message: None,
                agent_type: trace.agent_type,
                routing_reason: trace.routing_reason,
            };

            info!(
                model = %metric.model,
                original_model = %metric.original_model,
                reason = ?metric.routing_reason,
                latency_ms,
                "request forwarded"
            );
            state.telemetry.record_request(metric);
            forwarded.response
        }
        Err(err) => {
            let latency_ms = started.elapsed().as_millis() as u64;
            let metric = RequestMetric {
                id: uuid::Uuid::new_v4(),
                timestamp: Utc::now(),
                model: or_unknown(&trace.model),
                original_model: or_unknown(&trace.original_model),
                input_tokens: trace.input_tokens,
                output_tokens: 0,
                latency_ms,
                tokens_per_second: 0.0,
                status: RequestStatus::Error,
                error_message: Some(err.to_string()),
                agent_type: None,
                routing_reason: None,
            };

            error!(error = %err, latency_ms, "messages handler failed");
            state.telemetry.record_request(metric);
            err.public().into_response()
        }
    }
}

async fn run_pipeline(
    state: &AppState,
    uri: &Uri,
    headers: &HeaderMap,
    body: &[u8],
    trace: &mut Trace,
) -> Result<Forwarded, PipelineError> {
    let mut request: ChatRequest =
        serde_json::from_slice(body).map_err(PipelineError::InvalidBody)?;
    trace.original_model = request.model.clone();
    trace.input_tokens = tokens::estimate_message_tokens(&request.messages);

    // Config is re-read per request so routing-table edits apply immediately.
    let config = state.config.load()?;
    let decision = route(
        &request.model,
        request.system.as_ref(),
        &request.messages,
        &config.agent_model_map,
        &config.orchestrator_model_map,
    )?;
    trace.model = decision.target_model.clone();
    trace.agent_type = decision.agent_type;
    trace.routing_reason = Some(decision.reason);

    let model_config = config
        .models
        .get(&decision.target_model)
        .ok_or_else(|| PipelineError::ModelNotConfigured(decision.target_model.clone()))?;
    let credential = resolve_credential(&model_config.api_key, headers);

    request.model = decision.target_model.clone();
    apply_thinking_compat(&mut request, &decision.target_model);
    if model_config.url.contains("openrouter") {
        strip_user_id(&mut request);
    }

    let forward_url = build_forward_url(&model_config.url, uri);
    let forward_headers = build_forward_headers(headers, &credential)?;
    let outbound_body = serde_json::to_vec(&request).map_err(PipelineError::Serialize)?;

    let upstream = state
        .http
        .post(&forward_url)
        .headers(forward_headers)
        .body(outbound_body)
        .send()
        .await?;

    let status = upstream.status();
    let response_headers = upstream.headers().clone();
    // Single read of the upstream body: it feeds both the usage extraction
    // and the bytes re-served to the caller.
    let text = upstream.text().await?;

    let output_tokens = extract_output_tokens(&text);
    let response = reconcile_response(status, response_headers, text);

    Ok(Forwarded {
        response,
        output_tokens,
    })
}

fn or_unknown(value: &str) -> String {
    if value.is_empty() {
        UNKNOWN_MODEL.to_string()
    } else {
        value.to_string()
    }
}

/// The per-model key when configured, else the caller's own bearer token.
fn resolve_credential(configured_key: &str, headers: &HeaderMap) -> String {
    if !configured_key.is_empty() {
        return configured_key.to_string();
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(strip_bearer)
        .unwrap_or_default()
        .to_string()
}

/// Strips a leading case-insensitive `Bearer` scheme and its whitespace.
fn strip_bearer(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() > 6
        && value[..6].eq_ignore_ascii_case("bearer")
        && bytes[6].is_ascii_whitespace()
    {
        value[6..].trim_start()
    } else {
        value
    }
}

/// Base endpoint (trailing slash stripped) + inbound path + inbound query.
fn build_forward_url(base: &str, uri: &Uri) -> String {
    let path_and_query = uri.path_and_query().map_or("/", |pq| pq.as_str());
    format!("{}{}", base.trim_end_matches('/'), path_and_query)
}

/// Copies inbound headers except the three that must never be forwarded
/// verbatim, then installs the resolved credential.
///
/// `Content-Length` is also dropped: the body is re-serialized after the
/// model rewrite and the client recomputes it.
fn build_forward_headers(
    inbound: &HeaderMap,
    credential: &str,
) -> Result<HeaderMap, PipelineError> {
    let mut out = HeaderMap::new();
    for (name, value) in inbound {
        if name == header::HOST
            || name == header::AUTHORIZATION
            || name == header::ACCEPT_ENCODING
            || name == header::CONTENT_LENGTH
        {
            continue;
        }
        out.append(name.clone(), value.clone());
    }

    if !out.contains_key(header::CONTENT_TYPE) {
        out.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    let auth = HeaderValue::from_str(&format!("Bearer {credential}"))
        .map_err(|_| PipelineError::InvalidCredential)?;
    out.insert(header::AUTHORIZATION, auth);
    Ok(out)
}

/// Non-Claude backends do not understand the generic `adaptive` thinking
/// mode; rewrite it to `enabled` for them.
fn apply_thinking_compat(request: &mut ChatRequest, target_model: &str) {
    if target_model.contains("claude") {
        return;
    }
    if let Some(thinking) = request.thinking.as_mut() {
        if thinking.mode.as_deref() == Some("adaptive") {
            thinking.mode = Some("enabled".to_string());
        }
    }
}

/// openrouter rejects `metadata.user_id` values beyond 128 characters, and
/// caller-supplied ids carry no length guarantee.
fn strip_user_id(request: &mut ChatRequest) {
    if let Some(metadata) = request.metadata.as_mut() {
        metadata.user_id = None;
    }
}

/// `usage.output_tokens` from the upstream JSON when reported, else the
/// byte-length heuristic (length / 4).
fn extract_output_tokens(body: &str) -> u64 {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("usage")
                .and_then(|u| u.get("output_tokens"))
                .and_then(serde_json::Value::as_u64)
        })
        .unwrap_or_else(|| (body.len() / 4) as u64)
}

/// Re-serves the upstream response from the already-read body.
///
/// Framing headers cannot survive re-serving a buffered body. When the
/// upstream declared a content encoding, the body held here is the decoded
/// text, so the encoding and length headers are stripped too; otherwise the
/// bytes and headers pass through as received.
fn reconcile_response(status: StatusCode, mut headers: HeaderMap, body: String) -> Response {
    headers.remove(header::TRANSFER_ENCODING);
    headers.remove(header::CONNECTION);
    if headers.remove(header::CONTENT_ENCODING).is_some() {
        headers.remove(header::CONTENT_LENGTH);
    }

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
