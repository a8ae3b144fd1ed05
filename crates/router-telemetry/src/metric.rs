//! Telemetry record and snapshot types.

use chrono::{DateTime, Utc};
use router_core::AgentType;
use router_routing::RoutingReason;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sentinel model name used when a request failed before a target model was
/// resolved. Excluded from per-model statistics.
pub const UNKNOWN_MODEL: &str = "unknown";

/// Terminal status of a routed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// The forward completed and a response was relayed.
    Success,
    /// The request failed somewhere in the pipeline.
    Error,
}

/// One request's telemetry record.
///
/// Created exactly once per inbound request by the forwarding gateway,
/// success or failure, then owned by the collector and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMetric {
    /// Unique record id.
    pub id: uuid::Uuid,
    /// When the record was created.
    pub timestamp: DateTime<Utc>,
    /// Resolved target model, or [`UNKNOWN_MODEL`] when routing never
    /// completed.
    pub model: String,
    /// The model the caller asked for.
    pub original_model: String,
    /// Estimated input tokens.
    pub input_tokens: u64,
    /// Output tokens, reported by the upstream or estimated.
    pub output_tokens: u64,
    /// Wall-clock latency of the whole pipeline.
    pub latency_ms: u64,
    /// Output throughput; 0 when latency or output tokens are 0.
    pub tokens_per_second: f64,
    /// Terminal status.
    pub status: RequestStatus,
    /// Human-readable failure description, present on errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Classified agent, when the agent rule fired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<AgentType>,
    /// Which routing rule fired, when routing completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_reason: Option<RoutingReason>,
}

impl RequestMetric {
    /// Whether this record counts toward the error total.
    pub fn is_error(&self) -> bool {
        self.status == RequestStatus::Error
    }
}

/// Per-model aggregate over the current recent-history window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStats {
    /// Model name.
    pub model: String,
    /// Records aggregated.
    pub request_count: u64,
    /// Running mean latency in milliseconds.
    pub mean_latency_ms: f64,
    /// Cumulative input tokens in the window.
    pub total_input_tokens: u64,
    /// Cumulative output tokens in the window.
    pub total_output_tokens: u64,
    /// Running mean throughput in tokens per second.
    pub avg_tokens_per_second: f64,
}

/// Snapshot of the collector, the only structure exposed to the dashboard
/// collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryState {
    /// Most recent records, newest first (bounded).
    pub requests: Vec<RequestMetric>,
    /// Per-model aggregates for models in the LRU window.
    pub stats: HashMap<String, ModelStats>,
    /// When the collector (and so the server) started.
    pub server_start_time: DateTime<Utc>,
    /// Cumulative request total; never decremented, never evicted.
    pub total_requests: u64,
    /// Cumulative error total; never decremented, never evicted.
    pub error_count: u64,
}
