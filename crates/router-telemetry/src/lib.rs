//! # Router Telemetry
//!
//! Observability for the model router gateway.
//!
//! This crate provides:
//! - One immutable [`RequestMetric`] per routed request
//! - The bounded-memory [`MetricsCollector`] (recent-history ring plus a
//!   per-model LRU window for statistics)
//! - Best-effort change notifications for dashboard subscribers
//! - Structured logging setup

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod collector;
pub mod logging;
pub mod metric;

// Re-export main types
pub use collector::{MetricsCollector, TelemetryEvent, MAX_MODELS, MAX_RECENT_REQUESTS};
pub use logging::init_logging;
pub use metric::{ModelStats, RequestMetric, RequestStatus, TelemetryState, UNKNOWN_MODEL};
