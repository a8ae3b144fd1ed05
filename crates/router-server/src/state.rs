//! Shared application state.

use router_config::ConfigProvider;
use router_telemetry::MetricsCollector;
use std::sync::Arc;

/// State shared by every handler.
///
/// The collector is the only mutable shared resource; config is re-read from
/// disk per request and routing is pure.
#[derive(Clone)]
pub struct AppState {
    /// Configuration provider, read on demand for hot reload.
    pub config: Arc<ConfigProvider>,
    /// The process-lifetime telemetry collector.
    pub telemetry: Arc<MetricsCollector>,
    /// Upstream HTTP client, shared for connection pooling.
    pub http: reqwest::Client,
}

impl AppState {
    /// Builds the state.
    ///
    /// The client carries no total-request timeout: upstream calls are
    /// awaited to completion or native failure.
    pub fn new(
        config: ConfigProvider,
        telemetry: Arc<MetricsCollector>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            config: Arc::new(config),
            telemetry,
            http,
        })
    }
}
