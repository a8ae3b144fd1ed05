//! # Model Router
//!
//! Priority-routing proxy gateway for Anthropic-compatible LLM backends.
//!
//! Inbound chat requests are classified (topic-summarizer sentinel, sub-agent
//! marker, orchestrator tier) and forwarded to the configured backend for the
//! resolved model, with per-request telemetry kept in bounded memory.
//!
//! ## Usage
//!
//! ```bash
//! # Start on the default port
//! model-router
//!
//! # Start on a custom port
//! PORT=8080 model-router
//! ```
//!
//! Configuration is read from `./router_config.toml`, falling back to
//! `~/.config/model-router/router_config.toml`; a commented default is
//! written there on first run.

use anyhow::Context;
use router_config::ConfigProvider;
use router_server::{AppState, Server, ServerConfig};
use router_telemetry::{init_logging, MetricsCollector, TelemetryEvent};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging("info")
        .map_err(|err| anyhow::anyhow!("failed to initialize logging: {err}"))?;

    let config = ConfigProvider::discover().context("failed to locate configuration")?;
    info!(path = %config.path().display(), "using config");
    // Startup is the one place a broken routing table must be fatal; per
    // request loads surface errors without taking the process down.
    config
        .load_validated()
        .context("configuration failed validation")?;

    let telemetry = Arc::new(MetricsCollector::new());
    spawn_event_logger(&telemetry);

    let state =
        AppState::new(config, Arc::clone(&telemetry)).context("failed to build HTTP client")?;

    let port = match std::env::var("PORT") {
        Ok(raw) => raw
            .parse::<u16>()
            .with_context(|| format!("invalid PORT value: {raw}"))?,
        Err(_) => 3010,
    };

    Server::new(ServerConfig::new().with_port(port), state)
        .run()
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

/// Logs each recorded request from the telemetry stream. Runs for the process
/// lifetime; lagging only costs skipped log lines.
fn spawn_event_logger(telemetry: &Arc<MetricsCollector>) {
    let mut events = telemetry.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(TelemetryEvent::RequestRecorded(metric)) => {
                    info!(
                        model = %metric.model,
                        status = ?metric.status,
                        latency_ms = metric.latency_ms,
                        output_tokens = metric.output_tokens,
                        "request recorded"
                    );
                }
                Ok(TelemetryEvent::StateUpdated(_)) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "telemetry event stream lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
