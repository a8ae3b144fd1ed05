//! # Router Server
//!
//! HTTP surface and forwarding gateway for the model router.
//!
//! This crate provides:
//! - The axum router for the public endpoints
//! - The forwarding pipeline: routing decision, request rewrite, upstream
//!   call, response reconciliation, telemetry
//! - Token estimation for input sizing and the count-tokens endpoint
//! - Graceful shutdown

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
mod forward;
pub mod handlers;
pub mod routes;
pub mod shutdown;
pub mod state;
pub mod tokens;

pub use routes::create_router;
pub use state::AppState;

use shutdown::shutdown_signal;
use tracing::info;

/// Server bind configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerConfig {
    /// Default bind: `0.0.0.0:3010`.
    pub fn new() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3010,
        }
    }

    /// Sets the bind host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the bind port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

/// The HTTP server wrapping the router and its state.
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Creates a server from a bind configuration and application state.
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Binds and serves until a shutdown signal arrives.
    pub async fn run(self) -> std::io::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!(addr = %addr, "server listening");

        axum::serve(listener, create_router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}
