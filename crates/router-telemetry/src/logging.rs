//! Structured logging setup.

use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// The filter honors `RUST_LOG` and falls back to `default_level` for the
/// workspace crates. Calling this twice returns an error from the subscriber
/// registry; the binary calls it exactly once.
pub fn init_logging(default_level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()?;

    Ok(())
}
