//! Process-wide logging setup.
//!
//! `RUST_LOG` takes precedence over the configured level so operators can
//! raise verbosity for a single module without touching the config.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `log_format` selects human-readable (`text`) or structured (`json`) output.
///
/// # Errors
///
/// Returns an error if the level cannot be parsed or a subscriber is already
/// installed.
pub fn init(log_level: &str, log_format: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level)?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if log_format == "json" {
        builder
            .json()
            .with_current_span(true)
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;
    } else {
        builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;
    }

    Ok(())
}
