//! Logging setup via `tracing-subscriber`.
//!
//! `RUST_LOG` wins when set; otherwise the given default directive applies.
//! Output goes to stderr so `arag ask` can keep stdout for JSON.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

pub const DEFAULT_DIRECTIVE: &str = "info";

/// Build the filter used by [`init`].
pub fn filter(default: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .map_err(|e| anyhow!("invalid log filter '{}': {}", default, e))
}

/// Install the global subscriber. Call once at startup.
pub fn init(default: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(default)?)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to set subscriber: {}", e))
}
