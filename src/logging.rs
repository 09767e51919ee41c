//! Structured logging setup shared by every binary.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs a human-readable `tracing` subscriber. Verbosity is controlled
/// by `RUST_LOG`, defaulting to `info` when unset.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .ok();
}
