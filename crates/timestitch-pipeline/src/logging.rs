//! Tracing setup for the tool binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing: human-readable output by default, JSON when
/// `LOG_FORMAT=json`. The filter honors `RUST_LOG` and falls back to
/// info-level output for this workspace's crates.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("timestitch=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(env_filter)
            .init();
    }
}
