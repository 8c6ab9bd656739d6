//! Logging setup
//!
//! Compact stderr output filtered by `RUST_LOG` (default `info`). Components
//! log under their own targets: `pages`, `window`, `frame`, `config`,
//! `desktop`.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,tao=warn,wry=warn";

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(target: "all_in_poster", version = env!("CARGO_PKG_VERSION"), "logging initialized");
    }
}
