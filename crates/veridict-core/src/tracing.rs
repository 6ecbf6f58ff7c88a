//! Tracing subscriber setup for binaries and tests that embed the engine.
//!
//! The library itself only emits events; calling one of these helpers is
//! opt-in for the host application.

use tracing_subscriber::EnvFilter;

/// Initialize a fmt subscriber at `info` unless `RUST_LOG` overrides it.
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    init_with_filter("info");
}

/// Initialize with an explicit default filter directive.
pub fn init_with_filter(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
