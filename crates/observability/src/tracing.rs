//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process with the `RUST_LOG` filter,
/// defaulting to `info`.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    init_with_filter(filter);
}

/// Initialize with an explicit filter (used by the engine's dev harness to
/// surface scheduler ticks without touching the environment).
pub fn init_with_filter(filter: EnvFilter) {
    // JSON logs + timestamps; the store UI tails these during maintenance.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
