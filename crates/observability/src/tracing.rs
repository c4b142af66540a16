//! Tracing/logging initialization.
//!
//! Native hosts (tests, tools) get JSON logs filtered by `RUST_LOG`. In the
//! browser, events go to the developer console.

#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::EnvFilter;

/// Initialize tracing for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
#[cfg(not(target_arch = "wasm32"))]
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // JSON logs + timestamps, configurable via RUST_LOG.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

/// Initialize tracing for the browser tab.
///
/// Safe to call multiple times (subsequent calls are no-ops).
#[cfg(target_arch = "wasm32")]
pub fn init() {
    use std::sync::Once;

    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let config = tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(::tracing::Level::INFO)
            .build();
        tracing_wasm::set_as_global_default_with_config(config);
    });
}
