//! Tracing/logging setup shared by every host of the session gate.

/// Initialize process-wide logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber configuration per target.
pub mod tracing;
