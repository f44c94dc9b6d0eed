//! Log subscriber setup shared by the binaries.

pub use crate::tracing::LogFormat;

/// Install process-wide logging. Calling it again is a no-op.
pub fn init() {
    tracing::init();
}

/// Subscriber installation (filter, output format).
pub mod tracing;
