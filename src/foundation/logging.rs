//! Logging setup for embedders and tests.
//!
//! The runtime itself only emits through the `log` facade; wiring a backend
//! is the embedder's call. These helpers install `env_logger` for the common
//! cases.

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from the environment.
///
/// Call once at process start, before constructing an [`Engine`].
///
/// # Panics
///
/// Panics if a logger is already installed.
///
/// [`Engine`]: crate::Engine
pub fn init() {
    env_logger::init();
}

/// Install a capture-friendly logger for test binaries.
///
/// Safe to call from every test; installation races are ignored so only the
/// first caller wins.
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
