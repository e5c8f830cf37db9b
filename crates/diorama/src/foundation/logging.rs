//! Logging utilities
//!
//! The library logs through the `log` facade; binaries pick the backend.
//! These helpers cover the common env_logger setups so demo binaries and
//! tools do not repeat the builder dance.

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with an explicit default level
///
/// `RUST_LOG` still overrides the level when set.
pub fn init_with_level(level: log::LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}
