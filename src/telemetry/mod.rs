//! Logging setup for f2read
//!
//! Progress and diagnostics go through `tracing` to stderr so stdout only
//! carries the generated document.

use crate::cli::Verbosity;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the log filter
pub const LOG_ENV: &str = "F2READ_LOG";

/// Filter for a verbosity level unless `F2READ_LOG` says otherwise
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()))
}

/// Install the global subscriber; a second call is a no-op
pub fn init_tracing(verbosity: Verbosity) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
