//! Diagnostic logging for the command-line front end.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging to stderr.
///
/// Use the `RUST_LOG` environment variable to override the default filter,
/// e.g. `RUST_LOG=bftape=trace` to see every executed instruction. Program
/// output on stdout is never mixed with log lines.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
