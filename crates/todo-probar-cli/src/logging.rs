//! Diagnostic logging setup
//!
//! Diagnostics go to stderr through `tracing`. `RUST_LOG` wins over the
//! `-v`/`-q` derived level.

use crate::config::Verbosity;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Returns false when a subscriber was already installed (tests, embedding).
pub fn init_tracing(verbosity: Verbosity, use_color: bool, json: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().try_init().is_ok()
    } else {
        builder.with_ansi(use_color).try_init().is_ok()
    }
}
