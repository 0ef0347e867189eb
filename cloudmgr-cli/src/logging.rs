//! Logging initialisation.
//!
//! Logs go to stderr so they never mix with command output on stdout.
//! `RUST_LOG` takes precedence; otherwise each `-v` raises the level
//! from `warn` to `info` to `debug`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter for a given `-v` count.
fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Installs the global tracing subscriber. Call once from `main`.
pub fn init(verbose: u8) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level(verbose))),
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
