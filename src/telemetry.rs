//! Structured logging setup for binaries and demos.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the process that embeds it. Set `RUST_LOG` to control verbosity, e.g.
//! `RUST_LOG=surplus_market=debug`.

use tracing_subscriber::EnvFilter;

/// Installs a compact fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are ignored.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
