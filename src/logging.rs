//! Logging setup: `tracing` drives the async connection actor and result
//! stream with `#[instrument]` spans; the codec and value layer log through
//! the plain `log` facade. `tracing-log` isn't pulled in — callers that want
//! `log` records folded into their `tracing` subscriber wire that up
//! themselves.

use tracing_subscriber::EnvFilter;

/// Install a process-wide `tracing` subscriber reading `RUST_LOG`
/// (default `info`). Intended for binaries and integration tests; library
/// consumers embedding this crate are expected to configure their own
/// subscriber instead.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
