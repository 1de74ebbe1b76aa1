//! Logging setup. Every warning the extractors, scanner, and VCS backend
//! emit during a run goes through `tracing`; this just wires up a
//! subscriber so the CLI sees them without every binary reimplementing the
//! same boilerplate.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. `verbose` raises the default
/// level from `warn` to `debug`; `RUST_LOG` always overrides both.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
