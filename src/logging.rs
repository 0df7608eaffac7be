//! Logging initialization and configuration.
//!
//! The channel layer traces every activation stage it completes and every
//! stream fault it absorbs; these helpers wire those events to stderr for
//! hosts that do not install their own subscriber.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "ssh_conduit=info";

/// Initialize the logging system.
///
/// Uses the `RUST_LOG` environment variable for filtering. If not set,
/// defaults to `ssh_conduit=info`.
///
/// # Panics
///
/// Panics if called more than once, or if another tracing subscriber
/// has already been set.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();
}

/// Initialize with an explicit filter directive, ignoring `RUST_LOG`.
///
/// Useful for hosts that manage verbosity themselves, e.g.
/// `init_with_filter("ssh_conduit=trace")` while debugging a transport.
pub fn init_with_filter(directive: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::new(directive))
        .with(tracing_subscriber::fmt::layer().compact())
        .init();
}

/// Try to initialize the logging system.
///
/// Returns `Ok(())` if successful, or `Err` if logging has already been
/// initialized.
pub fn try_init() -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
}
