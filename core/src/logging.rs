//! Tracing subscriber setup for binaries
//!
//! The library only emits events; hosts install whatever subscriber they
//! like. This helper is what the playground uses.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "synckit_editor=info";

/// Install a stderr subscriber filtered by `RUST_LOG`
///
/// Returns false if a global subscriber was already installed.
pub fn init() -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_line_number(true),
    );

    if subscriber.try_init().is_err() {
        return false;
    }

    tracing::info!(filter = DEFAULT_FILTER, "tracing initialized");
    true
}
