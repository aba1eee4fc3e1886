//! Tracing subscriber setup for the command-line tool.
//!
//! Events go to stderr so stdout stays reserved for reports. `RUST_LOG` takes precedence over
//! the default level.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Install a stderr subscriber. `verbose` lowers the default level from `warn` to `debug`.
///
/// Returns an error if a global subscriber is already installed.
pub fn init(verbose: bool) -> Result<(), tracing_subscriber::util::TryInitError> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
}
