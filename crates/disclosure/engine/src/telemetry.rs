//! Tracing setup for hosts embedding the engine

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a global subscriber. `RUST_LOG` overrides the default level.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = if verbose {
        "disclosure_engine=debug,disclosure_storage=debug,info"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
}
