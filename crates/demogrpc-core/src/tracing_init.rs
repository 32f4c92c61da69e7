//! Shared tracing/logging initialisation.
//!
//! The server and the client binaries both install an env-filtered
//! subscriber with optional JSON output.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise the global tracing subscriber.
///
/// * `default_filter` -- used when `RUST_LOG` is unset or invalid
///   (e.g. `"demogrpc_server=info"`).
/// * `log_json` -- emit one JSON object per line instead of the
///   human-readable format.
///
/// A second call is a no-op: the first subscriber stays installed.
pub fn init_tracing(default_filter: &str, log_json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_does_not_panic() {
        init_tracing("demogrpc_core=debug", false);
        init_tracing("demogrpc_core=debug", true);
    }
}
