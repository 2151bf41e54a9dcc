//! Tracing subscriber setup.
//!
//! Library code only emits `tracing` events. The embedding application calls
//! [`init_tracing`] once at startup to route them to stderr.

use crate::config::{Config, LogFormat};
use crate::constants::TRACING_SERVICE_NAME;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

/// Installs a global subscriber honoring `RUST_LOG`, falling back to the
/// configured level.
///
/// Returns `false` if a global subscriber was already installed, which makes
/// repeated calls (tests, embedding hosts) harmless.
pub fn init_tracing(config: &Config) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr);

    let installed = match config.log_format {
        LogFormat::Json => builder
            .json()
            .with_current_span(true)
            .try_init()
            .is_ok(),
        LogFormat::Text => builder.with_target(false).try_init().is_ok(),
    };

    if installed {
        tracing::debug!(service = TRACING_SERVICE_NAME, "tracing initialized");
    }
    installed
}
