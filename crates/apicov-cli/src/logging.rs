//! Log subscriber setup
//!
//! Events go to stderr so the report table on stdout stays clean. `RUST_LOG`
//! wins over the level implied by `-q`/`-v`.

use crate::config::{CliConfig, LogFormat};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter for a configuration
#[must_use]
pub fn env_filter(config: &CliConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.log_directive()))
}

/// Install the global subscriber; later calls are no-ops
pub fn init_logging(config: &CliConfig) {
    let filter = env_filter(config);
    let registry = tracing_subscriber::registry().with(filter);

    let _ = match config.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(config.use_color())
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
}
