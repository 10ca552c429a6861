//! Tracing subscriber setup.
//!
//! Libraries only emit events; the binary decides where they go. Logs are
//! written to stderr so stdout stays clean for command output.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::{ConfigError, LogFormat, LoggingConfig};

/// Install the global subscriber.
///
/// Precedence: `RUST_LOG` overrides the configured level.
pub(crate) fn init(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(&config.level).map_err(|e| ConfigError::LogFilter {
            directive: config.level.clone(),
            message: e.to_string(),
        })?
    };

    // try_init leaves an already-installed global subscriber in place.
    let _ = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_filter(filter),
            )
            .try_init(),
        LogFormat::Plain => tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_filter(filter),
            )
            .try_init(),
    };
    Ok(())
}
