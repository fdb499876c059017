//! Logging setup.

use std::io::IsTerminal;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::LogFormat;

/// Installs the global subscriber.
///
/// Supports three formats:
/// - `Text`: Human-readable format (interactive use)
/// - `Json`: JSON structured logging (scripts, log aggregation)
/// - `Auto`: JSON when stderr is not a terminal, text otherwise
///
/// Logs go to stderr so stdout carries only command output. The filter comes
/// from `RUST_LOG` and defaults to `info`. Installing twice is a no-op.
pub fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if use_json(format, std::io::stderr().is_terminal()) {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Logging already initialized");
    }
}

/// Resolves `Auto` against whether the log stream is a terminal.
fn use_json(format: LogFormat, is_terminal: bool) -> bool {
    match format {
        LogFormat::Json => true,
        LogFormat::Text => false,
        LogFormat::Auto => !is_terminal,
    }
}
