//! Log output for the build tool.
//!
//! Stdout belongs to the plugin status lines, so every log record goes to
//! stderr. Records are compact single lines by default; `--log-format json`
//! switches to one flattened JSON object per record for CI collectors.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::Subscriber;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, fmt};

use jen_config::{Config, LogFormat};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Errors encountered while setting up log output.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter expression does not parse.
    #[error("invalid log filter '{filter}': {message}")]
    Filter {
        /// Filter expression as configured.
        filter: String,
        /// Parser diagnostic.
        message: String,
    },
    /// Another global subscriber was installed first.
    #[error("failed to install log subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Routes `tracing` output to stderr according to `config`.
///
/// The filter is validated on every call. Only the first successful call
/// installs the global subscriber; later calls leave it in place.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for a malformed filter and
/// [`TelemetryError::Install`] when a foreign subscriber is already set.
pub fn initialise(config: &Config) -> Result<(), TelemetryError> {
    let filter = parse_filter(config.log_filter())?;
    INSTALLED.get_or_try_init(|| install(filter, config.log_format()))?;
    Ok(())
}

fn parse_filter(expression: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(expression).map_err(|error| TelemetryError::Filter {
        filter: expression.to_owned(),
        message: error.to_string(),
    })
}

fn install(filter: EnvFilter, format: LogFormat) -> Result<(), TelemetryError> {
    tracing_subscriber::registry()
        .with(stderr_layer(format).with_filter(filter))
        .try_init()?;
    Ok(())
}

fn stderr_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(UtcTime::rfc_3339());
    match format {
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().flatten_event(true).boxed(),
    }
}
