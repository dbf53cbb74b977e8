//! Error types for the build tool runtime.

use thiserror::Error;

use jen_config::ConfigError;
use jen_plugins::PluginError;

use crate::telemetry::TelemetryError;

/// Failures that end a `jen-build` invocation.
#[derive(Debug, Error)]
pub enum AppError {
    /// Arguments or environment values were rejected.
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    /// Logging could not be set up.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// The configured lifecycle event is not one the runner knows.
    #[error("unknown lifecycle event '{event}'")]
    UnknownEvent {
        /// Event name as configured.
        event: String,
    },
    /// The plugin pass failed.
    #[error(transparent)]
    Plugins(#[from] PluginError),
}
