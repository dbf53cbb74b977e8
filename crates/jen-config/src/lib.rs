//! Shared configuration for the Jen build tooling.
//!
//! [`Config`] gathers the handful of values the plugin pass needs: where
//! plugins live, which file suffix marks a plugin, how plugins are executed,
//! which lifecycle event to dispatch, and how logs are rendered. Values come
//! from command-line flags first, then `JEN_*` environment variables, then
//! the `DEFAULT_*` constants.

mod defaults;
mod logging;

use std::ffi::OsString;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use thiserror::Error;

pub use defaults::{
    DEFAULT_EVENT, DEFAULT_LOG_FILTER, DEFAULT_PLUGIN_DIR, DEFAULT_PLUGIN_SUFFIX,
    default_log_format, default_plugin_dir,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Argument or environment parsing failed, or help/version output was
    /// requested.
    #[error("{0}")]
    Cli(#[from] clap::Error),
}

impl ConfigError {
    /// Returns `true` when the error carries help or version text rather than
    /// a genuine failure.
    #[must_use]
    pub fn is_informational(&self) -> bool {
        match self {
            Self::Cli(error) => !error.use_stderr(),
        }
    }
}

/// Runtime configuration for a plugin pass.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "jen-build",
    version,
    about = "Runs build-time plugins from the project plugin directory"
)]
pub struct Config {
    /// Directory scanned for plugin files.
    #[arg(long, env = "JEN_PLUGIN_DIR", default_value = DEFAULT_PLUGIN_DIR)]
    plugin_dir: Utf8PathBuf,

    /// File-name suffix that marks a plugin.
    #[arg(long, env = "JEN_PLUGIN_SUFFIX", default_value = DEFAULT_PLUGIN_SUFFIX)]
    plugin_suffix: String,

    /// Interpreter command used to run plugins as child processes.
    ///
    /// Repeat the flag to pass interpreter arguments. When omitted, plugins
    /// are evaluated by the embedded script engine.
    #[arg(long, env = "JEN_PLUGIN_INTERPRETER", value_delimiter = ' ')]
    interpreter: Vec<String>,

    /// Lifecycle event to dispatch: `build`, `serve` or `deploy`.
    ///
    /// The name is validated by the plugin runner, not here.
    #[arg(long, env = "JEN_EVENT", default_value = DEFAULT_EVENT)]
    event: String,

    /// Tracing filter directive, for example `info` or `jen_plugins=debug`.
    #[arg(long, env = "JEN_LOG_FILTER", default_value = DEFAULT_LOG_FILTER)]
    log_filter: String,

    /// Log output format.
    #[arg(long, env = "JEN_LOG_FORMAT", default_value_t = default_log_format())]
    log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plugin_dir: default_plugin_dir(),
            plugin_suffix: String::from(DEFAULT_PLUGIN_SUFFIX),
            interpreter: Vec::new(),
            event: String::from(DEFAULT_EVENT),
            log_filter: String::from(DEFAULT_LOG_FILTER),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Parses configuration from an argument iterator.
    ///
    /// The first item is treated as the program name, matching
    /// [`std::env::args_os`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Cli`] when arguments or environment values are
    /// invalid, or when help or version output was requested.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Self::try_parse_from(args)?)
    }

    /// Returns the directory scanned for plugins.
    #[must_use]
    pub fn plugin_dir(&self) -> &Utf8Path {
        self.plugin_dir.as_path()
    }

    /// Returns the recognised plugin file suffix.
    #[must_use]
    pub const fn plugin_suffix(&self) -> &str {
        self.plugin_suffix.as_str()
    }

    /// Returns the interpreter command, empty when plugins run in-process.
    #[must_use]
    pub const fn interpreter(&self) -> &[String] {
        self.interpreter.as_slice()
    }

    /// Returns the lifecycle event name.
    #[must_use]
    pub const fn event(&self) -> &str {
        self.event.as_str()
    }

    /// Returns the tracing filter expression.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
