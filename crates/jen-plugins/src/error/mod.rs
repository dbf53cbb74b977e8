//! Domain errors raised by a plugin pass.
//!
//! All errors use `thiserror`-derived enums with structured context so callers
//! can inspect the failure programmatically. Failures raised by plugin code
//! keep the engine's own error as the `source` so the exception a plugin
//! raised reaches the caller unchanged. I/O errors are wrapped in `Arc` to
//! satisfy the `result_large_err` Clippy lint.

use std::path::PathBuf;
use std::sync::Arc;

use rhai::EvalAltResult;
use thiserror::Error;

/// Errors arising from a plugin pass.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The plugin directory is missing or could not be listed.
    #[error("plugin directory '{}' is not accessible: {source}", path.display())]
    DirectoryAccess {
        /// Directory that was scanned.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A script plugin failed to compile or its top-level code raised.
    #[error("plugin '{name}' failed to load: {source}")]
    ScriptLoad {
        /// Plugin name.
        name: String,
        /// Error raised by the script engine.
        #[source]
        source: Box<EvalAltResult>,
    },

    /// A script plugin's hook raised.
    #[error("plugin '{name}' failed in {hook}: {source}")]
    ScriptHook {
        /// Plugin name.
        name: String,
        /// Hook that was invoked.
        hook: &'static str,
        /// Error raised by the script engine.
        #[source]
        source: Box<EvalAltResult>,
    },

    /// The plugin process could not be spawned.
    #[error("plugin '{name}' failed to start: {source}")]
    SpawnFailed {
        /// Plugin name.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The plugin process exited with a non-zero status code.
    #[error("plugin '{name}' exited with non-zero status {status}")]
    NonZeroExit {
        /// Plugin name.
        name: String,
        /// Process exit status, `-1` when terminated by a signal.
        status: i32,
    },

    /// The plugin process reported that its hook failed.
    #[error("plugin '{name}' failed in {hook}: {message}")]
    HookFailed {
        /// Plugin name.
        name: String,
        /// Hook that was invoked.
        hook: &'static str,
        /// Failure message reported by the plugin.
        message: String,
    },

    /// The hook request could not be serialized to JSON.
    #[error("failed to serialise hook request: {0}")]
    SerializeRequest(#[source] serde_json::Error),

    /// A plugin message could not be deserialized from JSON.
    #[error("plugin '{name}' produced invalid JSON: {source}")]
    DeserializeResponse {
        /// Plugin name.
        name: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The plugin produced output that does not conform to the protocol.
    #[error("plugin '{name}' wrote invalid output: {message}")]
    InvalidOutput {
        /// Plugin name.
        name: String,
        /// Description of the protocol violation.
        message: String,
    },

    /// An I/O error occurred while communicating with the plugin process.
    #[error("I/O error communicating with plugin '{name}': {source}")]
    Io {
        /// Plugin name.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A status line could not be written.
    #[error("failed to write plugin status: {0}")]
    Output(#[source] Arc<std::io::Error>),
}

impl PluginError {
    /// Wraps an I/O error raised while talking to the named plugin.
    pub(crate) fn io(name: &str, source: std::io::Error) -> Self {
        Self::Io {
            name: name.to_owned(),
            source: Arc::new(source),
        }
    }
}
