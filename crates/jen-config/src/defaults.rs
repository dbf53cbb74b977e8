use camino::Utf8PathBuf;

/// Directory scanned for plugin files when no override is supplied.
pub const DEFAULT_PLUGIN_DIR: &str = "src/plugin/plugins";

/// File-name suffix recognised as a script plugin.
pub const DEFAULT_PLUGIN_SUFFIX: &str = ".rhai";

/// Lifecycle event dispatched when none is requested.
pub const DEFAULT_EVENT: &str = "build";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owned plugin directory used where allocation is required.
#[must_use]
pub fn default_plugin_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_PLUGIN_DIR)
}

/// Default logging format for the build tool.
#[must_use]
pub const fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Compact
}
