//! Plugin runner driving a single pass over the plugin directory.
//!
//! The [`PluginRunner`] is the public-facing API the build tool calls. It
//! lists the configured directory, hands every file carrying the plugin
//! suffix to a [`PluginLoader`], and invokes the lifecycle hook on each unit
//! that exposes it. Units run strictly one after another; the first failure
//! ends the pass and is returned to the caller as-is.
//!
//! The loader abstraction enables test doubles that count load attempts
//! without evaluating real plugins.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use jen_config::{DEFAULT_PLUGIN_DIR, DEFAULT_PLUGIN_SUFFIX};

use crate::error::PluginError;
use crate::loader::{LifecycleEvent, PluginLoader};

/// Tracing target for runner operations.
const RUNNER_TARGET: &str = "jen_plugins::runner";

/// Where the runner looks for plugins and which files it treats as plugins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    plugin_dir: PathBuf,
    suffix: String,
}

impl RunnerConfig {
    /// Creates a configuration for the given directory and file suffix.
    #[must_use]
    pub fn new(plugin_dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
            suffix: suffix.into(),
        }
    }

    /// Returns the directory scanned for plugins.
    #[must_use]
    pub fn plugin_dir(&self) -> &Path {
        self.plugin_dir.as_path()
    }

    /// Returns the recognised plugin file suffix.
    #[must_use]
    pub const fn suffix(&self) -> &str {
        self.suffix.as_str()
    }

    fn matches(&self, file_name: &str) -> bool {
        file_name.ends_with(self.suffix.as_str())
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PLUGIN_DIR, DEFAULT_PLUGIN_SUFFIX)
    }
}

/// Runs every plugin in a directory through a loader.
///
/// # Example
///
/// ```
/// use std::path::Path;
///
/// use jen_plugins::{LifecycleEvent, PluginError, PluginLoader, PluginRunner, PluginUnit, RunnerConfig};
///
/// struct Silent;
///
/// impl PluginUnit for Silent {
///     fn name(&self) -> &str {
///         "silent"
///     }
///
///     fn exposes(&self, _event: LifecycleEvent) -> bool {
///         false
///     }
///
///     fn invoke(&mut self, _event: LifecycleEvent) -> Result<(), PluginError> {
///         Ok(())
///     }
/// }
///
/// struct SilentLoader;
///
/// impl PluginLoader for SilentLoader {
///     fn load(&self, _path: &Path) -> Result<Box<dyn PluginUnit>, PluginError> {
///         Ok(Box::new(Silent))
///     }
/// }
///
/// let dir = std::env::temp_dir();
/// let runner = PluginRunner::new(RunnerConfig::new(dir, ".no-such-suffix"), SilentLoader);
/// let mut stdout = Vec::new();
/// runner.run_plugins(&mut stdout).unwrap();
/// assert!(String::from_utf8(stdout).unwrap().ends_with("Plugins executed.\n"));
/// ```
#[derive(Debug)]
pub struct PluginRunner<L> {
    config: RunnerConfig,
    loader: L,
}

impl<L> PluginRunner<L> {
    /// Creates a runner with the given configuration and loader.
    #[must_use]
    pub const fn new(config: RunnerConfig, loader: L) -> Self {
        Self { config, loader }
    }

    /// Returns the runner configuration.
    #[must_use]
    pub const fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Returns the loader.
    #[must_use]
    pub const fn loader(&self) -> &L {
        &self.loader
    }
}

impl<L: PluginLoader> PluginRunner<L> {
    /// Runs the `build` event over every plugin.
    ///
    /// # Errors
    ///
    /// See [`PluginRunner::run_event`].
    pub fn run_plugins(&self, out: &mut impl Write) -> Result<(), PluginError> {
        self.run_event(LifecycleEvent::Build, out)
    }

    /// Loads every plugin and invokes its hook for `event`.
    ///
    /// A start line is written to `out` before the directory is listed and a
    /// completion line once every plugin has been processed. Entries are
    /// visited in the order the filesystem returns them.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DirectoryAccess`] if the directory cannot be
    /// listed, in which case nothing is loaded. Any error from loading a
    /// plugin, invoking its hook, or tearing it down is returned unchanged
    /// and the remaining plugins are skipped.
    pub fn run_event(&self, event: LifecycleEvent, out: &mut impl Write) -> Result<(), PluginError> {
        let dir = self.config.plugin_dir();
        info!(
            target: RUNNER_TARGET,
            %event,
            dir = %dir.display(),
            "running plugins"
        );
        announce(out, &format!("Running plugins ({event})..."))?;

        let entries = fs::read_dir(dir).map_err(|err| directory_error(dir, err))?;
        for listed in entries {
            let entry = listed.map_err(|err| directory_error(dir, err))?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                debug!(target: RUNNER_TARGET, ?file_name, "skipping non UTF-8 entry");
                continue;
            };
            if !self.config.matches(name) {
                debug!(target: RUNNER_TARGET, file = name, "skipping non-plugin file");
                continue;
            }
            self.run_unit(&entry.path(), event)?;
        }

        info!(target: RUNNER_TARGET, %event, "plugins executed");
        announce(out, "Plugins executed.")
    }

    fn run_unit(&self, path: &Path, event: LifecycleEvent) -> Result<(), PluginError> {
        let mut unit = self.loader.load(path)?;
        info!(
            target: RUNNER_TARGET,
            plugin = unit.name(),
            path = %path.display(),
            "loaded plugin"
        );

        if unit.exposes(event) {
            debug!(
                target: RUNNER_TARGET,
                plugin = unit.name(),
                hook = event.hook_name(),
                "invoking hook"
            );
            if let Err(error) = unit.invoke(event) {
                warn!(
                    target: RUNNER_TARGET,
                    plugin = unit.name(),
                    hook = event.hook_name(),
                    %error,
                    "plugin hook failed"
                );
                return Err(error);
            }
        }

        unit.finish()
    }
}

fn announce(out: &mut impl Write, line: &str) -> Result<(), PluginError> {
    writeln!(out, "{line}").map_err(|err| PluginError::Output(Arc::new(err)))
}

fn directory_error(dir: &Path, source: std::io::Error) -> PluginError {
    PluginError::DirectoryAccess {
        path: dir.to_path_buf(),
        source: Arc::new(source),
    }
}
