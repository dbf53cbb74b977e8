//! The seam between the runner and the code that actually executes plugins.
//!
//! A [`PluginLoader`] turns a filesystem path into a live [`PluginUnit`],
//! evaluating the unit's top-level code along the way. The runner then asks
//! the unit whether it exposes the hook for the current [`LifecycleEvent`]
//! and invokes it if so. Units that do not expose the hook are loaded and
//! discarded without further calls.

use std::path::Path;

use strum::{Display, EnumString};

use crate::error::PluginError;

/// Build-pipeline stage that plugins can hook into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LifecycleEvent {
    /// Static build of the site.
    #[default]
    Build,
    /// Development server start-up.
    Serve,
    /// Deployment of the built output.
    Deploy,
}

impl LifecycleEvent {
    /// Returns the name of the entry point a plugin defines for this event.
    ///
    /// ```
    /// use jen_plugins::LifecycleEvent;
    ///
    /// assert_eq!(LifecycleEvent::Build.hook_name(), "on_build");
    /// ```
    #[must_use]
    pub const fn hook_name(self) -> &'static str {
        match self {
            Self::Build => "on_build",
            Self::Serve => "on_serve",
            Self::Deploy => "on_deploy",
        }
    }
}

/// Maps a plugin file to a loaded [`PluginUnit`].
///
/// The production implementations are
/// [`ScriptLoader`](crate::script::ScriptLoader), which evaluates scripts in
/// an embedded engine, and [`ProcessLoader`](crate::process::ProcessLoader),
/// which runs each plugin as a child process. Test code can implement this
/// trait to observe load attempts without touching real plugins.
#[cfg_attr(test, mockall::automock)]
pub trait PluginLoader {
    /// Loads the plugin at `path`, running its top-level code.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] if the plugin cannot be read, compiled, or
    /// started, or if its top-level code fails.
    fn load(&self, path: &Path) -> Result<Box<dyn PluginUnit>, PluginError>;
}

/// A plugin that has been loaded and may expose lifecycle hooks.
pub trait PluginUnit {
    /// Returns the plugin's display name, normally the file stem.
    fn name(&self) -> &str;

    /// Reports whether the unit defines the entry point for `event`.
    fn exposes(&self, event: LifecycleEvent) -> bool;

    /// Calls the entry point for `event` with no arguments.
    ///
    /// Any value returned by the hook is discarded.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] carrying the failure the hook raised.
    fn invoke(&mut self, event: LifecycleEvent) -> Result<(), PluginError>;

    /// Releases the unit once the runner is done with it.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] if tearing the unit down reveals a failure,
    /// such as a child process exiting unsuccessfully.
    fn finish(self: Box<Self>) -> Result<(), PluginError> {
        Ok(())
    }
}

/// Derives a plugin's display name from its path.
pub(crate) fn plugin_name(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| path.display().to_string(), |stem| stem.to_string_lossy().into_owned())
}
