//! Build-time plugin discovery and execution for Jen.
//!
//! The `jen-plugins` crate implements the plugin pass run during a site
//! build. A [`PluginRunner`] lists the plugin directory, loads every file
//! carrying the plugin suffix through a [`PluginLoader`], and calls the
//! unit's hook for the current [`LifecycleEvent`] if the unit defines one.
//! Plugins are fully trusted: they run with the privileges of the build and
//! a failure in any of them aborts the pass.
//!
//! # Loaders
//!
//! - [`ScriptLoader`] evaluates `rhai` scripts in-process. Each script is an
//!   isolated module; a hook is a zero-argument function such as
//!   `fn on_build()`.
//! - [`ProcessLoader`](process::ProcessLoader) runs each plugin as a child
//!   process and talks to it over the JSONL handshake in [`protocol`].
//!
//! # Example
//!
//! ```rust,no_run
//! use jen_plugins::{PluginRunner, RunnerConfig, ScriptLoader};
//!
//! let runner = PluginRunner::new(RunnerConfig::default(), ScriptLoader::new());
//! let mut stdout = std::io::stdout();
//! runner.run_plugins(&mut stdout).expect("plugin pass failed");
//! ```

pub mod error;
pub mod loader;
pub mod process;
pub mod protocol;
pub mod runner;
pub mod script;

#[cfg(test)]
mod tests;

pub use self::error::PluginError;
pub use self::loader::{LifecycleEvent, PluginLoader, PluginUnit};
pub use self::runner::{PluginRunner, RunnerConfig};
pub use self::script::ScriptLoader;
