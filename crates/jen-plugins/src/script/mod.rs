//! In-process plugins evaluated by the embedded `rhai` engine.
//!
//! Loading a script compiles it and runs its top-level statements in a fresh
//! scope, so every plugin is an isolated module. A script exposes a hook by
//! defining a public zero-argument function with the hook's name:
//!
//! ```text
//! fn on_build() {
//!     print("generating sitemap");
//! }
//! ```
//!
//! A `private fn on_build()` is a helper, not a hook. Calling the hook does not
//! evaluate the top-level statements a second time.
//! Output from `print` and `debug` is forwarded to `tracing`.

use std::path::Path;
use std::sync::Arc;

use rhai::{AST, CallFnOptions, Dynamic, Engine, FnAccess, Scope};
use tracing::{debug, info};

use crate::error::PluginError;
use crate::loader::{LifecycleEvent, PluginLoader, PluginUnit, plugin_name};

/// Tracing target for script plugin output and lifecycle.
const SCRIPT_TARGET: &str = "jen_plugins::script";

/// Loads `rhai` scripts as plugin units.
///
/// # Example
///
/// ```no_run
/// use jen_plugins::{PluginRunner, RunnerConfig, ScriptLoader};
///
/// let runner = PluginRunner::new(RunnerConfig::default(), ScriptLoader::new());
/// runner.run_plugins(&mut std::io::stdout()).expect("plugins ran");
/// ```
pub struct ScriptLoader {
    engine: Arc<Engine>,
}

impl ScriptLoader {
    /// Creates a loader backed by a default engine.
    #[must_use]
    pub fn new() -> Self {
        Self::with_engine(Engine::new())
    }

    /// Creates a loader backed by a caller-configured engine.
    ///
    /// Use this to register native functions that plugins may call. Script
    /// `print` and `debug` output is redirected to `tracing` either way.
    #[must_use]
    pub fn with_engine(mut engine: Engine) -> Self {
        engine.on_print(|text| info!(target: SCRIPT_TARGET, "{text}"));
        engine.on_debug(|text, source, pos| {
            debug!(
                target: SCRIPT_TARGET,
                source = source.unwrap_or_default(),
                position = %pos,
                "{text}"
            );
        });
        Self {
            engine: Arc::new(engine),
        }
    }
}

impl Default for ScriptLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScriptLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptLoader").finish_non_exhaustive()
    }
}

impl PluginLoader for ScriptLoader {
    fn load(&self, path: &Path) -> Result<Box<dyn PluginUnit>, PluginError> {
        let name = plugin_name(path);
        debug!(
            target: SCRIPT_TARGET,
            plugin = name.as_str(),
            path = %path.display(),
            "compiling script plugin"
        );

        let ast = match self.engine.compile_file(path.to_path_buf()) {
            Ok(ast) => ast,
            Err(source) => return Err(PluginError::ScriptLoad { name, source }),
        };

        let mut scope = Scope::new();
        if let Err(source) = self.engine.run_ast_with_scope(&mut scope, &ast) {
            return Err(PluginError::ScriptLoad { name, source });
        }

        Ok(Box::new(ScriptUnit {
            name,
            engine: Arc::clone(&self.engine),
            ast,
            scope,
        }))
    }
}

/// A compiled script whose top-level code has already run.
struct ScriptUnit {
    name: String,
    engine: Arc<Engine>,
    ast: AST,
    scope: Scope<'static>,
}

impl PluginUnit for ScriptUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn exposes(&self, event: LifecycleEvent) -> bool {
        let hook = event.hook_name();
        self.ast
            .iter_functions()
            .any(|function| {
                function.name == hook
                    && function.access == FnAccess::Public
                    && function.params.is_empty()
            })
    }

    fn invoke(&mut self, event: LifecycleEvent) -> Result<(), PluginError> {
        let hook = event.hook_name();
        let options = CallFnOptions::new().eval_ast(false);
        self.engine
            .call_fn_with_options::<Dynamic>(options, &mut self.scope, &self.ast, hook, ())
            .map(drop)
            .map_err(|source| PluginError::ScriptHook {
                name: self.name.clone(),
                hook,
                source,
            })
    }
}
