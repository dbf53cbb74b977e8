//! Crate-level test doubles and BDD tests.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rhai::EvalAltResult;

use crate::error::PluginError;
use crate::loader::{LifecycleEvent, PluginLoader, PluginUnit, plugin_name};

mod behaviour;

/// Shared record of what stub units were asked to do.
pub(crate) type Journal = Arc<Mutex<Vec<String>>>;

pub(crate) fn journal_entries(journal: &Journal) -> Vec<String> {
    journal.lock().expect("journal lock").clone()
}

/// Digs the value passed to `throw` out of an engine error.
pub(crate) fn thrown_value(error: &EvalAltResult) -> Option<String> {
    match error {
        EvalAltResult::ErrorRuntime(value, _) => Some(value.to_string()),
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _) => thrown_value(inner),
        _ => None,
    }
}

/// How a [`StubUnit`] behaves when driven by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StubBehaviour {
    /// Exposes every hook and succeeds.
    Hooked,
    /// Exposes no hooks.
    Silent,
    /// Exposes every hook and fails when invoked.
    FailingHook,
    /// Exposes no hooks and fails on teardown.
    FailingFinish,
}

/// Unit double that writes `invoke:<name>:<hook>` and `finish:<name>` entries
/// to a journal.
pub(crate) struct StubUnit {
    name: String,
    behaviour: StubBehaviour,
    journal: Journal,
}

impl StubUnit {
    pub(crate) fn boxed(
        name: &str,
        behaviour: StubBehaviour,
        journal: &Journal,
    ) -> Box<dyn PluginUnit> {
        Box::new(Self {
            name: name.to_owned(),
            behaviour,
            journal: Arc::clone(journal),
        })
    }

    fn record(&self, entry: String) {
        self.journal.lock().expect("journal lock").push(entry);
    }
}

impl PluginUnit for StubUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn exposes(&self, _event: LifecycleEvent) -> bool {
        matches!(
            self.behaviour,
            StubBehaviour::Hooked | StubBehaviour::FailingHook
        )
    }

    fn invoke(&mut self, event: LifecycleEvent) -> Result<(), PluginError> {
        self.record(format!("invoke:{}:{}", self.name, event.hook_name()));
        if self.behaviour == StubBehaviour::FailingHook {
            return Err(PluginError::HookFailed {
                name: self.name.clone(),
                hook: event.hook_name(),
                message: String::from("stub failure"),
            });
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<(), PluginError> {
        self.record(format!("finish:{}", self.name));
        if self.behaviour == StubBehaviour::FailingFinish {
            return Err(PluginError::NonZeroExit {
                name: self.name.clone(),
                status: 2,
            });
        }
        Ok(())
    }
}

/// Loader that hands out hooked stub units named after each file.
pub(crate) struct HookedLoader {
    pub(crate) journal: Journal,
}

impl PluginLoader for HookedLoader {
    fn load(&self, path: &Path) -> Result<Box<dyn PluginUnit>, PluginError> {
        Ok(StubUnit::boxed(
            &plugin_name(path),
            StubBehaviour::Hooked,
            &self.journal,
        ))
    }
}

/// Writes each file into `dir` with placeholder contents.
pub(crate) fn touch_all(dir: &Path, files: &[&str]) {
    for file in files {
        fs::write(dir.join(file), "// placeholder\n").expect("write fixture file");
    }
}
