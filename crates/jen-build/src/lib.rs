//! Runtime for the `jen-build` plugin pass.
//!
//! The module owns configuration bootstrapping, telemetry installation, loader
//! selection, and the mapping from failures to process exit codes. It is
//! exercised both from the binary entrypoint and from tests where the
//! argument list and IO streams can be substituted.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use jen_config::Config;
use jen_plugins::process::ProcessLoader;
use jen_plugins::{LifecycleEvent, PluginRunner, RunnerConfig, ScriptLoader};
use tracing::debug;

mod errors;
pub mod telemetry;

pub use errors::AppError;

/// Bundles the IO streams provided to the runtime.
struct IoStreams<'a, W: Write, E: Write> {
    stdout: &'a mut W,
    stderr: &'a mut E,
}

/// Runs the plugin pass using the provided arguments and IO handles.
///
/// Plugin status lines go to `stdout`; configuration help and version text
/// also go to `stdout`, while failures are reported on `stderr`.
#[must_use]
pub fn run<I, T, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
    E: Write,
{
    let mut io = IoStreams { stdout, stderr };
    match execute(args, io.stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::Configuration(error)) if error.is_informational() => {
            drop(write!(io.stdout, "{error}"));
            ExitCode::SUCCESS
        }
        Err(error) => {
            drop(writeln!(io.stderr, "jen-build: {error}"));
            ExitCode::FAILURE
        }
    }
}

fn execute<I, T, W>(args: I, stdout: &mut W) -> Result<(), AppError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    let config = Config::load_from_iter(args)?;
    telemetry::initialise(&config)?;

    let event = config
        .event()
        .parse::<LifecycleEvent>()
        .map_err(|_| AppError::UnknownEvent {
            event: config.event().to_owned(),
        })?;
    let runner_config = RunnerConfig::new(
        config.plugin_dir().as_std_path(),
        config.plugin_suffix(),
    );

    if config.interpreter().is_empty() {
        debug!(target: "jen_build", "running plugins in the embedded engine");
        let runner = PluginRunner::new(runner_config, ScriptLoader::new());
        runner.run_event(event, stdout)?;
    } else {
        debug!(
            target: "jen_build",
            interpreter = ?config.interpreter(),
            "running plugins as child processes"
        );
        let loader = ProcessLoader::new(config.interpreter().to_vec());
        let runner = PluginRunner::new(runner_config, loader);
        runner.run_event(event, stdout)?;
    }
    Ok(())
}
