//! Entrypoint for the `jen-build` plugin pass.
//!
//! The binary delegates to [`jen_build::run`], which loads configuration,
//! installs telemetry, and runs every plugin in the configured directory.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    jen_build::run(std::env::args_os(), &mut stdout, &mut stderr)
}
