//! Process-backed plugins for ecosystems the embedded engine cannot host.
//!
//! [`ProcessLoader`] implements [`PluginLoader`] by spawning each plugin file
//! as a child process, either directly or through a configured interpreter
//! such as `python3`. Loading waits for the plugin's
//! [`PluginAnnouncement`]; invoking a hook exchanges one
//! [`HookRequest`]/[`HookResponse`] pair; finishing closes stdin and drains
//! any trailing stdout before reaping the child. Plugin stderr is read on a
//! helper thread and forwarded to the debug log.

use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::PluginError;
use crate::loader::{LifecycleEvent, PluginLoader, PluginUnit, plugin_name};
use crate::protocol::{HookRequest, HookResponse, PluginAnnouncement};

/// Tracing target for plugin process operations.
const PLUGIN_TARGET: &str = "jen_plugins::process";

/// Runs plugins as child processes speaking the JSONL handshake.
///
/// # Example
///
/// ```no_run
/// use jen_plugins::process::ProcessLoader;
/// use jen_plugins::{PluginRunner, RunnerConfig};
///
/// let loader = ProcessLoader::new(vec!["python3".into()]);
/// let runner = PluginRunner::new(RunnerConfig::new("src/plugin/plugins", ".py"), loader);
/// runner.run_plugins(&mut std::io::stdout()).expect("plugins ran");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProcessLoader {
    interpreter: Vec<String>,
}

impl ProcessLoader {
    /// Creates a loader that runs each plugin through `interpreter`.
    ///
    /// The plugin path is appended after the interpreter's own arguments. An
    /// empty interpreter executes the plugin file directly.
    #[must_use]
    pub const fn new(interpreter: Vec<String>) -> Self {
        Self { interpreter }
    }

    /// Returns the interpreter command.
    #[must_use]
    pub const fn interpreter(&self) -> &[String] {
        self.interpreter.as_slice()
    }

    fn command(&self, path: &Path) -> Command {
        match self.interpreter.split_first() {
            Some((program, args)) => {
                let mut command = Command::new(program);
                command.args(args).arg(path);
                command
            }
            None => Command::new(path),
        }
    }
}

impl PluginLoader for ProcessLoader {
    fn load(&self, path: &Path) -> Result<Box<dyn PluginUnit>, PluginError> {
        let name = plugin_name(path);
        let mut command = self.command(path);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(
            target: PLUGIN_TARGET,
            plugin = name.as_str(),
            path = %path.display(),
            "spawning plugin process"
        );

        let mut child = command.spawn().map_err(|err| PluginError::SpawnFailed {
            name: name.clone(),
            source: Arc::new(err),
        })?;

        let (Some(stdin), Some(stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            reap(&name, child);
            return Err(PluginError::InvalidOutput {
                name,
                message: String::from("failed to capture plugin stdio"),
            });
        };

        let stderr_drain = match drain_stderr(&name, stderr) {
            Ok(handle) => handle,
            Err(err) => {
                reap(&name, child);
                return Err(PluginError::io(&name, err));
            }
        };

        let mut unit = ProcessUnit {
            name,
            child: Some(child),
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
            stderr_drain: Some(stderr_drain),
            announcement: PluginAnnouncement::default(),
        };
        unit.announcement = unit.read_announcement()?;
        debug!(
            target: PLUGIN_TARGET,
            plugin = unit.name.as_str(),
            hooks = ?unit.announcement.hooks(),
            "plugin announced hooks"
        );
        Ok(Box::new(unit))
    }
}

/// A running plugin process that has announced its hooks.
struct ProcessUnit {
    name: String,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    stderr_drain: Option<JoinHandle<()>>,
    announcement: PluginAnnouncement,
}

impl ProcessUnit {
    fn read_announcement(&mut self) -> Result<PluginAnnouncement, PluginError> {
        match self.read_message()? {
            Some(announcement) => Ok(announcement),
            None => Err(self.early_exit("plugin exited before announcing its hooks")),
        }
    }

    /// Reads and parses one JSONL line, returning `None` at end of stream.
    fn read_message<T: DeserializeOwned>(&mut self) -> Result<Option<T>, PluginError> {
        let mut line = String::new();
        let bytes_read = self
            .stdout
            .read_line(&mut line)
            .map_err(|err| PluginError::io(&self.name, err))?;

        debug!(
            target: PLUGIN_TARGET,
            plugin = self.name.as_str(),
            bytes_read,
            "read line from plugin stdout"
        );

        if bytes_read == 0 {
            return Ok(None);
        }

        serde_json::from_str(line.trim())
            .map(Some)
            .map_err(|source| PluginError::DeserializeResponse {
                name: self.name.clone(),
                source,
            })
    }

    fn write_request(&mut self, request: &HookRequest) -> Result<(), PluginError> {
        let json = serde_json::to_string(request).map_err(PluginError::SerializeRequest)?;
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(PluginError::InvalidOutput {
                name: self.name.clone(),
                message: String::from("plugin stdin already closed"),
            });
        };

        debug!(
            target: PLUGIN_TARGET,
            plugin = self.name.as_str(),
            hook = request.hook(),
            "writing hook request to plugin stdin"
        );

        stdin
            .write_all(json.as_bytes())
            .and_then(|()| stdin.write_all(b"\n"))
            .and_then(|()| stdin.flush())
            .map_err(|err| PluginError::io(&self.name, err))
    }

    /// Reads whatever the plugin still writes to stdout so it cannot block on
    /// a full pipe before exiting.
    fn drain_stdout(&mut self) -> Result<(), PluginError> {
        let mut trailing = Vec::new();
        let bytes_read = self
            .stdout
            .read_to_end(&mut trailing)
            .map_err(|err| PluginError::io(&self.name, err))?;
        if bytes_read > 0 {
            debug!(
                target: PLUGIN_TARGET,
                plugin = self.name.as_str(),
                bytes_read,
                stdout = %String::from_utf8_lossy(&trailing).trim(),
                "discarding trailing plugin stdout"
            );
        }
        Ok(())
    }

    fn join_stderr(&mut self) {
        if let Some(handle) = self.stderr_drain.take() {
            drop(handle.join());
        }
    }

    /// Prefers the exit status over a protocol complaint when the plugin
    /// stopped talking because it failed.
    fn early_exit(&mut self, message: &str) -> PluginError {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let waited = child.wait();
            self.join_stderr();
            match waited {
                Ok(status) if !status.success() => {
                    return PluginError::NonZeroExit {
                        name: self.name.clone(),
                        status: status.code().unwrap_or(-1),
                    };
                }
                Ok(_) => {}
                Err(err) => return PluginError::io(&self.name, err),
            }
        }
        PluginError::InvalidOutput {
            name: self.name.clone(),
            message: message.to_owned(),
        }
    }
}

impl PluginUnit for ProcessUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn exposes(&self, event: LifecycleEvent) -> bool {
        self.announcement.declares(event.hook_name())
    }

    fn invoke(&mut self, event: LifecycleEvent) -> Result<(), PluginError> {
        let hook = event.hook_name();
        self.write_request(&HookRequest::new(hook))?;
        match self.read_message::<HookResponse>()? {
            Some(HookResponse::Success) => Ok(()),
            Some(HookResponse::Failure { message }) => Err(PluginError::HookFailed {
                name: self.name.clone(),
                hook,
                message,
            }),
            None => Err(self.early_exit("plugin exited without answering the hook request")),
        }
    }

    fn finish(mut self: Box<Self>) -> Result<(), PluginError> {
        // Closing stdin tells the plugin no further requests are coming.
        drop(self.stdin.take());
        self.drain_stdout()?;
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child.wait().map_err(|err| PluginError::io(&self.name, err))?;
        self.join_stderr();
        debug!(
            target: PLUGIN_TARGET,
            plugin = self.name.as_str(),
            ?status,
            "plugin process exited"
        );
        if status.success() {
            return Ok(());
        }
        Err(PluginError::NonZeroExit {
            name: self.name.clone(),
            status: status.code().unwrap_or(-1),
        })
    }
}

impl Drop for ProcessUnit {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(child) = self.child.take() {
            reap(&self.name, child);
        }
    }
}

/// Forwards each stderr line to the debug log until the plugin closes it.
fn drain_stderr(name: &str, stderr: ChildStderr) -> std::io::Result<JoinHandle<()>> {
    let plugin = name.to_owned();
    thread::Builder::new()
        .name(format!("plugin-stderr-{name}"))
        .spawn(move || {
            for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                debug!(
                    target: PLUGIN_TARGET,
                    plugin = plugin.as_str(),
                    stderr = %line,
                    "plugin stderr output"
                );
            }
        })
}

/// Kills and waits for a child that is being abandoned mid-protocol.
fn reap(name: &str, mut child: Child) {
    warn!(
        target: PLUGIN_TARGET,
        plugin = name,
        "terminating plugin process"
    );
    drop(child.kill());
    drop(child.wait());
}
