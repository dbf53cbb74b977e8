//! JSONL handshake between the runner and a process-backed plugin.
//!
//! Every message is a single JSON object terminated by a newline.
//!
//! 1. Once its top-level code has run, the plugin writes one
//!    [`PluginAnnouncement`] naming the hooks it defines.
//! 2. For each hook the runner wants, it writes a [`HookRequest`] and the
//!    plugin answers with a [`HookResponse`].
//! 3. The runner closes the plugin's stdin; the plugin exits.
//!
//! Plugin stderr is not part of the protocol.

use serde::{Deserialize, Serialize};

/// First line a plugin writes after loading.
///
/// # Example
///
/// ```
/// use jen_plugins::protocol::PluginAnnouncement;
///
/// let announcement: PluginAnnouncement =
///     serde_json::from_str(r#"{"hooks":["on_build"]}"#).unwrap();
/// assert!(announcement.declares("on_build"));
/// assert!(!announcement.declares("on_deploy"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PluginAnnouncement {
    #[serde(default)]
    hooks: Vec<String>,
}

impl PluginAnnouncement {
    /// Creates an announcement for the given hook names.
    #[must_use]
    pub const fn new(hooks: Vec<String>) -> Self {
        Self { hooks }
    }

    /// Returns the declared hook names.
    #[must_use]
    pub const fn hooks(&self) -> &[String] {
        self.hooks.as_slice()
    }

    /// Returns whether the plugin declared `hook`.
    #[must_use]
    pub fn declares(&self, hook: &str) -> bool {
        self.hooks.iter().any(|declared| declared == hook)
    }
}

/// Asks the plugin to run one of its hooks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HookRequest {
    hook: String,
}

impl HookRequest {
    /// Creates a request for `hook`.
    #[must_use]
    pub fn new(hook: impl Into<String>) -> Self {
        Self { hook: hook.into() }
    }

    /// Returns the requested hook name.
    #[must_use]
    pub const fn hook(&self) -> &str {
        self.hook.as_str()
    }
}

/// Outcome of a hook, reported by the plugin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HookResponse {
    /// The hook ran to completion. Any result value is ignored.
    Success,
    /// The hook raised.
    Failure {
        /// Description of the failure, passed through to the caller.
        message: String,
    },
}
