//! Console that forwards every call across the process boundary.

use std::collections::BTreeMap;

use serde_json::json;

use crate::bridge;
use crate::error::Result;
use crate::ui::{validate_debug_level, Console};

/// Console used when Bindery code runs as a subprocess of the front end
/// (plugins, build backends).
///
/// Verbosity is not consulted here: filtering is deferred to the invoking
/// process, which replays each call on its own console. Every method becomes
/// one encoded line on stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardingConsole;

impl ForwardingConsole {
    pub fn new() -> Self {
        Self
    }

    fn forward(&self, method: &str, message: &str) -> Result<()> {
        bridge::send_command(method, vec![json!(message)], BTreeMap::new())
    }
}

impl Console for ForwardingConsole {
    fn display(&self, message: &str) -> Result<()> {
        self.forward("display", message)
    }

    fn display_info(&self, message: &str) -> Result<()> {
        self.forward("display_info", message)
    }

    fn display_waiting(&self, message: &str) -> Result<()> {
        self.forward("display_waiting", message)
    }

    fn display_success(&self, message: &str) -> Result<()> {
        self.forward("display_success", message)
    }

    fn display_warning(&self, message: &str) -> Result<()> {
        self.forward("display_warning", message)
    }

    fn display_error(&self, message: &str) -> Result<()> {
        self.forward("display_error", message)
    }

    fn display_debug(&self, message: &str, level: u8) -> Result<()> {
        validate_debug_level(level)?;
        let mut kwargs = BTreeMap::new();
        kwargs.insert("level".to_string(), json!(level));
        bridge::send_command("display_debug", vec![json!(message)], kwargs)
    }

    fn display_mini_header(&self, message: &str) -> Result<()> {
        self.forward("display_mini_header", message)
    }

    fn abort(&self, message: &str, code: i32) -> ! {
        let mut kwargs = BTreeMap::new();
        kwargs.insert("code".to_string(), json!(code));
        if let Err(err) = bridge::send_command("abort", vec![json!(message)], kwargs) {
            tracing::error!(%err, "failed to forward abort command");
        }
        std::process::exit(code);
    }
}
