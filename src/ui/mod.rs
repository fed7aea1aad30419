//! Display facades.
//!
//! Every component that talks to the user holds a [`Console`]: a fixed
//! capability set with three interchangeable implementations.
//!
//! - [`LocalConsole`] prints directly, filtered by [`Verbosity`]
//! - [`ForwardingConsole`] encodes every call through the bridge for replay
//!   by the invoking process
//! - [`SafeConsole`] wraps either and exposes only the display capability,
//!   for handing to lower-trust plugin code
//!
//! [`MockConsole`] captures calls for assertions in tests.

pub mod forward;
pub mod local;
pub mod mock;
pub mod safe;

pub use forward::ForwardingConsole;
pub use local::LocalConsole;
pub use mock::MockConsole;
pub use safe::SafeConsole;

use crate::error::{BinderyError, Result};

/// Environment variable that raises verbosity.
pub const VERBOSE_ENV_VAR: &str = "BINDERY_VERBOSE";

/// Environment variable that lowers verbosity.
pub const QUIET_ENV_VAR: &str = "BINDERY_QUIET";

/// The display capability set.
///
/// `display` is unconditional; the rest are filtered (or forwarded) according
/// to the implementation. `abort` never returns: it terminates the hosting
/// process with the given exit code.
pub trait Console {
    /// Display a message unconditionally.
    fn display(&self, message: &str) -> Result<()>;

    /// Display a message conveying basic information.
    fn display_info(&self, message: &str) -> Result<()>;

    /// Display a message shown before a potentially time consuming operation.
    fn display_waiting(&self, message: &str) -> Result<()>;

    /// Display a message indicating a positive outcome.
    fn display_success(&self, message: &str) -> Result<()>;

    /// Display a message conveying important information.
    fn display_warning(&self, message: &str) -> Result<()>;

    /// Display a message indicating an unrecoverable error.
    fn display_error(&self, message: &str) -> Result<()>;

    /// Display a message that is not useful for most user experiences.
    ///
    /// `level` must be between 1 and 3 inclusive; anything else is a
    /// validation error regardless of the current verbosity.
    fn display_debug(&self, message: &str, level: u8) -> Result<()>;

    /// Display a bracketed section header.
    fn display_mini_header(&self, message: &str) -> Result<()>;

    /// Terminate the hosting process with the given exit code, optionally
    /// displaying a message first.
    fn abort(&self, message: &str, code: i32) -> !;
}

impl<C: Console + ?Sized> Console for std::sync::Arc<C> {
    fn display(&self, message: &str) -> Result<()> {
        (**self).display(message)
    }

    fn display_info(&self, message: &str) -> Result<()> {
        (**self).display_info(message)
    }

    fn display_waiting(&self, message: &str) -> Result<()> {
        (**self).display_waiting(message)
    }

    fn display_success(&self, message: &str) -> Result<()> {
        (**self).display_success(message)
    }

    fn display_warning(&self, message: &str) -> Result<()> {
        (**self).display_warning(message)
    }

    fn display_error(&self, message: &str) -> Result<()> {
        (**self).display_error(message)
    }

    fn display_debug(&self, message: &str, level: u8) -> Result<()> {
        (**self).display_debug(message, level)
    }

    fn display_mini_header(&self, message: &str) -> Result<()> {
        (**self).display_mini_header(message)
    }

    fn abort(&self, message: &str, code: i32) -> ! {
        (**self).abort(message, code)
    }
}

/// The kind of a display call, for threshold lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Plain,
    Info,
    Waiting,
    Success,
    Warning,
    Error,
    MiniHeader,
    Debug(u8),
}

/// Signed verbosity level derived from two environment counters.
///
/// `BINDERY_VERBOSE` raises it, `BINDERY_QUIET` lowers it; the two are
/// combined by subtraction. Errors and aborts are filtered only at the two
/// most extreme negative levels; ordinary messages go first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Verbosity(i32);

impl Verbosity {
    /// Create a verbosity with an explicit level.
    pub fn new(level: i32) -> Self {
        Self(level)
    }

    /// Derive the level from the environment.
    pub fn from_env() -> Self {
        Self(env_counter(VERBOSE_ENV_VAR) - env_counter(QUIET_ENV_VAR))
    }

    /// Shift the level, e.g. by CLI `-v`/`-q` flag counts.
    pub fn adjusted(self, delta: i32) -> Self {
        Self(self.0.saturating_add(delta))
    }

    /// The raw signed level.
    pub fn level(&self) -> i32 {
        self.0
    }

    /// Whether a message of the given kind is emitted at this level.
    ///
    /// Debug kinds must be validated with [`validate_debug_level`] first;
    /// here an out-of-range level simply never passes.
    pub fn allows(&self, kind: MessageKind) -> bool {
        match kind {
            MessageKind::Plain => true,
            MessageKind::Info
            | MessageKind::Waiting
            | MessageKind::Success
            | MessageKind::MiniHeader => self.0 >= 0,
            MessageKind::Warning => self.0 >= -1,
            MessageKind::Error => self.0 >= -2,
            MessageKind::Debug(level) => {
                (1..=3).contains(&level) && self.0 >= i32::from(level)
            }
        }
    }
}

/// Check that a debug display level is within the supported 1..=3 range.
pub fn validate_debug_level(level: u8) -> Result<()> {
    if (1..=3).contains(&level) {
        Ok(())
    } else {
        Err(BinderyError::InvalidDebugLevel { level })
    }
}

fn env_counter(name: &str) -> i32 {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}
