//! Restricted console for lower-trust callers.

use crate::error::Result;
use crate::ui::Console;

/// Pure delegation wrapper exposing only the display capability set.
///
/// Plugin code is handed one of these instead of the application object, so
/// whatever other state the wrapped console's owner holds stays out of
/// reach. Wraps any [`Console`] variant.
pub struct SafeConsole {
    inner: Box<dyn Console>,
}

impl SafeConsole {
    /// Wrap a console, hiding everything but the display operations.
    pub fn new(inner: Box<dyn Console>) -> Self {
        Self { inner }
    }
}

impl Console for SafeConsole {
    fn display(&self, message: &str) -> Result<()> {
        self.inner.display(message)
    }

    fn display_info(&self, message: &str) -> Result<()> {
        self.inner.display_info(message)
    }

    fn display_waiting(&self, message: &str) -> Result<()> {
        self.inner.display_waiting(message)
    }

    fn display_success(&self, message: &str) -> Result<()> {
        self.inner.display_success(message)
    }

    fn display_warning(&self, message: &str) -> Result<()> {
        self.inner.display_warning(message)
    }

    fn display_error(&self, message: &str) -> Result<()> {
        self.inner.display_error(message)
    }

    fn display_debug(&self, message: &str, level: u8) -> Result<()> {
        self.inner.display_debug(message, level)
    }

    fn display_mini_header(&self, message: &str) -> Result<()> {
        self.inner.display_mini_header(message)
    }

    fn abort(&self, message: &str, code: i32) -> ! {
        self.inner.abort(message, code)
    }
}
