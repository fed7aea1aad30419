//! Mock console implementation for testing.
//!
//! `MockConsole` implements the [`Console`] trait and captures every call
//! for later assertion. It is also the sink of choice for exercising the
//! streaming execution mode in tests.
//!
//! # Example
//!
//! ```
//! use bindery::ui::{Console, MockConsole};
//!
//! let console = MockConsole::new();
//! console.display_info("building").unwrap();
//! console.display_success("done").unwrap();
//!
//! assert_eq!(console.infos(), vec!["building"]);
//! assert_eq!(console.successes(), vec!["done"]);
//! ```

use std::sync::Mutex;

use crate::error::Result;
use crate::ui::{validate_debug_level, Console};

/// Console that records calls instead of printing.
///
/// `abort` panics rather than terminating the test process.
#[derive(Debug, Default)]
pub struct MockConsole {
    displayed: Mutex<Vec<String>>,
    infos: Mutex<Vec<String>>,
    waitings: Mutex<Vec<String>>,
    successes: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    debugs: Mutex<Vec<(String, u8)>>,
    headers: Mutex<Vec<String>>,
}

impl MockConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn displayed(&self) -> Vec<String> {
        self.displayed.lock().unwrap().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }

    pub fn waitings(&self) -> Vec<String> {
        self.waitings.lock().unwrap().clone()
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn debugs(&self) -> Vec<(String, u8)> {
        self.debugs.lock().unwrap().clone()
    }

    pub fn headers(&self) -> Vec<String> {
        self.headers.lock().unwrap().clone()
    }
}

impl Console for MockConsole {
    fn display(&self, message: &str) -> Result<()> {
        self.displayed.lock().unwrap().push(message.to_string());
        Ok(())
    }

    fn display_info(&self, message: &str) -> Result<()> {
        self.infos.lock().unwrap().push(message.to_string());
        Ok(())
    }

    fn display_waiting(&self, message: &str) -> Result<()> {
        self.waitings.lock().unwrap().push(message.to_string());
        Ok(())
    }

    fn display_success(&self, message: &str) -> Result<()> {
        self.successes.lock().unwrap().push(message.to_string());
        Ok(())
    }

    fn display_warning(&self, message: &str) -> Result<()> {
        self.warnings.lock().unwrap().push(message.to_string());
        Ok(())
    }

    fn display_error(&self, message: &str) -> Result<()> {
        self.errors.lock().unwrap().push(message.to_string());
        Ok(())
    }

    fn display_debug(&self, message: &str, level: u8) -> Result<()> {
        validate_debug_level(level)?;
        self.debugs
            .lock()
            .unwrap()
            .push((message.to_string(), level));
        Ok(())
    }

    fn display_mini_header(&self, message: &str) -> Result<()> {
        self.headers.lock().unwrap().push(format!("[{message}]"));
        Ok(())
    }

    fn abort(&self, message: &str, code: i32) -> ! {
        panic!("abort called with code {code}: {message}");
    }
}
