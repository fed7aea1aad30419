//! Bindery - build and packaging tool front end.
//!
//! Bindery normalizes how shell commands are formatted, launched, streamed,
//! and terminated across operating systems, and bridges display calls from
//! subprocesses (plugins, build backends) back to the invoking process over
//! stdout.
//!
//! # Modules
//!
//! - [`bridge`] - Cross-process command encoding
//! - [`cli`] - Command-line interface and argument parsing
//! - [`error`] - Error types and result aliases
//! - [`shell`] - Cross-platform process execution
//! - [`ui`] - Display facades and verbosity filtering
//!
//! # Example
//!
//! ```
//! use bindery::shell::{CommandSpec, ExecContext, ExecOptions, Platform};
//!
//! let platform = Platform::new();
//! let options = ExecOptions {
//!     capture_output: true,
//!     ..Default::default()
//! };
//! let result = platform
//!     .run_command(
//!         &CommandSpec::from("echo hello"),
//!         false,
//!         &options,
//!         ExecContext::detached(),
//!     )
//!     .unwrap();
//! assert!(result.success);
//! ```

pub mod bridge;
pub mod cli;
pub mod error;
pub mod shell;
pub mod ui;

pub use error::{BinderyError, Result};
