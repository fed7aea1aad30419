//! Cross-platform process execution.

pub mod command;
pub mod platform;

pub use command::{CommandSpec, ExecContext, ExecOptions, ExecResult};
pub use platform::{normalize_platform_name, platform_name, Platform};
