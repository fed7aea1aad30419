//! Error types for Bindery operations.
//!
//! This module defines [`BinderyError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `BinderyError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `BinderyError::Other`) for unexpected errors
//! - Child-process failures from checked executions are *not* errors: they
//!   terminate the hosting process with the child's exit code (fail-fast)

use thiserror::Error;

/// Core error type for Bindery operations.
#[derive(Debug, Error)]
pub enum BinderyError {
    /// A command could not be spawned.
    #[error("Failed to spawn command: {command}: {message}")]
    SpawnFailed { command: String, message: String },

    /// A command string could not be split into arguments (malformed quoting).
    #[error("Failed to parse command line: {command}")]
    CommandParseError { command: String },

    /// Debug display called with a level outside the supported range.
    #[error("Debug output can only have verbosity levels between 1 and 3 (inclusive), got {level}")]
    InvalidDebugLevel { level: u8 },

    /// A bridge command could not be serialized.
    #[error("Failed to encode bridge command '{method}': {message}")]
    EncodeError { method: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Bindery operations.
pub type Result<T> = std::result::Result<T, BinderyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_failed_displays_command_and_message() {
        let err = BinderyError::SpawnFailed {
            command: "cargo build".into(),
            message: "No such file or directory".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("cargo build"));
        assert!(msg.contains("No such file or directory"));
    }

    #[test]
    fn command_parse_error_displays_command() {
        let err = BinderyError::CommandParseError {
            command: "echo 'unterminated".into(),
        };
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn invalid_debug_level_displays_level() {
        let err = BinderyError::InvalidDebugLevel { level: 4 };
        let msg = err.to_string();
        assert!(msg.contains("between 1 and 3"));
        assert!(msg.contains("4"));
    }

    #[test]
    fn encode_error_displays_method() {
        let err = BinderyError::EncodeError {
            method: "display_info".into(),
            message: "key must be a string".into(),
        };
        assert!(err.to_string().contains("display_info"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: BinderyError = io_err.into();
        assert!(matches!(err, BinderyError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(BinderyError::InvalidDebugLevel { level: 0 })
        }
        assert!(returns_error().is_err());
    }
}
