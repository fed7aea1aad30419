//! Cross-platform command execution.
//!
//! All process spawning in Bindery goes through [`Platform`]: commands are
//! first normalized for the running OS ([`Platform::format_for_subprocess`]),
//! then run blocking, streamed line-by-line to a status sink, or substituted
//! for the current process entirely.

use std::collections::HashMap;
use std::convert::Infallible;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;

use crate::error::{BinderyError, Result};
use crate::shell::platform::Platform;
use crate::ui::Console;

/// A command to execute: either a single command line or an argument vector.
///
/// Lines are the ergonomic form for configuration files and prompts; argument
/// vectors avoid shell interpretation entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSpec {
    /// A single command line, subject to platform lexing rules.
    Line(String),
    /// An explicit argument vector, passed through untouched.
    Args(Vec<String>),
}

impl CommandSpec {
    /// Human-readable form for error messages and logging.
    pub fn describe(&self) -> String {
        match self {
            Self::Line(line) => line.clone(),
            Self::Args(args) => args.join(" "),
        }
    }
}

impl From<&str> for CommandSpec {
    fn from(line: &str) -> Self {
        Self::Line(line.to_string())
    }
}

impl From<Vec<String>> for CommandSpec {
    fn from(args: Vec<String>) -> Self {
        Self::Args(args)
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with the inherited environment).
    pub env: HashMap<String, String>,

    /// Capture stdout/stderr (if false, the child inherits them).
    pub capture_output: bool,

    /// Explicit shell executable, overriding platform selection.
    pub shell_executable: Option<PathBuf>,
}

/// Execution context carried into every `run_command` call.
///
/// When a live status display is active the context holds a sink; child
/// output is then streamed to it line-by-line instead of being buffered.
#[derive(Clone, Copy, Default)]
pub struct ExecContext<'a> {
    status_sink: Option<&'a dyn Console>,
}

impl<'a> ExecContext<'a> {
    /// A context with no live status display.
    pub fn detached() -> Self {
        Self::default()
    }

    /// A context whose child output is streamed to the given sink.
    pub fn with_status(sink: &'a dyn Console) -> Self {
        Self {
            status_sink: Some(sink),
        }
    }

    /// The active status sink, if any.
    pub fn status_sink(&self) -> Option<&'a dyn Console> {
        self.status_sink
    }
}

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Captured standard output (empty when inherited or streamed).
    pub stdout: String,

    /// Captured standard error (empty when inherited or streamed).
    pub stderr: String,

    /// Whether the command succeeded (exit code 0).
    pub success: bool,
}

impl ExecResult {
    fn from_status(exit_code: Option<i32>, stdout: String, stderr: String) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            success: exit_code == Some(0),
        }
    }
}

impl Platform {
    /// Format a command for immediate consumption by the spawn machinery.
    ///
    /// Without a shell, an argument vector on Windows gets its executable
    /// resolved against `PATH` (falling back to the literal name), and a
    /// command line on other platforms is split using shell lexing rules
    /// (respecting quoting). Shell invocations pass through unchanged; the
    /// interpreter does its own parsing.
    pub fn format_for_subprocess(&self, command: &CommandSpec, shell: bool) -> Result<CommandSpec> {
        if shell {
            return Ok(command.clone());
        }

        match command {
            CommandSpec::Args(args) if self.is_windows() => {
                let mut formatted = args.clone();
                if let Some(executable) = formatted.first_mut() {
                    if let Ok(resolved) = which::which(&*executable) {
                        *executable = resolved.to_string_lossy().into_owned();
                    }
                }
                Ok(CommandSpec::Args(formatted))
            }
            CommandSpec::Args(_) => Ok(command.clone()),
            CommandSpec::Line(line) => {
                let args =
                    shell_words::split(line).map_err(|_| BinderyError::CommandParseError {
                        command: line.clone(),
                    })?;
                Ok(CommandSpec::Args(args))
            }
        }
    }

    /// Run a command, blocking until it exits.
    ///
    /// When the context carries a live status sink and output capture was
    /// not requested, delegates to the streaming mode so the child's output
    /// appears incrementally instead of after the fact.
    pub fn run_command(
        &self,
        command: &CommandSpec,
        shell: bool,
        options: &ExecOptions,
        context: ExecContext<'_>,
    ) -> Result<ExecResult> {
        if let Some(sink) = context.status_sink() {
            if !options.capture_output {
                return self.run_command_streamed(command, shell, options, sink);
            }
        }

        let mut cmd = self.build_command(command, shell, options)?;

        if options.capture_output {
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());
        }

        tracing::debug!(command = %command.describe(), shell, "spawning command");
        let output = cmd.output().map_err(|err| BinderyError::SpawnFailed {
            command: command.describe(),
            message: err.to_string(),
        })?;

        let stdout = if options.capture_output {
            String::from_utf8_lossy(&output.stdout).to_string()
        } else {
            String::new()
        };
        let stderr = if options.capture_output {
            String::from_utf8_lossy(&output.stderr).to_string()
        } else {
            String::new()
        };

        Ok(ExecResult::from_status(output.status.code(), stdout, stderr))
    }

    /// Run a command; a non-zero exit code terminates the hosting process
    /// with that code.
    ///
    /// This is the fail-fast channel: command pipelines short-circuit
    /// without error-propagation boilerplate at each call site.
    pub fn check_command(
        &self,
        command: &CommandSpec,
        shell: bool,
        options: &ExecOptions,
        context: ExecContext<'_>,
    ) -> Result<ExecResult> {
        let result = self.run_command(command, shell, options, context)?;
        if !result.success {
            std::process::exit(result.exit_code.unwrap_or(1));
        }
        Ok(result)
    }

    /// Capture the combined stdout/stderr of a command.
    ///
    /// On non-zero exit the captured output is routed through the console's
    /// error channel and the hosting process terminates with the child's
    /// code. On success the decoded text is returned.
    pub fn check_command_output(
        &self,
        command: &CommandSpec,
        shell: bool,
        options: &ExecOptions,
        console: &dyn Console,
    ) -> Result<String> {
        let (output, exit_code) = self.capture_merged(command, shell, options)?;
        if exit_code != Some(0) {
            console.display_error(&output)?;
            std::process::exit(exit_code.unwrap_or(1));
        }
        Ok(output)
    }

    /// Replace the current process with the given command.
    ///
    /// On POSIX systems the process image is substituted (no return, no new
    /// process id). Windows lacks that primitive; there the command is
    /// spawned, waited on, and its exit code becomes ours.
    pub fn exit_with_command(&self, args: &[String]) -> Result<Infallible> {
        let command = CommandSpec::Args(args.to_vec());
        if args.is_empty() {
            return Err(BinderyError::SpawnFailed {
                command: command.describe(),
                message: "empty command".to_string(),
            });
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;

            let formatted = self.format_for_subprocess(&command, false)?;
            let argv = match formatted {
                CommandSpec::Args(argv) => argv,
                CommandSpec::Line(line) => vec![line],
            };
            tracing::debug!(command = %command.describe(), "replacing process image");
            let err = Command::new(&argv[0]).args(&argv[1..]).exec();
            Err(BinderyError::SpawnFailed {
                command: command.describe(),
                message: err.to_string(),
            })
        }

        #[cfg(not(unix))]
        {
            let result =
                self.run_command(&command, false, &ExecOptions::default(), ExecContext::detached())?;
            std::process::exit(result.exit_code.unwrap_or(1));
        }
    }

    /// Streaming execution: the child's stdout and stderr are merged and
    /// forwarded to the sink line-by-line as they arrive.
    ///
    /// The output is never read in one blocking whole-stream call; a child
    /// that outgrows the OS pipe buffer before exiting would deadlock
    /// against a reader waiting for EOF.
    fn run_command_streamed(
        &self,
        command: &CommandSpec,
        shell: bool,
        options: &ExecOptions,
        sink: &dyn Console,
    ) -> Result<ExecResult> {
        let mut child = self.spawn_piped(command, shell, options)?;

        let stdout = child.stdout.take().unwrap();
        let stderr = child.stderr.take().unwrap();

        let (tx, rx) = mpsc::channel();
        let tx_stdout = tx.clone();
        let tx_stderr = tx;

        let stdout_handle = thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines().map_while(std::result::Result::ok) {
                let _ = tx_stdout.send(line);
            }
        });
        let stderr_handle = thread::spawn(move || {
            let reader = BufReader::new(stderr);
            for line in reader.lines().map_while(std::result::Result::ok) {
                let _ = tx_stderr.send(line);
            }
        });

        let mut sink_error = None;
        for line in rx {
            if sink_error.is_none() {
                if let Err(err) = sink.display(&line) {
                    sink_error = Some(err);
                }
            }
        }

        let _ = stdout_handle.join();
        let _ = stderr_handle.join();

        // The child is reaped on every exit path before its code is trusted.
        let status = child.wait().map_err(|err| BinderyError::SpawnFailed {
            command: command.describe(),
            message: err.to_string(),
        })?;

        if let Some(err) = sink_error {
            return Err(err);
        }

        Ok(ExecResult::from_status(
            status.code(),
            String::new(),
            String::new(),
        ))
    }

    /// Capture combined stdout/stderr as one text blob, lines in arrival
    /// order, along with the exit code.
    fn capture_merged(
        &self,
        command: &CommandSpec,
        shell: bool,
        options: &ExecOptions,
    ) -> Result<(String, Option<i32>)> {
        let mut child = self.spawn_piped(command, shell, options)?;

        let stdout = child.stdout.take().unwrap();
        let stderr = child.stderr.take().unwrap();

        let (tx, rx) = mpsc::channel();
        let tx_stdout = tx.clone();
        let tx_stderr = tx;

        let stdout_handle = thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines().map_while(std::result::Result::ok) {
                let _ = tx_stdout.send(line);
            }
        });
        let stderr_handle = thread::spawn(move || {
            let reader = BufReader::new(stderr);
            for line in reader.lines().map_while(std::result::Result::ok) {
                let _ = tx_stderr.send(line);
            }
        });

        let mut output = String::new();
        for line in rx {
            output.push_str(&line);
            output.push('\n');
        }

        let _ = stdout_handle.join();
        let _ = stderr_handle.join();

        let status = child.wait().map_err(|err| BinderyError::SpawnFailed {
            command: command.describe(),
            message: err.to_string(),
        })?;

        Ok((output, status.code()))
    }

    fn spawn_piped(
        &self,
        command: &CommandSpec,
        shell: bool,
        options: &ExecOptions,
    ) -> Result<std::process::Child> {
        let mut cmd = self.build_command(command, shell, options)?;
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!(command = %command.describe(), shell, "spawning piped command");
        cmd.spawn().map_err(|err| BinderyError::SpawnFailed {
            command: command.describe(),
            message: err.to_string(),
        })
    }

    /// Assemble a `std::process::Command` with formatting, shell selection,
    /// working directory, and environment applied.
    fn build_command(
        &self,
        command: &CommandSpec,
        shell: bool,
        options: &ExecOptions,
    ) -> Result<Command> {
        let mut cmd = if shell {
            let line = match command {
                CommandSpec::Line(line) => line.clone(),
                CommandSpec::Args(args) => self.join_command_args(args),
            };
            let (interpreter, flag) = self.shell_interpreter(options);
            let mut cmd = Command::new(interpreter);
            cmd.arg(flag);
            cmd.arg(line);
            cmd
        } else {
            let formatted = self.format_for_subprocess(command, shell)?;
            let argv = match formatted {
                CommandSpec::Args(argv) => argv,
                CommandSpec::Line(line) => vec![line],
            };
            let executable = argv.first().ok_or_else(|| BinderyError::SpawnFailed {
                command: command.describe(),
                message: "empty command".to_string(),
            })?;
            let mut cmd = Command::new(executable);
            cmd.args(&argv[1..]);
            cmd
        };

        if let Some(cwd) = &options.cwd {
            cmd.current_dir(cwd);
        }
        for (key, value) in &options.env {
            cmd.env(key, value);
        }

        Ok(cmd)
    }

    /// Pick the interpreter and flag used for shell invocations.
    ///
    /// An explicit executable in the options wins; otherwise macOS may
    /// substitute a SIP-safe shell, and the platform default (`sh`, or
    /// `COMSPEC` on Windows) is the fallback.
    fn shell_interpreter(&self, options: &ExecOptions) -> (PathBuf, &'static str) {
        if self.is_windows() {
            let interpreter = options.shell_executable.clone().unwrap_or_else(|| {
                PathBuf::from(std::env::var("COMSPEC").unwrap_or_else(|_| "cmd".to_string()))
            });
            (interpreter, "/C")
        } else {
            let interpreter = options
                .shell_executable
                .clone()
                .or_else(|| self.sip_safe_shell())
                .unwrap_or_else(|| PathBuf::from("sh"));
            (interpreter, "-c")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockConsole;

    fn platform() -> Platform {
        Platform::new()
    }

    #[test]
    fn format_splits_line_without_shell() {
        let formatted = platform()
            .format_for_subprocess(&CommandSpec::from("echo hi"), false)
            .unwrap();
        assert_eq!(
            formatted,
            CommandSpec::Args(vec!["echo".to_string(), "hi".to_string()])
        );
    }

    #[test]
    fn format_respects_quoting() {
        let formatted = platform()
            .format_for_subprocess(&CommandSpec::from("echo 'hello world'"), false)
            .unwrap();
        assert_eq!(
            formatted,
            CommandSpec::Args(vec!["echo".to_string(), "hello world".to_string()])
        );
    }

    #[test]
    fn format_leaves_line_untouched_with_shell() {
        let spec = CommandSpec::from("echo hi && echo bye");
        let formatted = platform().format_for_subprocess(&spec, true).unwrap();
        assert_eq!(formatted, spec);
    }

    #[test]
    fn format_rejects_malformed_quoting() {
        let err = platform()
            .format_for_subprocess(&CommandSpec::from("echo 'unterminated"), false)
            .unwrap_err();
        assert!(matches!(err, BinderyError::CommandParseError { .. }));
    }

    #[test]
    fn format_passes_args_through() {
        let spec = CommandSpec::Args(vec!["echo".to_string(), "a b".to_string()]);
        let formatted = platform().format_for_subprocess(&spec, false).unwrap();
        if !platform().is_windows() {
            assert_eq!(formatted, spec);
        }
    }

    #[test]
    fn run_captures_output() {
        let options = ExecOptions {
            capture_output: true,
            ..Default::default()
        };
        let result = platform()
            .run_command(
                &CommandSpec::from("echo hello"),
                false,
                &options,
                ExecContext::detached(),
            )
            .unwrap();
        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn run_reports_nonzero_exit() {
        let result = platform()
            .run_command(
                &CommandSpec::from("exit 7"),
                true,
                &ExecOptions::default(),
                ExecContext::detached(),
            )
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(7));
    }

    #[cfg(unix)]
    #[test]
    fn run_with_shell_interprets_operators() {
        let options = ExecOptions {
            capture_output: true,
            ..Default::default()
        };
        let result = platform()
            .run_command(
                &CommandSpec::from("echo one && echo two"),
                true,
                &options,
                ExecContext::detached(),
            )
            .unwrap();
        assert!(result.stdout.contains("one"));
        assert!(result.stdout.contains("two"));
    }

    #[test]
    fn run_with_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        let options = ExecOptions {
            cwd: Some(temp.path().to_path_buf()),
            capture_output: true,
            ..Default::default()
        };
        let cmd = if cfg!(windows) { "cd" } else { "pwd" };
        let result = platform()
            .run_command(
                &CommandSpec::from(cmd),
                true,
                &options,
                ExecContext::detached(),
            )
            .unwrap();
        assert!(result.success);
    }

    #[test]
    fn run_with_env() {
        let mut options = ExecOptions {
            capture_output: true,
            ..Default::default()
        };
        options
            .env
            .insert("BINDERY_TEST_VAR".to_string(), "marker".to_string());
        let cmd = if cfg!(windows) {
            "echo %BINDERY_TEST_VAR%"
        } else {
            "echo $BINDERY_TEST_VAR"
        };
        let result = platform()
            .run_command(
                &CommandSpec::from(cmd),
                true,
                &options,
                ExecContext::detached(),
            )
            .unwrap();
        assert!(result.stdout.contains("marker"));
    }

    #[cfg(unix)]
    #[test]
    fn streaming_forwards_lines_in_order() {
        let sink = MockConsole::new();
        let context = ExecContext::with_status(&sink);
        let result = platform()
            .run_command(
                &CommandSpec::from("for i in 1 2 3 4 5 6 7 8 9 10; do echo line$i; done"),
                true,
                &ExecOptions::default(),
                context,
            )
            .unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.is_empty());
        assert!(result.stderr.is_empty());

        let lines = sink.displayed();
        assert_eq!(lines.len(), 10);
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(line, &format!("line{}", i + 1));
        }
    }

    #[cfg(unix)]
    #[test]
    fn streaming_merges_stderr() {
        let sink = MockConsole::new();
        let context = ExecContext::with_status(&sink);
        platform()
            .run_command(
                &CommandSpec::from("echo out; echo err >&2"),
                true,
                &ExecOptions::default(),
                context,
            )
            .unwrap();

        let lines = sink.displayed();
        assert!(lines.contains(&"out".to_string()));
        assert!(lines.contains(&"err".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn streaming_is_bypassed_when_capturing() {
        let sink = MockConsole::new();
        let context = ExecContext::with_status(&sink);
        let options = ExecOptions {
            capture_output: true,
            ..Default::default()
        };
        let result = platform()
            .run_command(&CommandSpec::from("echo quiet"), true, &options, context)
            .unwrap();

        assert!(result.stdout.contains("quiet"));
        assert!(sink.displayed().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn streaming_survives_large_output() {
        // More output than an OS pipe buffer holds; a whole-stream read
        // before the child exits would deadlock here.
        let sink = MockConsole::new();
        let context = ExecContext::with_status(&sink);
        let result = platform()
            .run_command(
                &CommandSpec::from("i=0; while [ $i -lt 2000 ]; do echo 'xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx'; i=$((i+1)); done"),
                true,
                &ExecOptions::default(),
                context,
            )
            .unwrap();
        assert!(result.success);
        assert_eq!(sink.displayed().len(), 2000);
    }

    #[test]
    fn exit_with_command_rejects_empty() {
        let err = platform().exit_with_command(&[]).unwrap_err();
        assert!(matches!(err, BinderyError::SpawnFailed { .. }));
    }

    #[test]
    fn spec_describe_forms() {
        assert_eq!(CommandSpec::from("echo hi").describe(), "echo hi");
        assert_eq!(
            CommandSpec::Args(vec!["echo".to_string(), "hi".to_string()]).describe(),
            "echo hi"
        );
    }

    #[cfg(unix)]
    #[test]
    fn check_command_returns_result_on_success() {
        let options = ExecOptions {
            capture_output: true,
            ..Default::default()
        };
        let result = platform()
            .check_command(
                &CommandSpec::from("echo ok"),
                false,
                &options,
                ExecContext::detached(),
            )
            .unwrap();
        assert!(result.success);
    }

    #[cfg(unix)]
    #[test]
    fn check_command_output_returns_merged_text() {
        let console = MockConsole::new();
        let output = platform()
            .check_command_output(
                &CommandSpec::from("echo out; echo err >&2"),
                true,
                &ExecOptions::default(),
                &console,
            )
            .unwrap();
        assert!(output.contains("out"));
        assert!(output.contains("err"));
        assert!(console.errors().is_empty());
    }

    #[test]
    fn run_spawn_failure_is_an_error() {
        let options = ExecOptions {
            capture_output: true,
            ..Default::default()
        };
        let err = platform()
            .run_command(
                &CommandSpec::Args(vec!["bindery-test-definitely-not-a-binary".to_string()]),
                false,
                &options,
                ExecContext::detached(),
            )
            .unwrap_err();
        assert!(matches!(err, BinderyError::SpawnFailed { .. }));
    }
}
