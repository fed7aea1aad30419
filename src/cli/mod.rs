//! Command-line interface definition and dispatch.

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::error::Result;
use crate::shell::{CommandSpec, ExecContext, ExecOptions, Platform};
use crate::ui::{Console, ForwardingConsole, LocalConsole, Verbosity};

/// Bindery command-line interface.
#[derive(Parser, Debug)]
#[command(name = "bindery", version, about = "Build and packaging tool front end")]
pub struct Cli {
    /// Increase verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease verbosity (repeatable)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command; a non-zero exit code becomes our own
    Run(RunArgs),

    /// Run a command and print its combined output
    Capture(CaptureArgs),

    /// Replace this process with a command
    Exec(ExecArgs),

    /// Show platform information
    Env,

    /// Emit an encoded display command on stdout (plugin bridge)
    #[command(hide = true)]
    Notify(NotifyArgs),
}

/// Arguments for `bindery run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run through the system shell
    #[arg(long)]
    pub shell: bool,

    /// Stream output through the status display instead of inheriting stdio
    #[arg(long)]
    pub status: bool,

    /// The command to run
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Arguments for `bindery capture`.
#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// Run through the system shell
    #[arg(long)]
    pub shell: bool,

    /// The command to run
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Arguments for `bindery exec`.
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// The command to become
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Arguments for `bindery notify`.
#[derive(Args, Debug)]
pub struct NotifyArgs {
    /// Display method to forward
    pub method: String,

    /// Message argument
    #[arg(default_value = "")]
    pub message: String,

    /// Debug level (display_debug only)
    #[arg(long, default_value_t = 1)]
    pub level: u8,

    /// Exit code (abort only)
    #[arg(long, default_value_t = 1)]
    pub code: i32,
}

/// A trailing command vector as a [`CommandSpec`]: a single token is a
/// command line subject to platform lexing, several tokens are an explicit
/// argument vector.
fn to_spec(command: &[String]) -> CommandSpec {
    if command.len() == 1 {
        CommandSpec::Line(command[0].clone())
    } else {
        CommandSpec::Args(command.to_vec())
    }
}

/// Execute a parsed invocation.
pub fn dispatch(cli: Cli) -> Result<()> {
    let verbosity =
        Verbosity::from_env().adjusted(i32::from(cli.verbose) - i32::from(cli.quiet));
    let console = LocalConsole::new(verbosity);
    let platform = Platform::new();

    match cli.command {
        Commands::Run(args) => {
            let spec = to_spec(&args.command);
            let options = ExecOptions::default();
            let context = if args.status {
                ExecContext::with_status(&console)
            } else {
                ExecContext::detached()
            };
            platform.check_command(&spec, args.shell, &options, context)?;
            Ok(())
        }
        Commands::Capture(args) => {
            let output = platform.check_command_output(
                &to_spec(&args.command),
                args.shell,
                &ExecOptions::default(),
                &console,
            )?;
            print!("{output}");
            Ok(())
        }
        Commands::Exec(args) => {
            let never = platform.exit_with_command(&args.command)?;
            match never {}
        }
        Commands::Env => {
            console.display(&format!("platform: {}", platform.name()))?;
            console.display(&format!("default shell: {}", platform.default_shell()))?;
            if let Some(home) = platform.home() {
                console.display(&format!("home: {}", home.display()))?;
            }
            Ok(())
        }
        Commands::Notify(args) => {
            let bridge = ForwardingConsole::new();
            match args.method.as_str() {
                "display" => bridge.display(&args.message),
                "display_info" => bridge.display_info(&args.message),
                "display_waiting" => bridge.display_waiting(&args.message),
                "display_success" => bridge.display_success(&args.message),
                "display_warning" => bridge.display_warning(&args.message),
                "display_error" => bridge.display_error(&args.message),
                "display_debug" => bridge.display_debug(&args.message, args.level),
                "display_mini_header" => bridge.display_mini_header(&args.message),
                "abort" => bridge.abort(&args.message, args.code),
                other => Err(anyhow::anyhow!("unknown display method: {other}").into()),
            }
        }
    }
}
