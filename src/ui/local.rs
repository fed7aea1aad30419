//! Console that prints directly, filtered by verbosity.

use console::Style;

use crate::error::Result;
use crate::ui::{validate_debug_level, Console, MessageKind, Verbosity};

/// Styles for the message kinds that carry color.
#[derive(Debug, Clone)]
struct Theme {
    success: Style,
    warning: Style,
    error: Style,
    waiting: Style,
    header: Style,
}

impl Theme {
    fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            waiting: Style::new().magenta(),
            header: Style::new().bold(),
        }
    }

    /// A theme without colors (non-TTY or `NO_COLOR`).
    fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            waiting: Style::new(),
            header: Style::new(),
        }
    }
}

/// Whether styled output should be used on stdout.
fn should_use_colors() -> bool {
    std::env::var_os("NO_COLOR").is_none()
        && console::Term::stdout().features().colors_supported()
}

/// Console that prints to the terminal of the invoking process.
///
/// Every call is filtered by the current [`Verbosity`] before printing.
pub struct LocalConsole {
    verbosity: Verbosity,
    theme: Theme,
}

impl LocalConsole {
    /// Create a console at the given verbosity.
    pub fn new(verbosity: Verbosity) -> Self {
        let theme = if should_use_colors() {
            Theme::new()
        } else {
            Theme::plain()
        };
        Self { verbosity, theme }
    }

    /// Create a console with verbosity derived from the environment.
    pub fn from_env() -> Self {
        Self::new(Verbosity::from_env())
    }

    /// The verbosity this console filters with.
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    fn print_if(&self, kind: MessageKind, message: &str) {
        if self.verbosity.allows(kind) {
            println!("{message}");
        }
    }
}

impl Console for LocalConsole {
    fn display(&self, message: &str) -> Result<()> {
        self.print_if(MessageKind::Plain, message);
        Ok(())
    }

    fn display_info(&self, message: &str) -> Result<()> {
        self.print_if(MessageKind::Info, message);
        Ok(())
    }

    fn display_waiting(&self, message: &str) -> Result<()> {
        self.print_if(
            MessageKind::Waiting,
            &self.theme.waiting.apply_to(message).to_string(),
        );
        Ok(())
    }

    fn display_success(&self, message: &str) -> Result<()> {
        self.print_if(
            MessageKind::Success,
            &self.theme.success.apply_to(message).to_string(),
        );
        Ok(())
    }

    fn display_warning(&self, message: &str) -> Result<()> {
        self.print_if(
            MessageKind::Warning,
            &self.theme.warning.apply_to(message).to_string(),
        );
        Ok(())
    }

    fn display_error(&self, message: &str) -> Result<()> {
        self.print_if(
            MessageKind::Error,
            &self.theme.error.apply_to(message).to_string(),
        );
        Ok(())
    }

    fn display_debug(&self, message: &str, level: u8) -> Result<()> {
        validate_debug_level(level)?;
        self.print_if(MessageKind::Debug(level), message);
        Ok(())
    }

    fn display_mini_header(&self, message: &str) -> Result<()> {
        self.print_if(
            MessageKind::MiniHeader,
            &self.theme.header.apply_to(format!("[{message}]")).to_string(),
        );
        Ok(())
    }

    fn abort(&self, message: &str, code: i32) -> ! {
        if !message.is_empty() && self.verbosity.allows(MessageKind::Error) {
            println!("{}", self.theme.error.apply_to(message));
        }
        std::process::exit(code);
    }
}
