//! Platform identity and lazily resolved platform capabilities.

use std::path::{Path, PathBuf};

use once_cell::sync::{Lazy, OnceCell};

/// Cached process-wide platform name. The running platform cannot change
/// mid-process, so this is computed once and never invalidated.
static PLATFORM_NAME: Lazy<&'static str> = Lazy::new(|| normalize_platform_name(std::env::consts::OS));

/// The name of the running platform: `linux`, `windows`, or `macos`.
///
/// Callers elsewhere in the system branch on these literal values.
pub fn platform_name() -> &'static str {
    *PLATFORM_NAME
}

/// Normalize an OS identifier to one of the three supported platform names.
///
/// `darwin` maps to `macos`; anything that is neither Windows nor macOS is
/// treated as `linux`.
pub fn normalize_platform_name(name: &str) -> &'static str {
    match name.to_lowercase().as_str() {
        "windows" => "windows",
        "darwin" | "macos" => "macos",
        _ => "linux",
    }
}

/// Platform facilities that are expensive or environment-dependent to
/// resolve, each initialized on first use and cached for the process
/// lifetime. Resolution failures propagate from the facility itself, never
/// from the cache.
#[derive(Debug, Default)]
struct Capabilities {
    default_shell: OnceCell<String>,
    home: OnceCell<Option<PathBuf>>,
}

/// Single point of truth for "how do I run a command on this OS".
///
/// Holds the lazily resolved capability set; the execution entry points live
/// in [`crate::shell::command`] and consult this type for shell selection,
/// argument joining, and path resolution.
#[derive(Debug, Default)]
pub struct Platform {
    caps: Capabilities,
}

impl Platform {
    /// Create a platform handle with no capabilities resolved yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// One of `linux`, `windows`, `macos`.
    pub fn name(&self) -> &'static str {
        platform_name()
    }

    /// Whether Bindery is running on Windows.
    pub fn is_windows(&self) -> bool {
        self.name() == "windows"
    }

    /// Whether Bindery is running on macOS.
    pub fn is_macos(&self) -> bool {
        self.name() == "macos"
    }

    /// Whether Bindery is running on neither Windows nor macOS.
    pub fn is_linux(&self) -> bool {
        self.name() == "linux"
    }

    /// The default shell of the system.
    ///
    /// On Windows first try the `SHELL` environment variable, if present,
    /// followed by `COMSPEC`, defaulting to `cmd`. On all other platforms
    /// only `SHELL` is consulted, defaulting to `bash`.
    pub fn default_shell(&self) -> &str {
        self.caps.default_shell.get_or_init(|| {
            if self.is_windows() {
                std::env::var("SHELL")
                    .or_else(|_| std::env::var("COMSPEC"))
                    .unwrap_or_else(|_| "cmd".to_string())
            } else {
                std::env::var("SHELL").unwrap_or_else(|_| "bash".to_string())
            }
        })
    }

    /// Join an argument vector into a single command line that the current
    /// platform's lexing rules will split back into the same vector.
    pub fn join_command_args(&self, args: &[String]) -> String {
        if self.is_windows() {
            join_cmdline_windows(args)
        } else {
            shell_words::join(args)
        }
    }

    /// Format a filesystem path as a `file://` URI.
    ///
    /// Windows paths get the three-slash form with separators normalized.
    pub fn format_file_uri(&self, path: &str) -> String {
        if self.is_windows() {
            format!("file:///{}", path.replace('\\', "/"))
        } else {
            format!("file://{path}")
        }
    }

    /// The user's home directory, resolved lazily.
    pub fn home(&self) -> Option<&Path> {
        self.caps
            .home
            .get_or_init(dirs::home_dir)
            .as_deref()
    }

    /// Select a shell executable that survives macOS System Integrity
    /// Protection.
    ///
    /// A shell launched from within a SIP-protected process strips
    /// dynamic-linker override variables (`DYLD_*`, `LD_*`), silently
    /// breaking tool invocations that depend on them. When any such variable
    /// is set, pick the first of `sh`, `bash`, `zsh`, `fish` found on a
    /// search path with SIP-guarded directories removed (`/usr/local` is not
    /// guarded and stays).
    ///
    /// Returns `None` off macOS, when no override variable is present, or
    /// when no unprotected shell can be found; execution then proceeds with
    /// default shell selection.
    pub fn sip_safe_shell(&self) -> Option<PathBuf> {
        if !self.is_macos() {
            return None;
        }
        if !std::env::vars_os().any(|(key, _)| {
            let key = key.to_string_lossy();
            key.starts_with("DYLD_") || key.starts_with("LD_")
        }) {
            return None;
        }

        let path_var = std::env::var_os("PATH")?;
        let unprotected: Vec<PathBuf> = std::env::split_paths(&path_var)
            .filter(|entry| is_sip_unprotected(entry))
            .collect();
        let search_path = std::env::join_paths(unprotected).ok()?;
        let cwd = std::env::current_dir().ok()?;

        for name in ["sh", "bash", "zsh", "fish"] {
            if let Ok(executable) = which::which_in(name, Some(&search_path), &cwd) {
                return Some(executable);
            }
        }
        None
    }
}

/// Whether a search-path entry is outside the directories guarded by System
/// Integrity Protection. `/usr/local` is writable and therefore kept.
fn is_sip_unprotected(entry: &Path) -> bool {
    let normalized = entry.to_string_lossy();
    if normalized.starts_with("/usr/local") {
        return true;
    }
    !["/System", "/usr", "/bin", "/sbin", "/var"]
        .iter()
        .any(|guarded| normalized.starts_with(guarded))
}

/// Quote and join arguments using the Windows `CommandLineToArgvW`
/// conventions (the `list2cmdline` algorithm).
fn join_cmdline_windows(args: &[String]) -> String {
    let mut line = String::new();
    for arg in args {
        if !line.is_empty() {
            line.push(' ');
        }
        let needs_quoting = arg.is_empty() || arg.contains(' ') || arg.contains('\t');
        if !needs_quoting && !arg.contains('"') {
            line.push_str(arg);
            continue;
        }

        line.push('"');
        let mut backslashes = 0usize;
        for ch in arg.chars() {
            match ch {
                '\\' => backslashes += 1,
                '"' => {
                    // Backslashes before a quote must be doubled, plus one to
                    // escape the quote itself.
                    line.push_str(&"\\".repeat(backslashes * 2 + 1));
                    line.push('"');
                    backslashes = 0;
                }
                _ => {
                    line.push_str(&"\\".repeat(backslashes));
                    backslashes = 0;
                    line.push(ch);
                }
            }
        }
        // Backslashes before the closing quote must be doubled.
        line.push_str(&"\\".repeat(backslashes * 2));
        line.push('"');
    }
    line
}
