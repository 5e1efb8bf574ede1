//! Centralized shell output.
//!
//! Status lines go to stderr, right-aligned like `{status:>12} {message}`.
//! The build summary goes to stdout alongside make's own output.

use std::fmt::Display;
use std::io::{self, IsTerminal};

use crate::builder::BuildResult;

const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Default: status messages
    #[default]
    Normal,
    /// --verbose: status messages plus debug logging
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    /// Never use ANSI colors.
    Never,
}

impl ColorChoice {
    /// Pick the color mode from the `--no-color` flag and `NO_COLOR`.
    pub fn from_env(no_color: bool) -> Self {
        let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        if no_color || no_color_env {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        }
    }
}

/// Status types for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Finished,
    Building,
    Compiling,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Finished => "Finished",
            Status::Building => "Building",
            Status::Compiling => "Compiling",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            // Success: bold green
            Status::Finished => "\x1b[1;32m",
            // In-progress: bold cyan
            Status::Building | Status::Compiling => "\x1b[1;36m",
        }
    }
}

/// Central shell for all CLI output.
#[derive(Debug, Clone)]
pub struct Shell {
    verbosity: Verbosity,
    use_color: bool,
}

impl Shell {
    pub fn new(verbosity: Verbosity, color: ColorChoice) -> Self {
        let use_color = match color {
            ColorChoice::Auto => io::stderr().is_terminal(),
            ColorChoice::Never => false,
        };
        Shell {
            verbosity,
            use_color,
        }
    }

    /// Create a shell from CLI flags.
    pub fn from_flags(verbose: bool, no_color: bool) -> Self {
        let verbosity = if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        Shell::new(verbosity, ColorChoice::from_env(no_color))
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Check if colors are enabled.
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Print a status message.
    pub fn status(&self, status: Status, msg: impl Display) {
        eprintln!("{} {}", self.format_status(status), msg);
    }

    /// Print the end-of-build summary on stdout.
    pub fn print_summary(&self, result: &BuildResult) {
        for line in self.summary_lines(result) {
            println!("{}", line);
        }
    }

    fn summary_lines(&self, result: &BuildResult) -> Vec<String> {
        let mut lines = vec![format!(
            "{} {} {} {} total",
            self.paint(BOLD, &format!("{:<20}", "Objects:")),
            self.paint(RED, &format!("{} failed", result.failed.len())),
            self.paint(GREEN, &format!("{} succeed", result.succeeded.len())),
            result.total()
        )];
        if !result.failed.is_empty() {
            lines.push(format!(
                "{:<21} {}",
                " > Failed objects:",
                result.failed.join(" ")
            ));
        }
        lines.push(self.paint(BOLD, "Build Completed!"));
        lines
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_color {
            format!("{}{}{}", code, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();
        if self.use_color {
            format!("{}{:>12}{}", status.color_code(), text, RESET)
        } else {
            format!("{:>12}", text)
        }
    }
}
