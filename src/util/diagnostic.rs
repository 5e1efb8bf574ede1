//! User-friendly diagnostic messages.
//!
//! Every error shown to the user carries the root cause, optional context
//! lines, and suggested fixes.

use std::fmt;
use std::path::PathBuf;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no project descriptor is found.
    pub const NO_PROJECT: &str = "Run makei from a directory containing `iproj.json`";

    /// Suggestion when a descriptor is malformed.
    pub const CHECK_DESCRIPTOR: &str =
        "Check the JSON syntax and that `objlib` and `tgtCcsid` are valid";

    /// Suggestion when a requested source has no target.
    pub const LIST_TARGETS: &str = "Run `makei targets` to see which sources are buildable";

    /// Suggestion when make options cannot be split.
    pub const CHECK_MAKE_OPTIONS: &str =
        "Close every quote in `--make-options` or `make_options` in `.makei/config.toml`";

    /// Suggestion when make cannot be started.
    pub const CHECK_MAKE: &str =
        "Install GNU make or point `--make` / `MAKEI_MAKE` at a make executable";

    /// Suggestion when make exits abnormally without reporting failed objects.
    pub const EXECUTOR_FAULT: &str =
        "make exited abnormally; check the Bob installation (`--bob-path`) and make options";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Diagnostic::error(message)
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = match (color, self.severity) {
            (true, Severity::Error) => "\x1b[1;31merror\x1b[0m".to_string(),
            (true, Severity::Warning) => "\x1b[1;33mwarning\x1b[0m".to_string(),
            (false, severity) => severity.to_string(),
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  = {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("subdirectory `QSQLSRC` does not exist")
            .with_location("/home/dev/proj/Rules.mk")
            .with_context("listed in SUBDIRS")
            .with_suggestion("Create `QSQLSRC` or remove it from SUBDIRS");

        let output = diag.format(false);
        assert!(output.contains("error: subdirectory `QSQLSRC` does not exist"));
        assert!(output.contains("--> /home/dev/proj/Rules.mk"));
        assert!(output.contains("= listed in SUBDIRS"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("1. Create `QSQLSRC`"));
    }

    #[test]
    fn test_warning_without_suggestions() {
        let output = Diagnostic::warning("make exited with status 2").format(false);
        assert_eq!(output, "warning: make exited with status 2\n");
    }
}
