//! Build planning error types and diagnostics.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error raised while loading descriptors, planning, or driving a build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid configuration in `{}`: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("`{}` references missing subdirectory `{subdir}`", descriptor.display())]
    DanglingReference { descriptor: PathBuf, subdir: String },

    #[error("no target builds source `{}`", source_file.display())]
    UnknownTarget {
        source_file: PathBuf,
        known: Vec<String>,
    },

    #[error("make options `{options}` have an unbalanced quote")]
    MakeOptions { options: String },

    #[error("could not find `iproj.json` in `{}` or any parent directory", cwd.display())]
    NoProject { cwd: PathBuf },

    #[error("I/O error on `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to run `{program}`")]
    Executor {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    pub(crate) fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        BuildError::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            BuildError::Config { path, message } => Diagnostic::error(message.clone())
                .with_location(path)
                .with_suggestion(suggestions::CHECK_DESCRIPTOR),

            BuildError::DanglingReference { descriptor, subdir } => Diagnostic::error(format!(
                "subdirectory `{}` does not exist",
                subdir
            ))
            .with_location(descriptor)
            .with_context("listed in SUBDIRS")
            .with_suggestion(format!(
                "Create `{}` or remove it from SUBDIRS",
                subdir
            )),

            BuildError::UnknownTarget { source_file, known } => {
                let mut diag = Diagnostic::error(format!(
                    "no target builds `{}`",
                    source_file.display()
                ));
                if !known.is_empty() {
                    let shown: Vec<_> = known.iter().take(8).cloned().collect();
                    diag = diag.with_context(format!("known sources: {}", shown.join(", ")));
                }
                diag.with_suggestion(suggestions::LIST_TARGETS)
            }

            BuildError::MakeOptions { options } => Diagnostic::error(format!(
                "cannot split make options `{}`",
                options
            ))
            .with_context("a quote is opened but never closed")
            .with_suggestion(suggestions::CHECK_MAKE_OPTIONS),

            BuildError::NoProject { cwd } => Diagnostic::error(format!(
                "could not find `iproj.json` in `{}` or any parent directory",
                cwd.display()
            ))
            .with_suggestion(suggestions::NO_PROJECT),

            BuildError::Io { path, source } => Diagnostic::error(format!(
                "I/O error on `{}`: {}",
                path.display(),
                source
            ))
            .with_suggestion("Check permissions on the source tree and the temp directory"),

            BuildError::Executor { program, source } => {
                Diagnostic::error(format!("could not run `{}`: {}", program, source))
                    .with_suggestion(suggestions::CHECK_MAKE)
            }
        }
    }
}
