//! Driving Bob's make and collecting per-target results.

use std::path::{Path, PathBuf};

use crate::builder::output::{OutputClassifier, TargetEvent};
use crate::core::BuildError;
use crate::util::process::ProcessBuilder;

/// Where Bob is installed on IBM i.
pub const DEFAULT_BOB_PATH: &str = "/QOpenSys/pkgs/lib/bob";

/// A fully specified make invocation.
#[derive(Debug, Clone)]
pub struct MakeCommand {
    /// The make executable
    pub make: PathBuf,
    /// The generated build variable file
    pub build_vars: PathBuf,
    /// Bob's installation directory
    pub bob_path: PathBuf,
    /// Extra arguments passed through to make
    pub options: Vec<String>,
    /// Goals to build
    pub targets: Vec<String>,
    /// Directory make runs in
    pub cwd: PathBuf,
}

impl MakeCommand {
    /// Bob's entry makefile.
    pub fn bob_makefile(&self) -> PathBuf {
        self.bob_path.join("mk").join("Makefile")
    }

    pub fn to_process(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.make)
            .arg("-k")
            .arg(format!("BUILDVARSMKPATH={}", self.build_vars.display()))
            .arg("-k")
            .arg(format!("BOB={}", self.bob_path.display()))
            .arg("-f")
            .arg(self.bob_makefile())
            .args(&self.options)
            .args(&self.targets)
            .cwd(&self.cwd)
    }
}

/// Split a make option string the way a POSIX shell would.
///
/// `CFLAGS='-a -b'` stays one argument. Unbalanced quotes are rejected.
pub fn split_make_options(options: &str) -> Result<Vec<String>, BuildError> {
    shlex::split(options).ok_or_else(|| BuildError::MakeOptions {
        options: options.to_string(),
    })
}

/// What happened during one make run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildResult {
    /// Targets reported as created, in report order
    pub succeeded: Vec<String>,
    /// Targets reported as failed, in report order
    pub failed: Vec<String>,
    /// Make's exit code, `None` if it was killed by a signal
    pub exit_code: Option<i32>,
}

impl BuildResult {
    /// True when no target failed.
    pub fn success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Make failed without reporting any failed target.
    pub fn executor_fault(&self) -> bool {
        self.failed.is_empty() && self.exit_code != Some(0)
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn record(&mut self, event: TargetEvent) {
        match event {
            TargetEvent::Failed(target) => self.failed.push(target),
            TargetEvent::Succeeded(target) => self.succeeded.push(target),
        }
    }
}

/// Run make, passing each stdout line to `sink` and classifying it.
///
/// A failure to start make is an error; a nonzero exit is recorded in the
/// result instead.
pub fn run<F>(
    cmd: &MakeCommand,
    classifier: &dyn OutputClassifier,
    mut sink: F,
) -> Result<BuildResult, BuildError>
where
    F: FnMut(&str),
{
    let process = cmd.to_process();
    tracing::info!("running {}", process.display_command());

    let mut result = BuildResult::default();
    let status = process
        .stream_stdout(|line| {
            sink(line);
            if let Some(event) = classifier.classify(line) {
                tracing::debug!("{:?}", event);
                result.record(event);
            }
        })
        .map_err(|source| BuildError::Executor {
            program: display_program(process.get_program()),
            source,
        })?;

    result.exit_code = status.code();
    tracing::debug!(
        "make exited with {:?}: {} succeeded, {} failed",
        result.exit_code,
        result.succeeded.len(),
        result.failed.len()
    );
    Ok(result)
}

fn display_program(program: &Path) -> String {
    program.display().to_string()
}
