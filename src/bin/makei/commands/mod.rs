//! Command implementations

pub mod build;
pub mod compile;
pub mod completions;
pub mod info;
pub mod targets;
pub mod vars;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;

use crate::cli::MakeArgs;
use makei::ops::{build, BuildOptions};
use makei::util::diagnostic::{self, suggestions, Diagnostic};
use makei::util::shell::Status;
use makei::util::{GlobalContext, Shell};

/// Locate the project and fill in make settings.
///
/// Precedence: flag or environment, then project config, then global config,
/// then built-in defaults.
pub(crate) fn build_options(
    ctx: &GlobalContext,
    root: &Path,
    args: MakeArgs,
    shell: &Shell,
) -> BuildOptions {
    let config = ctx.load_config(root);
    BuildOptions {
        make: args.make.unwrap_or_else(|| config.make()),
        bob_path: args.bob_path.unwrap_or_else(|| config.bob_path()),
        make_options: args.make_options.or(config.build.make_options),
        color: shell.use_color(),
        ..BuildOptions::default()
    }
}

/// Run a build, print its summary and pick the exit code.
pub(crate) fn run_build(root: &Path, opts: &BuildOptions, shell: &Shell) -> Result<ExitCode> {
    shell.status(Status::Building, root.display());

    let result = build(root, opts, |line| println!("{}", line))?;
    shell.print_summary(&result);

    if result.executor_fault() {
        let exit = result
            .exit_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "a signal".to_string());
        diagnostic::emit(
            &Diagnostic::warning(format!(
                "make exited with {} but reported no failed object",
                exit
            ))
            .with_suggestion(suggestions::EXECUTOR_FAULT),
            shell.use_color(),
        );
    }

    if result.success() {
        shell.status(Status::Finished, format!("{} object(s)", result.succeeded.len()));
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Resolve a path given on the command line against the working directory.
pub(crate) fn from_cwd(ctx: &GlobalContext, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        ctx.cwd().join(path)
    }
}
