//! `makei compile` command
//!
//! Builds the objects created from the given source files.

use std::process::ExitCode;

use anyhow::Result;

use crate::cli::CompileArgs;
use crate::commands::{build_options, from_cwd, run_build};
use makei::util::shell::Status;
use makei::util::{GlobalContext, Shell};

pub fn execute(args: CompileArgs, shell: &Shell) -> Result<ExitCode> {
    let ctx = GlobalContext::new()?;
    let root = ctx.find_project_root()?;

    let mut opts = build_options(&ctx, &root, args.make, shell);
    opts.sources = args.file.into_iter().map(|f| from_cwd(&ctx, f)).collect();

    for source in &opts.sources {
        shell.status(Status::Compiling, source.display());
    }

    run_build(&root, &opts, shell)
}
