//! `makei build` command

use std::process::ExitCode;

use anyhow::Result;

use crate::cli::BuildArgs;
use crate::commands::{build_options, run_build};
use makei::util::{GlobalContext, Shell};

pub fn execute(args: BuildArgs, shell: &Shell) -> Result<ExitCode> {
    let ctx = GlobalContext::new()?;
    let root = ctx.find_project_root()?;

    let mut opts = build_options(&ctx, &root, args.make, shell);
    opts.targets = args.target;

    run_build(&root, &opts, shell)
}
