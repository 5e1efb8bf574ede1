//! `makei vars` command
//!
//! Prints the build variable file without writing it or running make.

use anyhow::Result;

use crate::cli::VarsArgs;
use makei::ops::render_vars;
use makei::util::{GlobalContext, Shell};

pub fn execute(_args: VarsArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let root = ctx.find_project_root()?;

    print!("{}", render_vars(&root, shell.use_color())?);
    Ok(())
}
