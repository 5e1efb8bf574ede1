//! `makei info` command

use anyhow::Result;

use crate::cli::InfoArgs;
use makei::core::{ProjectDescriptor, PROJECT_FILE};
use makei::util::GlobalContext;

pub fn execute(args: InfoArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let root = ctx.find_project_root()?;
    let project = ProjectDescriptor::from_file(&root.join(PROJECT_FILE))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&project)?);
        return Ok(());
    }

    println!("project:      {}", root.display());
    if let Some(ref description) = project.description {
        println!("description:  {}", description);
    }
    if let Some(ref version) = project.version {
        println!("version:      {}", version);
    }
    println!("objlib:       {}", project.objlib);
    println!("curlib:       {}", project.curlib);
    println!("tgtCcsid:     {}", project.tgt_ccsid);
    println!("preUsrlibl:   {}", project.pre_usrlibl.join(" "));
    println!("postUsrlibl:  {}", project.post_usrlibl.join(" "));
    if project.has_no_includes() {
        println!("includePath:  *NONE");
    } else {
        println!("includePath:  {}", project.include_path.join(" "));
    }

    Ok(())
}
