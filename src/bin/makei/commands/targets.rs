//! `makei targets` command

use anyhow::Result;

use crate::cli::TargetsArgs;
use crate::commands::from_cwd;
use makei::builder::{build_target_map, TargetKey};
use makei::util::GlobalContext;
use makei::BuildError;

pub fn execute(args: TargetsArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let root = ctx.find_project_root()?;
    let map = build_target_map(&root)?;

    if let Some(file) = args.file {
        let file = from_cwd(&ctx, file);
        let target = map
            .target_for_source(&file)
            .ok_or_else(|| BuildError::UnknownTarget {
                source_file: file.clone(),
                known: map.sources(),
            })?;
        println!("{}", target);
        return Ok(());
    }

    if map.is_empty() {
        eprintln!("no targets found under {}", root.display());
        return Ok(());
    }

    let width = map
        .iter()
        .map(|(key, _)| key.to_string().len())
        .max()
        .unwrap_or(0);

    // Sources first, then directories.
    let (sources, dirs): (Vec<_>, Vec<_>) = map
        .iter()
        .partition(|(key, _)| matches!(key, TargetKey::Source(_)));

    for (key, target) in sources.into_iter().chain(dirs) {
        println!("{:<width$}  {}", key.to_string(), target, width = width);
    }

    Ok(())
}
