//! Implementation of `makei build` and `makei compile`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::{
    build_target_map, emit, executor, resolve_all, resolve_targets, split_make_options,
    BobOutputClassifier,
    BuildResult, BuildVars, MakeCommand, ResolvedDirs, TargetMap, TempArtifacts,
};
use crate::core::{BuildError, ProjectDescriptor, RulesMk, PROJECT_FILE, RULES_FILE};
use crate::util::fs::{normalize_path, remove_file_if_exists};

/// Log files Bob appends to, cleared before every build.
const LOG_FILES: &[&str] = &[".logs/joblog.json", ".logs/output.log"];

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Make goals to build (wins over `sources`)
    pub targets: Vec<String>,

    /// Source files to build, translated through the target map
    pub sources: Vec<PathBuf>,

    /// Extra options passed through to make, split with shell quoting rules
    pub make_options: Option<String>,

    /// The make executable
    pub make: PathBuf,

    /// Bob's installation directory
    pub bob_path: PathBuf,

    /// Whether Bob should colorize its messages
    pub color: bool,
}

/// Everything read from the source tree before anything is written.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub root: PathBuf,
    pub project: ProjectDescriptor,
    pub target_map: TargetMap,
    /// Make goals for this invocation
    pub goals: Vec<String>,
    pub resolved: ResolvedDirs,
    /// Parsed descriptors, in the same order as `resolved`
    pub descriptors: Vec<RulesMk>,
}

impl BuildPlan {
    /// Read and validate the project under `root`.
    ///
    /// Every fatal configuration problem surfaces here, before any file is
    /// written or deleted.
    pub fn load(
        root: &Path,
        targets: &[String],
        sources: &[PathBuf],
    ) -> Result<BuildPlan, BuildError> {
        let root = normalize_path(root);
        let project = ProjectDescriptor::from_file(&root.join(PROJECT_FILE))?;
        let target_map = build_target_map(&root)?;
        let goals = resolve_targets(&target_map, targets, sources)?;
        let resolved = resolve_all(&root, &project)?;

        let descriptors = resolved
            .dirs()
            .iter()
            .map(|dir| RulesMk::from_file(&dir.join(RULES_FILE)))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "planned {} goal(s) over {} descriptor(s)",
            goals.len(),
            descriptors.len()
        );

        Ok(BuildPlan {
            root,
            project,
            target_map,
            goals,
            resolved,
            descriptors,
        })
    }

    pub fn build_vars(&self, color: bool) -> BuildVars<'_> {
        BuildVars::new(&self.project, &self.resolved, color)
    }
}

/// Render the build variable file without writing anything.
pub fn render_vars(root: &Path, color: bool) -> Result<String> {
    let plan = BuildPlan::load(root, &[], &[])?;
    let text = plan.build_vars(color).render()?;
    Ok(text)
}

/// Build the project under `root`, handing every make output line to `sink`.
///
/// Temporary files are removed before this returns, whatever the outcome.
pub fn build<F>(root: &Path, opts: &BuildOptions, sink: F) -> Result<BuildResult>
where
    F: FnMut(&str),
{
    let plan = BuildPlan::load(root, &opts.targets, &opts.sources)?;
    let options = match opts.make_options.as_deref() {
        Some(options) => split_make_options(options)?,
        None => Vec::new(),
    };

    let mut artifacts = TempArtifacts::new();
    let build_vars = emit(
        &plan.build_vars(opts.color),
        &plan.descriptors,
        &plan.root,
        &mut artifacts,
    )?;

    remove_previous_logs(&plan.root)?;

    let cmd = MakeCommand {
        make: opts.make.clone(),
        build_vars,
        bob_path: opts.bob_path.clone(),
        options,
        targets: plan.goals.clone(),
        cwd: plan.root.clone(),
    };
    let result = executor::run(&cmd, &BobOutputClassifier, sink);

    artifacts.release();
    let result = result?;

    if result.executor_fault() {
        tracing::debug!(
            "make exited with {:?} without reporting a failed object",
            result.exit_code
        );
    }
    Ok(result)
}

fn remove_previous_logs(root: &Path) -> Result<()> {
    for log in LOG_FILES {
        let path = root.join(log);
        if remove_file_if_exists(&path)
            .with_context(|| format!("failed to clear previous build log {}", path.display()))?
        {
            tracing::debug!("removed {}", path.display());
        }
    }
    Ok(())
}
