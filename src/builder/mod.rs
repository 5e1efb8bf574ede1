//! Build planning and execution.
//!
//! Planning reads the descriptor tree into a target map and per-directory
//! settings. Emission writes the files Bob consumes; execution runs make and
//! classifies what it reports.

pub mod artifacts;
pub mod emit;
pub mod executor;
pub mod output;
pub mod resolve;
pub mod target_map;

pub use artifacts::TempArtifacts;
pub use emit::{emit, objlib_to_path, render_rules_build, BuildVars, IncDir};
pub use executor::{run, split_make_options, BuildResult, MakeCommand, DEFAULT_BOB_PATH};
pub use output::{BobOutputClassifier, OutputClassifier, TargetEvent};
pub use resolve::{discover_descriptor_dirs, resolve_all, ResolvedDirs};
pub use target_map::{
    build_target_map, resolve_targets, TargetKey, TargetMap, DEFAULT_GOAL, DIR_TARGET_PREFIX,
};
