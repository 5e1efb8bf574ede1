//! Core data structures for makei.
//!
//! This module contains the descriptor model read from the source tree:
//! - `iproj.json` project descriptor
//! - `.ibmi.json` per-directory overrides and resolved settings
//! - `Rules.mk` build descriptors
//! - The shared error taxonomy

pub mod errors;
pub mod ibmi_json;
pub mod project;
pub mod rules;

pub use errors::BuildError;
pub use ibmi_json::{load_directory_override, DirectoryOverride, ResolvedSettings, OVERRIDE_FILE};
pub use project::{ProjectDescriptor, NO_INCLUDES, PROJECT_FILE};
pub use rules::{Prerequisite, Rule, RulesMk, RULES_BUILD_FILE, RULES_FILE};
