//! makei - A build planner and make driver for IBM i projects
//!
//! This crate reads an IBM i source tree (`iproj.json`, `.ibmi.json`,
//! `Rules.mk`), resolves per-directory build settings, emits the files Bob's
//! makefiles consume, and drives `make` while classifying what it reports.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for makei unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides temporary project trees and a scripted stand-in for make.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildResult, TargetMap};
pub use core::{BuildError, ProjectDescriptor, ResolvedSettings, RulesMk};
pub use ops::{BuildOptions, BuildPlan};
pub use util::context::GlobalContext;
