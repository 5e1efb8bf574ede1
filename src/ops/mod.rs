//! High-level operations.
//!
//! This module contains the implementation of makei commands.

pub mod makei_build;

pub use makei_build::{build, render_vars, BuildOptions, BuildPlan};
