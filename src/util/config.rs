//! Configuration file support for makei.
//!
//! makei reads two optional configuration files:
//! - Global: `~/.makei/config.toml` - User-wide defaults
//! - Project: `.makei/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Command line flags and
//! environment variables take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::DEFAULT_BOB_PATH;
use crate::util::process::find_make;

/// Name of the per-user and per-project configuration directory.
pub const CONFIG_DIR: &str = ".makei";

/// makei configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Path to the make executable
    pub make: Option<PathBuf>,

    /// Bob installation directory
    pub bob_path: Option<PathBuf>,

    /// Extra options always passed to make
    pub make_options: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.make.is_some() {
            self.build.make = other.build.make;
        }
        if other.build.bob_path.is_some() {
            self.build.bob_path = other.build.bob_path;
        }
        if other.build.make_options.is_some() {
            self.build.make_options = other.build.make_options;
        }
    }

    /// The make executable, falling back to discovery.
    pub fn make(&self) -> PathBuf {
        self.build.make.clone().unwrap_or_else(find_make)
    }

    /// Bob's installation directory, falling back to the IBM i default.
    pub fn bob_path(&self) -> PathBuf {
        self.build
            .bob_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BOB_PATH))
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.makei/config.toml)
/// 2. Global config (~/.makei/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global makei config directory (~/.makei).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// Get the project config path (.makei/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join("config.toml")
}
