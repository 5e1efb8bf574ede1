//! `.ibmi.json` per-directory overrides and resolved settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::errors::BuildError;
use crate::core::project::{ProjectDescriptor, RawCcsid};

/// Per-directory override file name.
pub const OVERRIDE_FILE: &str = ".ibmi.json";

/// Effective build settings of one directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSettings {
    pub tgt_ccsid: u32,
    pub objlib: String,
}

impl ResolvedSettings {
    pub fn new(tgt_ccsid: u32, objlib: impl Into<String>) -> Self {
        ResolvedSettings {
            tgt_ccsid,
            objlib: objlib.into(),
        }
    }

    /// Root defaults derived from the project descriptor.
    pub fn from_project(project: &ProjectDescriptor) -> Self {
        ResolvedSettings::new(project.tgt_ccsid, project.objlib.clone())
    }

    /// Overlay the keys present in `overrides` onto a copy of `self`.
    pub fn overlay(&self, overrides: &DirectoryOverride) -> Self {
        ResolvedSettings {
            tgt_ccsid: overrides.tgt_ccsid.unwrap_or(self.tgt_ccsid),
            objlib: overrides
                .objlib
                .clone()
                .unwrap_or_else(|| self.objlib.clone()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawOverride {
    #[serde(default)]
    build: RawBuild,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBuild {
    #[serde(default)]
    tgt_ccsid: Option<RawCcsid>,
    #[serde(default)]
    objlib: Option<String>,
}

/// Optional overrides declared by a directory. `None` means inherit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryOverride {
    pub tgt_ccsid: Option<u32>,
    pub objlib: Option<String>,
}

impl DirectoryOverride {
    /// Read an override file. Returns `Ok(None)` when the file is absent.
    pub fn load(path: &Path) -> Result<Option<Self>, BuildError> {
        if !path.is_file() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| BuildError::config(path, format!("could not read override: {}", e)))?;
        Self::parse(&contents, path).map(Some)
    }

    pub fn parse(contents: &str, path: &Path) -> Result<Self, BuildError> {
        let raw: RawOverride = serde_json::from_str(contents)
            .map_err(|e| BuildError::config(path, format!("malformed JSON: {}", e)))?;

        let tgt_ccsid = match raw.build.tgt_ccsid {
            Some(ref ccsid) => Some(ccsid.validate(path)?),
            None => None,
        };

        let objlib = match raw.build.objlib {
            Some(lib) if lib.trim().is_empty() => {
                return Err(BuildError::config(path, "`build.objlib` must not be empty"))
            }
            other => other.map(|lib| lib.trim().to_string()),
        };

        Ok(DirectoryOverride { tgt_ccsid, objlib })
    }
}

/// Resolve a directory's settings from its override file and its parent's settings.
///
/// Returns a copy of `parent` when the override file does not exist.
pub fn load_directory_override(
    path: &Path,
    parent: &ResolvedSettings,
) -> Result<ResolvedSettings, BuildError> {
    match DirectoryOverride::load(path)? {
        Some(overrides) => Ok(parent.overlay(&overrides)),
        None => Ok(parent.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_absent_override_inherits() {
        let tmp = TempDir::new().unwrap();
        let parent = ResolvedSettings::new(37, "PARENT");
        let resolved = load_directory_override(&tmp.path().join(OVERRIDE_FILE), &parent).unwrap();
        assert_eq!(resolved, parent);
    }

    #[test]
    fn test_partial_override() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(OVERRIDE_FILE);
        std::fs::write(&path, r#"{"version": "0.0.1", "build": {"tgtCcsid": 1208}}"#).unwrap();

        let parent = ResolvedSettings::new(37, "PARENT");
        let resolved = load_directory_override(&path, &parent).unwrap();
        assert_eq!(resolved, ResolvedSettings::new(1208, "PARENT"));
    }

    #[test]
    fn test_full_override() {
        let overrides =
            DirectoryOverride::parse(r#"{"build": {"tgtCcsid": "500", "objlib": "SUBLIB"}}"#, Path::new("x"))
                .unwrap();
        let resolved = ResolvedSettings::new(37, "PARENT").overlay(&overrides);
        assert_eq!(resolved, ResolvedSettings::new(500, "SUBLIB"));
    }

    #[test]
    fn test_override_without_build_section() {
        let overrides = DirectoryOverride::parse(r#"{"version": "1"}"#, Path::new("x")).unwrap();
        assert_eq!(overrides, DirectoryOverride::default());
    }

    #[test]
    fn test_invalid_override_ccsid() {
        let err = DirectoryOverride::parse(r#"{"build": {"tgtCcsid": 0}}"#, Path::new("x")).unwrap_err();
        assert!(matches!(err, BuildError::Config { .. }));
    }
}
