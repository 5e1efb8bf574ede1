//! `iproj.json` project descriptor parsing and schema.
//!
//! The project descriptor lives at the root of the source tree and supplies
//! the defaults every directory inherits: object library, target CCSID,
//! library list entries, and include path.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::BuildError;

/// Project descriptor file name.
pub const PROJECT_FILE: &str = "iproj.json";

/// Sentinel include path entry meaning "no include directories".
pub const NO_INCLUDES: &str = "*NONE";

/// Target CCSID used when `tgtCcsid` is omitted (EBCDIC US/Canada).
pub const DEFAULT_TGT_CCSID: u32 = 37;

/// A CCSID as written in JSON: either a number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawCcsid {
    Number(i64),
    Text(String),
}

impl RawCcsid {
    /// Validate as a positive integer code page id.
    pub(crate) fn validate(&self, path: &Path) -> Result<u32, BuildError> {
        let value = match self {
            RawCcsid::Number(n) => *n,
            RawCcsid::Text(s) => s.trim().parse::<i64>().map_err(|_| {
                BuildError::config(path, format!("tgtCcsid `{}` is not an integer", s))
            })?,
        };

        if value < 1 || value > i64::from(u32::MAX) {
            return Err(BuildError::config(
                path,
                format!("tgtCcsid must be a positive integer, got {}", value),
            ));
        }
        Ok(value as u32)
    }
}

/// Raw descriptor as deserialized from JSON. Unknown keys are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProject {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    license: Option<String>,
    #[serde(default)]
    repository: Option<String>,

    objlib: Option<String>,
    #[serde(default)]
    curlib: Option<String>,
    #[serde(default)]
    tgt_ccsid: Option<RawCcsid>,

    #[serde(default)]
    pre_usrlibl: Vec<String>,
    #[serde(default)]
    post_usrlibl: Vec<String>,
    #[serde(default)]
    include_path: Vec<String>,
    #[serde(default, rename = "setIBMiEnvCmd")]
    set_ibmi_env_cmd: Vec<String>,
}

/// The parsed and validated `iproj.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDescriptor {
    pub description: Option<String>,
    pub version: Option<String>,
    pub license: Option<String>,
    pub repository: Option<String>,

    /// Default object library
    pub objlib: String,

    /// Current library, defaults to `objlib`
    pub curlib: String,

    /// Default target CCSID
    pub tgt_ccsid: u32,

    /// Libraries placed before the user portion of the library list
    pub pre_usrlibl: Vec<String>,

    /// Libraries placed after the user portion of the library list
    pub post_usrlibl: Vec<String>,

    /// Include search path, relative to the project root or absolute
    pub include_path: Vec<String>,

    /// Commands run to set up the IBM i job environment
    pub set_ibmi_env_cmd: Vec<String>,
}

impl ProjectDescriptor {
    /// Load the descriptor from a file.
    pub fn from_file(path: &Path) -> Result<Self, BuildError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            BuildError::config(path, format!("could not read project descriptor: {}", e))
        })?;
        Self::parse(&contents, path)
    }

    /// Parse descriptor text. `path` is only used for error reporting.
    pub fn parse(contents: &str, path: &Path) -> Result<Self, BuildError> {
        let raw: RawProject = serde_json::from_str(contents)
            .map_err(|e| BuildError::config(path, format!("malformed JSON: {}", e)))?;

        let objlib = match raw.objlib {
            Some(lib) if !lib.trim().is_empty() => lib.trim().to_string(),
            Some(_) => return Err(BuildError::config(path, "`objlib` must not be empty")),
            None => return Err(BuildError::config(path, "missing required field `objlib`")),
        };

        let tgt_ccsid = match raw.tgt_ccsid {
            Some(ref ccsid) => ccsid.validate(path)?,
            None => DEFAULT_TGT_CCSID,
        };

        let curlib = raw
            .curlib
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| objlib.clone());

        Ok(ProjectDescriptor {
            description: raw.description,
            version: raw.version,
            license: raw.license,
            repository: raw.repository,
            objlib,
            curlib,
            tgt_ccsid,
            pre_usrlibl: raw.pre_usrlibl,
            post_usrlibl: raw.post_usrlibl,
            include_path: raw.include_path,
            set_ibmi_env_cmd: raw.set_ibmi_env_cmd,
        })
    }

    /// Whether the include path means "no include directories".
    pub fn has_no_includes(&self) -> bool {
        self.include_path.is_empty()
            || (self.include_path.len() == 1
                && self.include_path[0].eq_ignore_ascii_case(NO_INCLUDES))
    }

    /// Include directories resolved against the project root.
    pub fn include_dirs(&self, root: &Path) -> Vec<PathBuf> {
        if self.has_no_includes() {
            return Vec::new();
        }
        self.include_path.iter().map(|p| root.join(p)).collect()
    }
}
