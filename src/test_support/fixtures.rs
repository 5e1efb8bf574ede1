//! Source tree fixtures for common test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::{OVERRIDE_FILE, PROJECT_FILE, RULES_BUILD_FILE, RULES_FILE};

/// A temporary IBM i project tree.
pub struct ProjectTree {
    // Removed on drop.
    _tmp: TempDir,
    root: PathBuf,
}

impl ProjectTree {
    /// Create an empty tree with no project descriptor.
    pub fn empty() -> Self {
        let tmp = TempDir::new().unwrap();
        // Canonical so paths compare equal to what the planner computes.
        let root = tmp.path().canonicalize().unwrap();
        ProjectTree { _tmp: tmp, root }
    }

    /// Create a tree with a minimal `iproj.json`.
    pub fn new(objlib: &str, tgt_ccsid: u32) -> Self {
        let tree = Self::empty();
        tree.write(
            PROJECT_FILE,
            &format!(r#"{{"objlib": "{objlib}", "tgtCcsid": {tgt_ccsid}}}"#),
        );
        tree
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Write a file relative to the root, creating parent directories.
    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    /// Create a directory relative to the root.
    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Write `<dir>/Rules.mk`. Use `""` for the root.
    pub fn rules(&self, dir: &str, contents: &str) -> PathBuf {
        self.write(&join_rel(dir, RULES_FILE), contents)
    }

    /// Write `<dir>/.ibmi.json` with the given build overrides.
    pub fn ibmi_json(&self, dir: &str, tgt_ccsid: Option<u32>, objlib: Option<&str>) -> PathBuf {
        let mut build = serde_json::Map::new();
        if let Some(ccsid) = tgt_ccsid {
            build.insert("tgtCcsid".into(), ccsid.into());
        }
        if let Some(lib) = objlib {
            build.insert("objlib".into(), lib.into());
        }
        let json = serde_json::json!({ "version": "0.0.1", "build": build });
        self.write(&join_rel(dir, OVERRIDE_FILE), &json.to_string())
    }

    /// Every executor-ready descriptor copy currently on disk.
    pub fn generated_copies(&self) -> Vec<PathBuf> {
        walkdir::WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() == RULES_BUILD_FILE)
            .map(|e| e.into_path())
            .collect()
    }
}

fn join_rel(dir: &str, file: &str) -> String {
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), file)
    }
}

/// A typical two-level project: root links `QRPGLESRC` and `QDDSSRC`.
pub fn sample_project() -> ProjectTree {
    let tree = ProjectTree::new("APPLIB", 37);
    tree.rules("", "SUBDIRS := QDDSSRC QRPGLESRC\n");
    tree.rules(
        "QRPGLESRC",
        "HELLO.PGM: hello.pgm.rpgle UTILS.MODULE\n\
         UTILS.MODULE: utils.rpgle utils.rpgleinc\n",
    );
    tree.rules("QDDSSRC", "ORDERS.FILE: orders.pf\n");
    tree.write("QRPGLESRC/hello.pgm.rpgle", "**free\ndsply 'hello';\n");
    tree.write("QRPGLESRC/utils.rpgle", "**free\n");
    tree.write("QDDSSRC/orders.pf", "A          R ORDREC\n");
    tree
}
