//! Test utilities for makei unit tests.
//!
//! Provides temporary project trees and a scripted stand-in for make, so
//! planning and execution can be exercised without an IBM i system.
//!
//! # Example
//!
//! ```rust,ignore
//! use makei::test_support::{sample_project, FakeMake};
//!
//! #[test]
//! fn test_example() {
//!     let tree = sample_project();
//!     let make = FakeMake::new(tree.root()).prints("HELLO.PGM was created successfully!");
//!     // Point BuildOptions::make at make.path()...
//! }
//! ```

pub mod fixtures;

use std::fs;
use std::path::{Path, PathBuf};

pub use fixtures::*;

/// A shell script that mimics make's output and exit status.
///
/// The script also records its arguments, one per line, in `args.txt` next
/// to itself so tests can inspect the command line.
#[derive(Debug, Clone)]
pub struct FakeMake {
    dir: PathBuf,
    lines: Vec<String>,
    exit_code: i32,
}

impl FakeMake {
    pub fn new(dir: &Path) -> Self {
        FakeMake {
            dir: dir.join(".fake-make"),
            lines: Vec::new(),
            exit_code: 0,
        }
    }

    /// Add a line the script prints on stdout.
    pub fn prints(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn exits_with(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Write the script and return its path.
    #[cfg(unix)]
    pub fn install(&self) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        fs::create_dir_all(&self.dir).unwrap();
        let args_file = self.args_file();
        let mut script = String::from("#!/bin/sh\n");
        script.push_str(&format!(
            "for a in \"$@\"; do printf '%s\\n' \"$a\"; done > '{}'\n",
            args_file.display()
        ));
        for line in &self.lines {
            script.push_str(&format!("printf '%s\\n' '{}'\n", line.replace('\'', r"'\''")));
        }
        script.push_str(&format!("exit {}\n", self.exit_code));

        let path = self.dir.join("make");
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    pub fn args_file(&self) -> PathBuf {
        self.dir.join("args.txt")
    }

    /// Arguments recorded by the last run, or empty if it never ran.
    pub fn recorded_args(&self) -> Vec<String> {
        fs::read_to_string(self.args_file())
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
