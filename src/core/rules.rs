//! `Rules.mk` build descriptor parsing.
//!
//! A `Rules.mk` is a restricted makefile. Only the parts the planner needs are
//! interpreted: `SUBDIRS`, rules with their prerequisites and recipes, and
//! target-specific variables. Everything else is carried through verbatim.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::core::errors::BuildError;

/// Build descriptor file name.
pub const RULES_FILE: &str = "Rules.mk";

/// Executor-ready copy written beside each descriptor during a build.
pub const RULES_BUILD_FILE: &str = ".Rules.mk.build";

/// IBM i object types a rule target (or object prerequisite) may carry.
pub const OBJECT_TYPES: &[&str] = &[
    "PGM", "MODULE", "SRVPGM", "FILE", "DTAARA", "DTAQ", "CMD", "MENU", "PNLGRP", "BNDDIR",
    "MSGF", "WSCST", "TRG", "TABLE", "VIEW", "INDEX", "SYSTRG", "SQLUDF", "SQLUDT", "SQLSEQ",
    "SQLPRC", "SQLALIAS", "SQLVAR", "SQLMASK", "SQLPERM",
];

/// Extensions of members that are included by other sources, never compiled alone.
const INCLUDE_EXTENSIONS: &[&str] = &[
    "rpgleinc", "sqlrpgleinc", "clleinc", "cblinc", "h", "hpp", "inc", "cpy",
];

static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_.\-]*)\s*(::=|:=|\+=|\?=|=)\s*(.*)$").unwrap()
});

static RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:=\s][^:=]*?)\s*::?(.*)$").unwrap());

/// A prerequisite of a rule, classified by what it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prerequisite {
    /// Another build target, e.g. `UTILS.MODULE`
    Object(String),
    /// A source member compiled by this rule
    Source(String),
    /// A member pulled in by a source (copybook, header)
    Include(String),
    /// An unexpanded make reference such as `$(d)/x.rpgle`
    Variable(String),
}

impl Prerequisite {
    pub fn classify(name: &str) -> Self {
        if name.contains("$(") || name.contains("${") {
            return Prerequisite::Variable(name.to_string());
        }
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && OBJECT_TYPES.contains(&ext) => {
                Prerequisite::Object(name.to_string())
            }
            Some((_, ext)) if INCLUDE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) => {
                Prerequisite::Include(name.to_string())
            }
            _ => Prerequisite::Source(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Prerequisite::Object(n)
            | Prerequisite::Source(n)
            | Prerequisite::Include(n)
            | Prerequisite::Variable(n) => n,
        }
    }
}

/// One `TARGET: prerequisites` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub target: String,
    pub prerequisites: Vec<Prerequisite>,
    /// Recipe lines without their leading tab
    pub recipe: Vec<String>,
}

impl Rule {
    /// Object type suffix of the target (`PGM` for `HELLO.PGM`).
    pub fn object_type(&self) -> Option<&str> {
        self.target
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| OBJECT_TYPES.contains(ext))
    }

    /// Source members compiled by this rule.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.prerequisites.iter().filter_map(|p| match p {
            Prerequisite::Source(s) => Some(s.as_str()),
            _ => None,
        })
    }
}

/// A parsed `Rules.mk`.
#[derive(Debug, Clone, Default)]
pub struct RulesMk {
    /// Directory holding the descriptor
    pub containing_dir: PathBuf,
    /// Directories listed in `SUBDIRS`, relative to `containing_dir`
    pub subdirs: Vec<String>,
    pub rules: Vec<Rule>,
    /// Target-specific variable lines, e.g. `HELLO.PGM: TGTRLS := V7R4M0`
    pub target_vars: Vec<String>,
    /// Lines carried into the executor-ready copy unchanged
    pub passthrough: Vec<String>,
}

impl RulesMk {
    pub fn from_file(path: &Path) -> Result<Self, BuildError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            BuildError::config(path, format!("could not read build descriptor: {}", e))
        })?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(dir, &contents, path)
    }

    /// Parse descriptor text. `path` is only used for error reporting.
    pub fn parse(dir: &Path, contents: &str, path: &Path) -> Result<Self, BuildError> {
        let mut rules_mk = RulesMk {
            containing_dir: dir.to_path_buf(),
            ..RulesMk::default()
        };
        // Index of the rule(s) currently collecting recipe lines.
        let mut open_rules: Vec<usize> = Vec::new();

        for line in logical_lines(contents) {
            if let Some(recipe) = line.strip_prefix('\t') {
                if open_rules.is_empty() {
                    tracing::debug!("ignoring recipe line outside a rule in {}", path.display());
                }
                for &idx in &open_rules {
                    rules_mk.rules[idx].recipe.push(recipe.to_string());
                }
                continue;
            }

            let line = strip_comment(&line);
            let line = line.trim_end();
            if line.trim().is_empty() {
                continue;
            }
            open_rules.clear();

            if let Some(caps) = ASSIGNMENT.captures(line) {
                let (name, op, value) = (&caps[1], &caps[2], &caps[3]);
                if name == "SUBDIRS" {
                    if op != "+=" {
                        rules_mk.subdirs.clear();
                    }
                    rules_mk
                        .subdirs
                        .extend(value.split_whitespace().map(str::to_string));
                } else {
                    rules_mk.passthrough.push(line.to_string());
                }
                continue;
            }

            if let Some(caps) = RULE.captures(line) {
                let targets = caps[1].trim();
                let rest = caps[2].trim();

                if targets.starts_with('.') {
                    rules_mk.passthrough.push(line.to_string());
                } else if rest.contains('=') {
                    rules_mk.target_vars.push(line.to_string());
                } else {
                    let prerequisites: Vec<_> =
                        rest.split_whitespace().map(Prerequisite::classify).collect();
                    for target in targets.split_whitespace() {
                        open_rules.push(rules_mk.rules.len());
                        rules_mk.rules.push(Rule {
                            target: target.to_string(),
                            prerequisites: prerequisites.clone(),
                            recipe: Vec::new(),
                        });
                    }
                }
                continue;
            }

            rules_mk.passthrough.push(line.to_string());
        }

        rules_mk.check_unique_sources(path)?;
        Ok(rules_mk)
    }

    /// A source member may be compiled by at most one target per descriptor.
    fn check_unique_sources(&self, path: &Path) -> Result<(), BuildError> {
        let mut owners: HashMap<&str, &str> = HashMap::new();
        for rule in &self.rules {
            for src in rule.sources() {
                if let Some(previous) = owners.insert(src, rule.target.as_str()) {
                    if previous != rule.target {
                        return Err(BuildError::config(
                            path,
                            format!(
                                "source `{}` is listed by both `{}` and `{}`",
                                src, previous, rule.target
                            ),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// `(target, sources)` entries, one per rule.
    pub fn targets(&self) -> impl Iterator<Item = (&str, Vec<&str>)> {
        self.rules
            .iter()
            .map(|rule| (rule.target.as_str(), rule.sources().collect()))
    }

    /// Base name of the containing directory.
    pub fn dir_name(&self) -> String {
        self.containing_dir
            .file_name()
            .map(|n| n.to_os_string())
            .or_else(|| {
                self.containing_dir
                    .canonicalize()
                    .ok()
                    .and_then(|p| p.file_name().map(|n| n.to_os_string()))
            })
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Join backslash continuations into logical lines.
fn logical_lines(contents: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending = String::new();

    for raw in contents.lines() {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        match raw.strip_suffix('\\') {
            Some(head) => {
                pending.push_str(head);
                pending.push(' ');
            }
            None => {
                pending.push_str(raw);
                lines.push(std::mem::take(&mut pending));
            }
        }
    }
    if !pending.is_empty() {
        lines.push(pending);
    }
    lines
}

/// Drop a `#` comment that starts a line or follows whitespace.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'#' && (i == 0 || bytes[i - 1].is_ascii_whitespace()) {
            return &line[..i];
        }
    }
    line
}
