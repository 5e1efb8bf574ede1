//! Build variable file and executor-ready descriptor copies.
//!
//! The variable file is read line by line by Bob's entry makefile, so its
//! layout is a fixed contract: change it only together with Bob.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::builder::artifacts::TempArtifacts;
use crate::builder::resolve::ResolvedDirs;
use crate::core::{
    BuildError, Prerequisite, ProjectDescriptor, ResolvedSettings, RulesMk, NO_INCLUDES,
    RULES_BUILD_FILE,
};
use crate::util::fs::normalize_path;

const BUILD_VARS_HEADER: &str = "# This file is generated by makei, DO NOT EDIT.\n\
                                 # Modify .ibmi.json to override values\n";

const RULES_BUILD_HEADER: &str = "# This file is generated by makei, DO NOT EDIT.\n\
                                  # Modify Rules.mk or .ibmi.json to override values\n";

/// `objlib` as an IFS path, e.g. `/QSYS.LIB/MYLIB.LIB`.
pub fn objlib_to_path(objlib: &str) -> Result<String, BuildError> {
    if objlib.trim().is_empty() {
        return Err(BuildError::config(objlib, "object library name is empty"));
    }
    Ok(format!("/QSYS.LIB/{}.LIB", objlib.trim()))
}

/// The include path rendered for CL `INCDIR` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncDir {
    /// `'A' 'B'` or `*NONE`
    pub quoted: String,
    /// `A B`
    pub unquoted: String,
    /// `quoted` with every `'` doubled, for embedding in a quoted CL string
    pub double_quoted: String,
}

impl IncDir {
    pub fn render(include_path: &[String]) -> Self {
        let none = include_path.is_empty()
            || (include_path.len() == 1 && include_path[0].eq_ignore_ascii_case(NO_INCLUDES));

        let quoted = if none {
            NO_INCLUDES.to_string()
        } else {
            include_path
                .iter()
                .map(|p| format!("'{}'", p))
                .collect::<Vec<_>>()
                .join(" ")
        };

        IncDir {
            double_quoted: quoted.replace('\'', "''"),
            unquoted: include_path.join(" "),
            quoted,
        }
    }
}

/// Inputs of the build variable file.
#[derive(Debug, Clone, Copy)]
pub struct BuildVars<'a> {
    pub project: &'a ProjectDescriptor,
    pub resolved: &'a ResolvedDirs,
    /// Whether Bob should colorize its own messages
    pub color: bool,
}

impl<'a> BuildVars<'a> {
    pub fn new(project: &'a ProjectDescriptor, resolved: &'a ResolvedDirs, color: bool) -> Self {
        BuildVars {
            project,
            resolved,
            color,
        }
    }

    /// Render the variable file text.
    pub fn render(&self) -> Result<String, BuildError> {
        let project = self.project;
        let incdir = IncDir::render(&project.include_path);
        let mut out = String::from(BUILD_VARS_HEADER);

        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "\ncurlib := {}\n\
             preUsrlibl := {}\n\
             postUsrlibl := {}\n\
             INCDIR := {}\n\
             unquotedINCDIR := {}\n\
             doublequotedINCDIR := {}\n\
             IBMiEnvCmd := {}\n\
             COLOR_TTY := {}\n\n",
            project.curlib,
            project.pre_usrlibl.join(" "),
            project.post_usrlibl.join(" "),
            incdir.quoted,
            incdir.unquoted,
            incdir.double_quoted,
            project.set_ibmi_env_cmd.join("\\n"),
            self.color,
        );

        for (dir, settings) in self.resolved.iter() {
            write_dir_settings(&mut out, dir, settings)?;
        }

        Ok(out)
    }
}

fn write_dir_settings(
    out: &mut String,
    dir: &Path,
    settings: &ResolvedSettings,
) -> Result<(), BuildError> {
    let _ = writeln!(out, "TGTCCSID_{} := {}", dir.display(), settings.tgt_ccsid);
    let _ = writeln!(
        out,
        "OBJPATH_{} := {}",
        dir.display(),
        objlib_to_path(&settings.objlib)?
    );
    Ok(())
}

/// Render the executor-ready copy of one `Rules.mk`.
///
/// Prerequisites naming files are resolved to absolute paths: first against
/// the descriptor's own directory, then against each include directory.
pub fn render_rules_build(
    rules: &RulesMk,
    settings: &ResolvedSettings,
    include_dirs: &[PathBuf],
) -> Result<String, BuildError> {
    let dir = &rules.containing_dir;
    let mut out = String::from(RULES_BUILD_HEADER);
    out.push('\n');

    let _ = writeln!(out, "d := {}", dir.display());
    write_dir_settings(&mut out, dir, settings)?;
    let _ = writeln!(out, "SUBDIRS := {}", rules.subdirs.join(" "));

    // Targets grouped by object type, in first-seen order.
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for rule in &rules.rules {
        let Some(object_type) = rule.object_type() else {
            continue;
        };
        match groups.iter_mut().find(|(t, _)| *t == object_type) {
            Some((_, targets)) => targets.push(rule.target.as_str()),
            None => groups.push((object_type, vec![rule.target.as_str()])),
        }
    }
    if !groups.is_empty() {
        out.push('\n');
    }
    for (object_type, targets) in &groups {
        let _ = writeln!(out, "{}s := {}", object_type, targets.join(" "));
    }

    for rule in &rules.rules {
        let sources: Vec<String> = rule
            .sources()
            .map(|s| resolve_prerequisite(dir, s, include_dirs))
            .collect();
        let deps: Vec<String> = rule
            .prerequisites
            .iter()
            .map(|p| match p {
                Prerequisite::Source(name) | Prerequisite::Include(name) => {
                    resolve_prerequisite(dir, name, include_dirs)
                }
                Prerequisite::Object(name) | Prerequisite::Variable(name) => name.clone(),
            })
            .collect();

        out.push('\n');
        let _ = writeln!(out, "{}_SRC := {}", rule.target, sources.join(" "));
        let _ = writeln!(out, "{}_DEP := {}", rule.target, deps.join(" "));
        let _ = writeln!(out, "{}_d := {}", rule.target, dir.display());
        if !rule.recipe.is_empty() {
            let _ = writeln!(out, "define {}_RECIPE", rule.target);
            for line in &rule.recipe {
                let _ = writeln!(out, "\t{}", line);
            }
            let _ = writeln!(out, "endef");
        }
    }

    if !rules.target_vars.is_empty() || !rules.passthrough.is_empty() {
        out.push('\n');
    }
    for line in rules.target_vars.iter().chain(&rules.passthrough) {
        let _ = writeln!(out, "{}", line);
    }

    Ok(out)
}

fn resolve_prerequisite(dir: &Path, name: &str, include_dirs: &[PathBuf]) -> String {
    let local = dir.join(name);
    if local.exists() {
        return normalize_path(&local).display().to_string();
    }
    include_dirs
        .iter()
        .map(|inc| inc.join(name))
        .find(|candidate| candidate.exists())
        .map(|found| normalize_path(&found).display().to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Write the variable file and the executor-ready copies.
///
/// Every written path is handed to `artifacts` before writing. Returns the
/// path of the variable file.
pub fn emit(
    vars: &BuildVars<'_>,
    descriptors: &[RulesMk],
    root: &Path,
    artifacts: &mut TempArtifacts,
) -> Result<PathBuf, BuildError> {
    let text = vars.render()?;
    let include_dirs = vars.project.include_dirs(root);

    let temp_dir = std::env::temp_dir();
    let vars_file = tempfile::Builder::new()
        .prefix("makei-buildvars-")
        .suffix(".mk")
        .tempfile()
        .map_err(|e| BuildError::io(&temp_dir, e))?
        .into_temp_path();
    let vars_path = vars_file.to_path_buf();
    artifacts.adopt(vars_file);
    std::fs::write(&vars_path, text).map_err(|e| BuildError::io(&vars_path, e))?;
    tracing::debug!("wrote build variables to {}", vars_path.display());

    for rules in descriptors {
        let settings = vars.resolved.get(&rules.containing_dir).ok_or_else(|| {
            BuildError::config(&rules.containing_dir, "directory has no resolved settings")
        })?;
        let copy = rules.containing_dir.join(RULES_BUILD_FILE);
        if copy.exists() {
            tracing::warn!(
                "overwriting {} left over from an interrupted build",
                copy.display()
            );
        }

        let contents = render_rules_build(rules, settings, &include_dirs)?;
        artifacts.track(&copy);
        std::fs::write(&copy, contents).map_err(|e| BuildError::io(&copy, e))?;
    }

    Ok(vars_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::resolve::resolve_all;
    use crate::test_support::{sample_project, ProjectTree};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_incdir_none() {
        for path in [vec![], strings(&["*NONE"]), strings(&["*none"])] {
            assert_eq!(IncDir::render(&path).quoted, "*NONE");
            assert_eq!(IncDir::render(&path).double_quoted, "*NONE");
        }
    }

    #[test]
    fn test_incdir_two_entries() {
        let incdir = IncDir::render(&strings(&["A", "B"]));
        assert_eq!(incdir.quoted, "'A' 'B'");
        assert_eq!(incdir.unquoted, "A B");
        assert_eq!(incdir.double_quoted, "''A'' ''B''");
    }

    #[test]
    fn test_incdir_embedded_quote() {
        let incdir = IncDir::render(&strings(&["it's"]));
        assert_eq!(incdir.quoted, "'it's'");
        assert_eq!(incdir.double_quoted, "''it''s''");
    }

    #[test]
    fn test_objlib_to_path() {
        assert_eq!(objlib_to_path("MYLIB").unwrap(), "/QSYS.LIB/MYLIB.LIB");
        assert!(objlib_to_path("  ").is_err());
    }

    #[test]
    fn test_render_build_vars() {
        let tree = ProjectTree::empty();
        tree.write(
            "iproj.json",
            r#"{"objlib": "APPLIB", "curlib": "CUR", "preUsrlibl": ["P1", "P2"],
                "postUsrlibl": ["Q1"], "includePath": ["inc", "QPROTOSRC"],
                "setIBMiEnvCmd": ["CMD1", "CMD2"]}"#,
        );
        tree.rules("", "");
        tree.rules("sub", "");
        tree.ibmi_json("sub", Some(1208), Some("SUBLIB"));

        let project = ProjectDescriptor::from_file(&tree.path("iproj.json")).unwrap();
        let resolved = resolve_all(tree.root(), &project).unwrap();
        let text = BuildVars::new(&project, &resolved, false).render().unwrap();

        let root = tree.root().display().to_string();
        let expected = format!(
            "# This file is generated by makei, DO NOT EDIT.\n\
             # Modify .ibmi.json to override values\n\
             \n\
             curlib := CUR\n\
             preUsrlibl := P1 P2\n\
             postUsrlibl := Q1\n\
             INCDIR := 'inc' 'QPROTOSRC'\n\
             unquotedINCDIR := inc QPROTOSRC\n\
             doublequotedINCDIR := ''inc'' ''QPROTOSRC''\n\
             IBMiEnvCmd := CMD1\\nCMD2\n\
             COLOR_TTY := false\n\
             \n\
             TGTCCSID_{root} := 37\n\
             OBJPATH_{root} := /QSYS.LIB/APPLIB.LIB\n\
             TGTCCSID_{root}/sub := 1208\n\
             OBJPATH_{root}/sub := /QSYS.LIB/SUBLIB.LIB\n"
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_rules_build() {
        let tree = sample_project();
        tree.write("QPROTOSRC/utils.rpgleinc", "");
        let dir = tree.path("QRPGLESRC");
        let rules = RulesMk::from_file(&dir.join("Rules.mk")).unwrap();
        let settings = ResolvedSettings::new(37, "APPLIB");

        let text =
            render_rules_build(&rules, &settings, &[tree.path("QPROTOSRC")]).unwrap();
        let d = dir.display();

        assert!(text.contains(&format!("d := {d}\n")));
        assert!(text.contains(&format!("TGTCCSID_{d} := 37\n")));
        assert!(text.contains(&format!("OBJPATH_{d} := /QSYS.LIB/APPLIB.LIB\n")));
        assert!(text.contains("PGMs := HELLO.PGM\n"));
        assert!(text.contains("MODULEs := UTILS.MODULE\n"));
        assert!(text.contains(&format!("HELLO.PGM_SRC := {d}/hello.pgm.rpgle\n")));
        assert!(text.contains(&format!(
            "HELLO.PGM_DEP := {d}/hello.pgm.rpgle UTILS.MODULE\n"
        )));
        let proto = tree.path("QPROTOSRC/utils.rpgleinc");
        assert!(text.contains(&format!(
            "UTILS.MODULE_DEP := {d}/utils.rpgle {}\n",
            proto.display()
        )));
    }

    #[test]
    fn test_render_custom_recipe() {
        let rules = RulesMk::parse(
            Path::new("/proj/QDDSSRC"),
            "CUSTOM.FILE: custom.pf\n\tsystem \"CRTPF X\"\n",
            Path::new("Rules.mk"),
        )
        .unwrap();
        let text = render_rules_build(&rules, &ResolvedSettings::new(37, "L"), &[]).unwrap();
        assert!(text.contains("define CUSTOM.FILE_RECIPE\n\tsystem \"CRTPF X\"\nendef\n"));
        assert!(text.contains("CUSTOM.FILE_SRC := custom.pf\n"));
    }

    #[test]
    fn test_emit_writes_and_tracks_everything() {
        let tree = sample_project();
        let project = ProjectDescriptor::from_file(&tree.path("iproj.json")).unwrap();
        let resolved = resolve_all(tree.root(), &project).unwrap();
        let descriptors: Vec<_> = resolved
            .dirs()
            .iter()
            .map(|d| RulesMk::from_file(&d.join("Rules.mk")).unwrap())
            .collect();

        let mut artifacts = TempArtifacts::new();
        let vars = BuildVars::new(&project, &resolved, true);
        let vars_path = emit(&vars, &descriptors, tree.root(), &mut artifacts).unwrap();

        assert!(vars_path.exists());
        assert!(std::fs::read_to_string(&vars_path)
            .unwrap()
            .contains("COLOR_TTY := true"));
        assert_eq!(tree.generated_copies().len(), 3);
        assert_eq!(artifacts.len(), 4);
        // Originals stay untouched.
        assert_eq!(
            std::fs::read_to_string(tree.path("QDDSSRC/Rules.mk")).unwrap(),
            "ORDERS.FILE: orders.pf\n"
        );

        drop(artifacts);
        assert!(!vars_path.exists());
        assert!(tree.generated_copies().is_empty());
    }

    #[test]
    fn test_emit_failure_cleans_partial_output() {
        let tree = sample_project();
        let project = ProjectDescriptor::from_file(&tree.path("iproj.json")).unwrap();
        let resolved = resolve_all(tree.root(), &project).unwrap();
        let mut descriptors: Vec<_> = resolved
            .dirs()
            .iter()
            .map(|d| RulesMk::from_file(&d.join("Rules.mk")).unwrap())
            .collect();
        // A descriptor whose directory was never resolved aborts emission.
        descriptors.push(RulesMk {
            containing_dir: tree.path("unknown"),
            ..RulesMk::default()
        });

        let vars_path;
        {
            let mut artifacts = TempArtifacts::new();
            let vars = BuildVars::new(&project, &resolved, false);
            let err = emit(&vars, &descriptors, tree.root(), &mut artifacts).unwrap_err();
            assert!(matches!(err, BuildError::Config { .. }));
            vars_path = artifacts.paths().next().unwrap().to_path_buf();
        }
        assert!(!vars_path.exists());
        assert!(tree.generated_copies().is_empty());
    }
}
