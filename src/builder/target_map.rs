//! Source-to-target mapping built by following `SUBDIRS` links.
//!
//! Discovery starts at the root `Rules.mk` and only visits descriptors that
//! are reachable through `SUBDIRS`. The variable resolution pass scans the
//! whole tree instead; the two are intentionally kept separate.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::{BuildError, RulesMk, RULES_FILE};
use crate::util::fs::{clean_path, normalize_path, relative_path};

/// Prefix of the synthetic target that builds a whole directory.
pub const DIR_TARGET_PREFIX: &str = "dir_";

/// Goal used when no targets or sources are requested.
pub const DEFAULT_GOAL: &str = "all";

/// Key of a target map entry.
///
/// Source files and directories live in separate variants so a directory
/// named like a source member can never shadow it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetKey {
    /// A source member, relative to the source root
    Source(PathBuf),
    /// A directory, by base name
    Directory(String),
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKey::Source(path) => write!(f, "{}", path.display()),
            TargetKey::Directory(name) => write!(f, "{}/", name),
        }
    }
}

/// Mapping from sources and directories to the make target that builds them.
#[derive(Debug, Clone, Default)]
pub struct TargetMap {
    root: PathBuf,
    entries: BTreeMap<TargetKey, String>,
    visited: Vec<PathBuf>,
}

impl TargetMap {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&self, key: &TargetKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Target building `source`, given relative to the root or as an absolute path.
    pub fn target_for_source(&self, source: &Path) -> Option<&str> {
        let rel = if source.is_absolute() {
            let source = normalize_path(source);
            source.strip_prefix(&self.root).ok()?.to_path_buf()
        } else {
            source.to_path_buf()
        };
        self.get(&TargetKey::Source(clean_path(&rel)))
    }

    /// Target building everything under the directory with this base name.
    pub fn target_for_dir(&self, name: &str) -> Option<&str> {
        self.get(&TargetKey::Directory(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TargetKey, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// All mapped source paths, for error messages.
    pub fn sources(&self) -> Vec<String> {
        self.entries
            .keys()
            .filter_map(|k| match k {
                TargetKey::Source(p) => Some(p.display().to_string()),
                TargetKey::Directory(_) => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptors processed, in traversal order.
    pub fn visited(&self) -> &[PathBuf] {
        &self.visited
    }

    fn insert(&mut self, key: TargetKey, target: String) {
        if let Some(previous) = self.entries.get(&key) {
            if *previous != target {
                tracing::warn!(
                    "`{}` is mapped to both `{}` and `{}`; using `{}`",
                    key,
                    previous,
                    target,
                    target
                );
            }
        }
        self.entries.insert(key, target);
    }
}

/// Build the target map by walking `SUBDIRS` links from `root/Rules.mk`.
///
/// The worklist is ordered lexicographically by path so that duplicate
/// mappings resolve the same way on every run (the later path wins). Each
/// descriptor is processed once, keyed by its canonical path, so cyclic
/// `SUBDIRS` entries terminate.
pub fn build_target_map(root: &Path) -> Result<TargetMap, BuildError> {
    let root = normalize_path(root);
    let mut map = TargetMap {
        root: root.clone(),
        ..TargetMap::default()
    };

    let mut worklist = BTreeSet::from([root.join(RULES_FILE)]);
    let mut seen: HashSet<PathBuf> = HashSet::new();

    while let Some(path) = worklist.pop_first() {
        if !path.is_file() {
            tracing::debug!("no {} at {}, skipping", RULES_FILE, path.display());
            continue;
        }

        let descriptor = normalize_path(&path);
        if !seen.insert(descriptor.clone()) {
            tracing::debug!("already visited {}", descriptor.display());
            continue;
        }

        let rules = RulesMk::from_file(&descriptor)?;
        let dir = rules.containing_dir.clone();
        let rel_dir = relative_path(&root, &dir);

        for (target, sources) in rules.targets() {
            for src in sources {
                let key = TargetKey::Source(clean_path(&rel_dir.join(src)));
                map.insert(key, target.to_string());
            }
        }

        let dir_name = rules.dir_name();
        map.insert(
            TargetKey::Directory(dir_name.clone()),
            format!("{}{}", DIR_TARGET_PREFIX, dir_name),
        );

        for subdir in &rules.subdirs {
            let subdir_path = dir.join(subdir);
            if !subdir_path.is_dir() {
                return Err(BuildError::DanglingReference {
                    descriptor: descriptor.clone(),
                    subdir: subdir.clone(),
                });
            }
            worklist.insert(subdir_path.join(RULES_FILE));
        }

        tracing::debug!(
            "mapped {} target(s) from {}",
            rules.rules.len(),
            descriptor.display()
        );
        map.visited.push(descriptor);
    }

    Ok(map)
}

/// Decide the make goals for a build.
///
/// Explicit targets win; otherwise each requested source is translated
/// through the map; otherwise the default goal is built.
pub fn resolve_targets(
    map: &TargetMap,
    targets: &[String],
    sources: &[PathBuf],
) -> Result<Vec<String>, BuildError> {
    if !targets.is_empty() {
        return Ok(targets.to_vec());
    }

    if sources.is_empty() {
        return Ok(vec![DEFAULT_GOAL.to_string()]);
    }

    sources
        .iter()
        .map(|src| {
            map.target_for_source(src)
                .map(str::to_string)
                .ok_or_else(|| BuildError::UnknownTarget {
                    source_file: src.clone(),
                    known: map.sources(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_project, ProjectTree};

    #[test]
    fn test_sample_project_map() {
        let tree = sample_project();
        let map = build_target_map(tree.root()).unwrap();

        assert_eq!(
            map.target_for_source(Path::new("QRPGLESRC/hello.pgm.rpgle")),
            Some("HELLO.PGM")
        );
        assert_eq!(
            map.target_for_source(Path::new("QRPGLESRC/utils.rpgle")),
            Some("UTILS.MODULE")
        );
        assert_eq!(map.target_for_source(Path::new("QDDSSRC/orders.pf")), Some("ORDERS.FILE"));
        // Include members are dependencies, not buildable sources.
        assert_eq!(map.target_for_source(Path::new("QRPGLESRC/utils.rpgleinc")), None);

        assert_eq!(map.target_for_dir("QRPGLESRC"), Some("dir_QRPGLESRC"));
        assert_eq!(map.target_for_dir("QDDSSRC"), Some("dir_QDDSSRC"));
        assert_eq!(map.visited().len(), 3);
    }

    #[test]
    fn test_absolute_source_lookup() {
        let tree = sample_project();
        let map = build_target_map(tree.root()).unwrap();
        let abs = tree.path("QRPGLESRC/hello.pgm.rpgle");
        assert_eq!(map.target_for_source(&abs), Some("HELLO.PGM"));
    }

    #[test]
    fn test_directory_keys_do_not_collide_with_sources() {
        let tree = ProjectTree::new("LIB", 37);
        tree.rules("", "SUBDIRS := util\nUTIL.MODULE: util\n");
        tree.rules("util", "X.PGM: x.rpgle\n");

        let map = build_target_map(tree.root()).unwrap();
        assert_eq!(map.target_for_source(Path::new("util")), Some("UTIL.MODULE"));
        assert_eq!(map.target_for_dir("util"), Some("dir_util"));
    }

    #[test]
    fn test_cycle_visits_each_descriptor_once() {
        let tree = ProjectTree::new("LIB", 37);
        tree.rules("", "SUBDIRS := a\nROOT.PGM: root.rpgle\n");
        tree.rules("a", "SUBDIRS := b ..\nA.PGM: a.rpgle\n");
        tree.rules("a/b", "SUBDIRS := ../../a\nB.PGM: b.rpgle\n");

        let map = build_target_map(tree.root()).unwrap();
        assert_eq!(map.visited().len(), 3);
        assert_eq!(map.target_for_source(Path::new("root.rpgle")), Some("ROOT.PGM"));
        assert_eq!(map.target_for_source(Path::new("a/a.rpgle")), Some("A.PGM"));
        assert_eq!(map.target_for_source(Path::new("a/b/b.rpgle")), Some("B.PGM"));
    }

    #[test]
    fn test_missing_subdir_descriptor_is_skipped() {
        let tree = ProjectTree::new("LIB", 37);
        tree.rules("", "SUBDIRS := empty\nROOT.PGM: root.rpgle\n");
        tree.mkdir("empty");

        let map = build_target_map(tree.root()).unwrap();
        assert_eq!(map.visited().len(), 1);
        assert_eq!(map.target_for_dir("empty"), None);
    }

    #[test]
    fn test_dangling_subdir_is_an_error() {
        let tree = ProjectTree::new("LIB", 37);
        tree.rules("", "SUBDIRS := QSQLSRC\n");

        let err = build_target_map(tree.root()).unwrap_err();
        match err {
            BuildError::DanglingReference { subdir, .. } => assert_eq!(subdir, "QSQLSRC"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_sources_last_path_wins() {
        let tree = ProjectTree::new("LIB", 37);
        tree.rules("", "SUBDIRS := a b\n");
        tree.rules("a", "FIRST.MODULE: ../shared/s.rpgle\n");
        tree.rules("b", "SECOND.MODULE: ../shared/s.rpgle\n");

        for _ in 0..3 {
            let map = build_target_map(tree.root()).unwrap();
            assert_eq!(
                map.target_for_source(Path::new("shared/s.rpgle")),
                Some("SECOND.MODULE")
            );
        }
    }

    #[test]
    fn test_unlinked_descriptors_are_not_mapped() {
        let tree = ProjectTree::new("LIB", 37);
        tree.rules("", "ROOT.PGM: root.rpgle\n");
        tree.rules("orphan", "ORPHAN.PGM: orphan.rpgle\n");

        let map = build_target_map(tree.root()).unwrap();
        assert_eq!(map.target_for_source(Path::new("orphan/orphan.rpgle")), None);
    }

    #[test]
    fn test_no_root_descriptor_gives_empty_map() {
        let tree = ProjectTree::new("LIB", 37);
        let map = build_target_map(tree.root()).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_resolve_targets() {
        let tree = sample_project();
        let map = build_target_map(tree.root()).unwrap();

        assert_eq!(resolve_targets(&map, &[], &[]).unwrap(), vec!["all"]);
        assert_eq!(
            resolve_targets(&map, &["ORDERS.FILE".to_string()], &[PathBuf::from("x")]).unwrap(),
            vec!["ORDERS.FILE"]
        );
        assert_eq!(
            resolve_targets(
                &map,
                &[],
                &[
                    PathBuf::from("QRPGLESRC/hello.pgm.rpgle"),
                    PathBuf::from("QDDSSRC/orders.pf")
                ]
            )
            .unwrap(),
            vec!["HELLO.PGM", "ORDERS.FILE"]
        );

        let err = resolve_targets(&map, &[], &[PathBuf::from("QRPGLESRC/missing.rpgle")])
            .unwrap_err();
        assert!(matches!(err, BuildError::UnknownTarget { .. }));
    }
}
