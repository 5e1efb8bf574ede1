//! Per-directory settings resolution.
//!
//! Every directory that contains a `Rules.mk` anywhere under the root gets
//! one `ResolvedSettings`, computed from its ancestor chain: the root takes
//! the project defaults and each child overlays its own `.ibmi.json` onto its
//! parent's result.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::core::{
    load_directory_override, BuildError, ProjectDescriptor, ResolvedSettings, OVERRIDE_FILE,
    RULES_FILE,
};
use crate::util::fs::{depth, normalize_path};

/// Resolved settings for every descriptor directory, in top-down order.
#[derive(Debug, Clone, Default)]
pub struct ResolvedDirs {
    order: Vec<PathBuf>,
    settings: HashMap<PathBuf, ResolvedSettings>,
}

impl ResolvedDirs {
    pub fn get(&self, dir: &Path) -> Option<&ResolvedSettings> {
        self.settings.get(dir)
    }

    /// Directories and their settings, parents before children.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &ResolvedSettings)> {
        self.order
            .iter()
            .map(move |dir| (dir.as_path(), &self.settings[dir]))
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Find every directory under `root` holding a `Rules.mk`.
///
/// Version control and tool state directories are not descended into; other
/// dot-directories are scanned like any source directory. The result is
/// sorted by depth, then by path.
pub fn discover_descriptor_dirs(root: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let root = normalize_path(root);
    let mut dirs = Vec::new();

    let walker = WalkDir::new(&root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e));

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
            BuildError::io(path, e.into())
        })?;

        if entry.file_type().is_file() && entry.file_name() == RULES_FILE {
            if let Some(parent) = entry.path().parent() {
                dirs.push(parent.to_path_buf());
            }
        }
    }

    dirs.sort_by(|a, b| depth(a).cmp(&depth(b)).then_with(|| a.cmp(b)));
    Ok(dirs)
}

/// Directories never holding build descriptors.
const SKIPPED_DIRS: &[&str] = &[".git", ".logs", ".makei"];

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && SKIPPED_DIRS
            .iter()
            .any(|name| entry.file_name() == std::ffi::OsStr::new(name))
}

/// Resolve settings for every descriptor directory under `root`.
pub fn resolve_all(root: &Path, project: &ProjectDescriptor) -> Result<ResolvedDirs, BuildError> {
    let root = normalize_path(root);
    let dirs = discover_descriptor_dirs(&root)?;
    let mut resolver = Resolver::new(&root, ResolvedSettings::from_project(project));

    let mut resolved = ResolvedDirs::default();
    for dir in dirs {
        let settings = resolver.resolve(&dir)?;
        tracing::debug!(
            "{}: TGTCCSID={} OBJLIB={}",
            dir.display(),
            settings.tgt_ccsid,
            settings.objlib
        );
        resolved.settings.insert(dir.clone(), settings);
        resolved.order.push(dir);
    }

    Ok(resolved)
}

/// Memoized walk down the ancestor chain.
///
/// Intermediate directories without a `Rules.mk` are resolved too, so an
/// `.ibmi.json` placed there still reaches the descriptors below it.
struct Resolver<'a> {
    root: &'a Path,
    cache: HashMap<PathBuf, ResolvedSettings>,
}

impl<'a> Resolver<'a> {
    fn new(root: &'a Path, defaults: ResolvedSettings) -> Self {
        let mut cache = HashMap::new();
        cache.insert(root.to_path_buf(), defaults);
        Resolver { root, cache }
    }

    fn resolve(&mut self, dir: &Path) -> Result<ResolvedSettings, BuildError> {
        if !dir.starts_with(self.root) {
            return Err(BuildError::config(
                dir,
                format!("directory is outside the project root {}", self.root.display()),
            ));
        }

        // Collect unresolved ancestors, nearest first.
        let mut pending = Vec::new();
        let mut current = dir;
        while !self.cache.contains_key(current) {
            pending.push(current.to_path_buf());
            current = match current.parent() {
                Some(parent) => parent,
                None => break,
            };
        }

        for path in pending.into_iter().rev() {
            let parent = path
                .parent()
                .and_then(|p| self.cache.get(p))
                .cloned()
                .ok_or_else(|| BuildError::config(&path, "no parent settings to inherit"))?;
            let settings = load_directory_override(&path.join(OVERRIDE_FILE), &parent)?;
            self.cache.insert(path, settings);
        }

        Ok(self.cache[dir].clone())
    }
}
