//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

/// Remove a file, if it exists. Returns whether a file was removed.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("failed to remove file: {}", path.display())),
    }
}

/// Canonicalize a path, but don't fail if it doesn't exist yet.
/// Returns the path as-is if canonicalization fails.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Lexically remove `.` components and fold `..` into their parent.
///
/// Unlike `canonicalize`, this never touches the filesystem, so it works for
/// source names that are only keys.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Number of normal components in a path, used to order directories top-down.
pub fn depth(path: &Path) -> usize {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_remove_file_if_exists() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("output.log");
        fs::write(&file, "old").unwrap();

        assert!(remove_file_if_exists(&file).unwrap());
        assert!(!file.exists());
        assert!(!remove_file_if_exists(&file).unwrap());
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(Path::new("./a/b/../c.rpgle")), PathBuf::from("a/c.rpgle"));
        assert_eq!(clean_path(Path::new("../x")), PathBuf::from("../x"));
        assert_eq!(clean_path(Path::new("/src/./q/")), PathBuf::from("/src/q"));
    }

    #[test]
    fn test_depth() {
        assert_eq!(depth(Path::new("/src")), 1);
        assert_eq!(depth(Path::new("/src/a/b")), 3);
        assert!(depth(Path::new("/src/a")) < depth(Path::new("/src/a/b")));
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/src"), Path::new("/src/QRPGLESRC/a.rpgle")),
            PathBuf::from("QRPGLESRC/a.rpgle")
        );
    }
}
