//! Temporary files owned by one build invocation.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

/// Files created for a single build, removed when this value is dropped.
///
/// Paths are registered before they are written, so a failure halfway
/// through emission still leaves nothing behind. Release happens on normal
/// return, on `?` propagation, and during unwinding.
#[derive(Debug, Default)]
pub struct TempArtifacts {
    paths: Vec<TempPath>,
}

impl TempArtifacts {
    pub fn new() -> Self {
        TempArtifacts::default()
    }

    /// Take ownership of a path; the file need not exist yet.
    pub fn track(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(TempPath::from_path(path));
    }

    /// Take ownership of a path already managed by `tempfile`.
    pub fn adopt(&mut self, path: TempPath) {
        self.paths.push(path);
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(|p| &**p)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Remove every tracked file now. Returns how many were removed.
    pub fn release(&mut self) -> usize {
        let mut removed = 0;
        for path in self.paths.drain(..) {
            let shown = path.to_path_buf();
            match path.close() {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("failed to remove {}: {}", shown.display(), e),
            }
        }
        if removed > 0 {
            tracing::debug!("removed {} temporary file(s)", removed);
        }
        removed
    }
}

impl Drop for TempArtifacts {
    fn drop(&mut self) {
        self.release();
    }
}
