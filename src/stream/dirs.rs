//! Per-stream filesystem namespace.
//!
//! Every stream gets one directory under the streams root, named by its
//! stream id. The transcoder is the only writer inside those directories;
//! this module only creates and resolves paths, it never deletes anything.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::error::{Error, Result};

/// Allocates and resolves stream output directories under a fixed root.
#[derive(Debug, Clone)]
pub struct StreamDirs {
    root: PathBuf,
}

impl StreamDirs {
    /// Create the manager, creating the streams root if absent.
    pub fn new(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("failed to create streams root: {}", root.display()))?;
        Ok(Self { root })
    }

    /// The streams root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the output directory for a stream id and return its path.
    ///
    /// Safe to call with an already-existing directory; ids are 128-bit
    /// random values, so collisions between distinct streams are negligible.
    pub fn allocate(&self, stream_id: &str) -> Result<PathBuf> {
        let dir = self.root.join(stream_id);
        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::io(format!("creating stream directory {}", dir.display()), e))?;
        Ok(dir)
    }

    /// Resolve an existing stream directory.
    pub fn resolve(&self, stream_id: &str) -> Result<PathBuf> {
        let dir = self.root.join(stream_id);
        if !dir.is_dir() {
            return Err(Error::stream_not_found(stream_id));
        }
        Ok(dir)
    }

    /// Resolve a file inside a stream directory, for the file-serving layer.
    ///
    /// Fails with not-found when the directory or the file is absent; a file
    /// the transcoder has not produced yet looks the same as one that never
    /// will, and callers are expected to retry. File names must be plain
    /// names, never paths.
    pub fn resolve_file(&self, stream_id: &str, filename: &str) -> Result<PathBuf> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return Err(Error::InvalidRequest(format!(
                "invalid file name: {filename}"
            )));
        }

        let path = self.resolve(stream_id)?.join(filename);
        if !path.is_file() {
            return Err(Error::FileNotFound {
                filename: filename.to_string(),
            });
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_created_on_construction() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("streams");
        assert!(!root.exists());

        let dirs = StreamDirs::new(&root).unwrap();
        assert!(dirs.root().is_dir());
    }

    #[test]
    fn test_allocate_and_resolve() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = StreamDirs::new(tmp.path()).unwrap();

        let dir = dirs.allocate("abc-123").unwrap();
        assert!(dir.is_dir());
        assert_eq!(dirs.resolve("abc-123").unwrap(), dir);

        // Idempotent for the same id
        assert_eq!(dirs.allocate("abc-123").unwrap(), dir);
    }

    #[test]
    fn test_resolve_unknown_stream() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = StreamDirs::new(tmp.path()).unwrap();

        let err = dirs.resolve("never-allocated").unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_resolve_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = StreamDirs::new(tmp.path()).unwrap();
        let dir = dirs.allocate("s1").unwrap();

        // Not produced yet
        let err = dirs.resolve_file("s1", "index.m3u8").unwrap_err();
        assert_eq!(err.status_code(), 404);

        std::fs::write(dir.join("index.m3u8"), "#EXTM3U\n").unwrap();
        let path = dirs.resolve_file("s1", "index.m3u8").unwrap();
        assert!(path.ends_with("s1/index.m3u8"));
    }

    #[test]
    fn test_resolve_file_rejects_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = StreamDirs::new(tmp.path()).unwrap();
        dirs.allocate("s1").unwrap();

        for name in ["../secret", "a/b.ts", "..", "", "a\\b.ts"] {
            let err = dirs.resolve_file("s1", name).unwrap_err();
            assert_eq!(err.status_code(), 400, "{name} should be rejected");
        }
    }
}
