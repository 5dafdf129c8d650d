//! Context root resolution.
//!
//! A context is the directory that owns one active loop slot. Resolution is
//! kept behind a trait so storage never decides on its own where to live.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Result;

/// Default name of the per-project harness directory
pub const DEFAULT_CONTEXT_DIR: &str = ".long-task-harness";

/// Picks the directory a loop store lives in.
pub trait ContextResolver {
    fn resolve(&self) -> Result<PathBuf>;
}

/// Finds the nearest `dir_name` directory at or above `start`.
///
/// Falls back to creating `start/dir_name` when no ancestor has one.
#[derive(Debug, Clone)]
pub struct WalkUpResolver {
    start: PathBuf,
    dir_name: String,
}

impl WalkUpResolver {
    pub fn new(start: impl Into<PathBuf>, dir_name: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            dir_name: dir_name.into(),
        }
    }

    /// Walk up from the current working directory.
    pub fn from_cwd(dir_name: impl Into<String>) -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?, dir_name))
    }
}

impl ContextResolver for WalkUpResolver {
    fn resolve(&self) -> Result<PathBuf> {
        if let Some(found) = self
            .start
            .ancestors()
            .map(|dir| dir.join(&self.dir_name))
            .find(|candidate| candidate.is_dir())
        {
            debug!("Using context directory {}", found.display());
            return Ok(found);
        }

        let created = self.start.join(&self.dir_name);
        fs::create_dir_all(&created)?;
        debug!("Created context directory {}", created.display());
        Ok(created)
    }
}

/// Always resolves to one fixed directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct FixedResolver(PathBuf);

impl FixedResolver {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self(dir.as_ref().to_path_buf())
    }
}

impl ContextResolver for FixedResolver {
    fn resolve(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.0)?;
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_finds_context_in_start_dir() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(DEFAULT_CONTEXT_DIR)).unwrap();

        let resolved = WalkUpResolver::new(temp.path(), DEFAULT_CONTEXT_DIR).resolve().unwrap();
        assert_eq!(resolved, temp.path().join(DEFAULT_CONTEXT_DIR));
    }

    #[test]
    fn test_finds_context_in_ancestor() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(DEFAULT_CONTEXT_DIR)).unwrap();
        let nested = temp.path().join("crates").join("core").join("src");
        fs::create_dir_all(&nested).unwrap();

        let resolved = WalkUpResolver::new(&nested, DEFAULT_CONTEXT_DIR).resolve().unwrap();
        assert_eq!(resolved, temp.path().join(DEFAULT_CONTEXT_DIR));
        assert!(!nested.join(DEFAULT_CONTEXT_DIR).exists());
    }

    #[test]
    fn test_nearest_context_wins() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("sub");
        fs::create_dir_all(nested.join(".ctx")).unwrap();
        fs::create_dir_all(temp.path().join(".ctx")).unwrap();

        let resolved = WalkUpResolver::new(&nested, ".ctx").resolve().unwrap();
        assert_eq!(resolved, nested.join(".ctx"));
    }

    #[test]
    fn test_creates_context_when_missing() {
        let temp = TempDir::new().unwrap();
        let name = "iterloop-test-context-that-does-not-exist";

        let resolved = WalkUpResolver::new(temp.path(), name).resolve().unwrap();
        assert_eq!(resolved, temp.path().join(name));
        assert!(resolved.is_dir());
    }

    #[test]
    fn test_ignores_plain_file_with_context_name() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("sub");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join(".ctx"), "not a dir").unwrap();

        let resolved = WalkUpResolver::new(&nested, ".ctx").resolve().unwrap();
        assert_eq!(resolved, nested.join(".ctx"));
    }

    #[test]
    fn test_fixed_resolver_creates_dir() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("a").join("b");

        let resolved = FixedResolver::new(&dir).resolve().unwrap();
        assert_eq!(resolved, dir);
        assert!(dir.is_dir());
    }
}
