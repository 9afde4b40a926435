// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Project layout: the `dev` source tree and the `dist` build tree.

use crate::error::{PipelineError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the source tree directory under the project root.
pub const DEV_DIR: &str = "dev";
/// Name of the build tree directory under the project root.
pub const DIST_DIR: &str = "dist";

/// A project root with its derived source and build trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    root: PathBuf,
    dev: PathBuf,
    dist: PathBuf,
}

impl Project {
    /// Creates a project rooted at `root` without touching the filesystem.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            dev: root.join(DEV_DIR),
            dist: root.join(DIST_DIR),
            root,
        }
    }

    /// Opens an existing project, checking that the root and its `dev` tree exist.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let project = Self::new(root);
        if !project.root.is_dir() {
            return Err(PipelineError::Config(format!(
                "project root {} does not exist",
                project.root.display()
            )));
        }
        if !project.dev.is_dir() {
            return Err(PipelineError::Config(format!(
                "source tree {} does not exist",
                project.dev.display()
            )));
        }
        Ok(project)
    }

    /// Project root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Source tree (`<root>/dev`).
    pub fn dev(&self) -> &Path {
        &self.dev
    }

    /// Build tree (`<root>/dist`).
    pub fn dist(&self) -> &Path {
        &self.dist
    }

    /// Removes the build tree. A missing build tree is not an error.
    pub fn clean(&self) -> Result<()> {
        match fs::remove_dir_all(&self.dist) {
            Ok(()) => {
                tracing::info!("Removed {}", self.dist.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PipelineError::io(&self.dist, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_derived_paths() {
        let project = Project::new("/site");
        assert_eq!(project.dev(), Path::new("/site/dev"));
        assert_eq!(project.dist(), Path::new("/site/dist"));
    }

    #[test]
    fn test_open_requires_dev_tree() {
        let dir = tempdir().unwrap();
        let err = Project::open(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));

        fs::create_dir(dir.path().join("dev")).unwrap();
        assert!(Project::open(dir.path()).is_ok());
    }

    #[test]
    fn test_open_missing_root() {
        let dir = tempdir().unwrap();
        let err = Project::open(dir.path().join("nope")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_clean_is_idempotent() {
        let dir = tempdir().unwrap();
        let project = Project::new(dir.path());
        fs::create_dir_all(project.dist().join("src/css")).unwrap();
        fs::write(project.dist().join("src/css/a.css"), "a{}").unwrap();

        project.clean().unwrap();
        assert!(!project.dist().exists());
        project.clean().unwrap();
    }
}
