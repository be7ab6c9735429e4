//! # Workspace Module
//!
//! This module defines the repository root that headstamp operates on.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::git;

/// Error raised when no repository encloses the starting directory.
#[derive(Debug, thiserror::Error)]
#[error("Not inside a git repository: {}", start.display())]
pub struct NoRepository {
  pub start: PathBuf,
}

/// Workspace rooted at the working tree of a git repository.
pub struct Workspace {
  root: PathBuf,
}

impl Workspace {
  pub fn root(&self) -> &Path {
    self.root.as_path()
  }

  /// Makes the repository root the process working directory.
  ///
  /// Every path handed to the rewriter afterwards is relative to the root.
  pub fn enter(&self) -> Result<()> {
    std::env::set_current_dir(&self.root)
      .with_context(|| format!("Failed to change directory to {}", self.root.display()))?;
    debug!("Working directory is now {}", self.root.display());
    Ok(())
  }
}

/// Resolve the repository enclosing `start`.
pub fn resolve_workspace(start: &Path) -> Result<Workspace> {
  match git::discover_repo_root(start)? {
    Some(root) => Ok(Workspace { root }),
    None => Err(NoRepository {
      start: start.to_path_buf(),
    }
    .into()),
  }
}
