//! # Git Module
//!
//! This module contains functionality for interacting with git repositories:
//! locating the repository root, listing tracked files, and reading the
//! authorship history of a file through libgit2.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike};
use git2::{ErrorCode, Oid, Repository, Signature, Tree};
use tracing::{debug, trace};

use crate::history::{HistoryError, HistoryMode, HistorySource, Revision};

/// Git index mode of a symbolic link.
const MODE_SYMLINK: u32 = 0o120_000;

/// Git index mode of a submodule entry.
const MODE_GITLINK: u32 = 0o160_000;

/// Finds the working tree root of the repository containing `start`.
///
/// Returns `None` when `start` is not inside a git repository or the
/// repository is bare.
pub fn discover_repo_root(start: &Path) -> Result<Option<PathBuf>> {
  let repo = match Repository::discover(start) {
    Ok(repo) => repo,
    Err(e) if e.code() == ErrorCode::NotFound => {
      debug!("No git repository found from {}", start.display());
      return Ok(None);
    }
    Err(e) => return Err(e).with_context(|| format!("Failed to open git repository at {}", start.display())),
  };

  let Some(workdir) = repo.workdir() else {
    debug!("Repository at {} is bare", repo.path().display());
    return Ok(None);
  };

  let root = workdir
    .canonicalize()
    .with_context(|| format!("Failed to resolve repository root {}", workdir.display()))?;
  Ok(Some(root))
}

/// Lists the files tracked in the index of the repository at `root`.
///
/// Paths are relative to the repository root, sorted, and unique. Symlinks and
/// submodules are left out.
pub fn get_git_tracked_files(root: &Path) -> Result<Vec<PathBuf>> {
  let repo = Repository::open(root).with_context(|| format!("Failed to open git repository at {}", root.display()))?;
  let index = repo.index().with_context(|| "Failed to read git index")?;

  let mut files = BTreeSet::new();
  for entry in index.iter() {
    if entry.mode == MODE_SYMLINK || entry.mode == MODE_GITLINK {
      continue;
    }
    let path = String::from_utf8_lossy(&entry.path).into_owned();
    files.insert(PathBuf::from(path));
  }

  debug!("Found {} tracked files", files.len());
  Ok(files.into_iter().collect())
}

/// Opens the history source matching `mode` for the repository at `root`.
pub fn open_history(root: &Path, mode: HistoryMode) -> Result<Box<dyn HistorySource>> {
  let repo = Repository::open(root).with_context(|| format!("Failed to open git repository at {}", root.display()))?;
  Ok(match mode {
    HistoryMode::Log => Box::new(GitLogHistory::new(repo)),
    HistoryMode::Blame => Box::new(GitBlameHistory::new(repo)),
  })
}

/// Calendar year of a signature, in the author's own timezone.
fn signature_year(signature: &Signature<'_>) -> i32 {
  let when = signature.when();
  let local_seconds = when.seconds() + i64::from(when.offset_minutes()) * 60;
  DateTime::from_timestamp(local_seconds, 0).map_or(1970, |time| time.year())
}

fn signature_revision(signature: &Signature<'_>) -> Revision {
  Revision::new(
    String::from_utf8_lossy(signature.name_bytes()),
    String::from_utf8_lossy(signature.email_bytes()),
    signature_year(signature),
  )
}

fn blob_id(tree: &Tree<'_>, path: &Path) -> Option<Oid> {
  tree.get_path(path).ok().map(|entry| entry.id())
}

fn is_unborn(repo: &Repository) -> bool {
  matches!(repo.head(), Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound)
}

/// Attributes a file to the author of every commit that changed it.
///
/// A commit counts when the file exists in its tree and differs from the file
/// in each of its parents. Renames are not followed.
pub struct GitLogHistory {
  repo: Repository,
}

impl GitLogHistory {
  pub const fn new(repo: Repository) -> Self {
    Self { repo }
  }

  fn walk(&self, path: &Path) -> Result<Vec<Revision>, git2::Error> {
    if is_unborn(&self.repo) {
      return Ok(Vec::new());
    }

    let mut revwalk = self.repo.revwalk()?;
    revwalk.push_head()?;
    revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME | git2::Sort::REVERSE)?;

    let mut revisions = Vec::new();
    for oid in revwalk {
      let commit = self.repo.find_commit(oid?)?;
      let Some(id) = blob_id(&commit.tree()?, path) else {
        continue;
      };

      let changed = commit
        .parents()
        .all(|parent| parent.tree().ok().and_then(|tree| blob_id(&tree, path)) != Some(id));
      if changed {
        trace!("{} touched {}", commit.id(), path.display());
        revisions.push(signature_revision(&commit.author()));
      }
    }

    Ok(revisions)
  }
}

impl HistorySource for GitLogHistory {
  fn revisions(&self, path: &Path) -> Result<Vec<Revision>, HistoryError> {
    self.walk(path).map_err(|source| HistoryError::Git {
      path: path.to_path_buf(),
      source,
    })
  }
}

/// Attributes a file to the authors of its surviving lines at `HEAD`.
pub struct GitBlameHistory {
  repo: Repository,
}

impl GitBlameHistory {
  pub const fn new(repo: Repository) -> Self {
    Self { repo }
  }

  fn blame(&self, path: &Path) -> Result<Vec<Revision>, git2::Error> {
    if is_unborn(&self.repo) {
      return Ok(Vec::new());
    }

    let blame = match self.repo.blame_file(path, None) {
      Ok(blame) => blame,
      // Not committed yet.
      Err(e) if e.code() == ErrorCode::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(e),
    };

    Ok(
      blame
        .iter()
        .map(|hunk| signature_revision(&hunk.final_signature()))
        .collect(),
    )
  }
}

impl HistorySource for GitBlameHistory {
  fn revisions(&self, path: &Path) -> Result<Vec<Revision>, HistoryError> {
    self.blame(path).map_err(|source| HistoryError::Git {
      path: path.to_path_buf(),
      source,
    })
  }
}
