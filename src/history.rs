//! # History Module
//!
//! Turns the revision history of a file into rendered copyright lines.
//!
//! The history itself comes from a [`HistorySource`]. The git-backed sources
//! live in [`crate::git`]; [`MemoryHistory`] serves literal records for tests
//! and library consumers that already have authorship data at hand.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, trace};

use crate::copyright::{OwnerLedger, OwnerRemapper};

/// One authorship record for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
  pub author_name: String,
  pub author_email: String,
  pub year: i32,
}

impl Revision {
  pub fn new(author_name: impl Into<String>, author_email: impl Into<String>, year: i32) -> Self {
    Self {
      author_name: author_name.into(),
      author_email: author_email.into(),
      year,
    }
  }
}

/// How authorship is attributed to a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
  /// One record per commit that changed the file.
  #[default]
  Log,
  /// One record per blame hunk of the current revision.
  Blame,
}

/// Error type for history lookups.
#[derive(Debug, Error)]
pub enum HistoryError {
  /// The repository could not be queried for this path.
  #[error("Failed to read history of '{path}': {source}")]
  Git { path: PathBuf, source: git2::Error },
}

/// Capability to list the authorship records of a file.
///
/// Paths are relative to the repository root.
pub trait HistorySource {
  fn revisions(&self, path: &Path) -> Result<Vec<Revision>, HistoryError>;
}

/// In-memory history keyed by path. Unknown paths have no history.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
  records: HashMap<PathBuf, Vec<Revision>>,
}

impl MemoryHistory {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds records for `path`, appending to any already present.
  pub fn with_revisions(mut self, path: impl Into<PathBuf>, revisions: Vec<Revision>) -> Self {
    self.records.entry(path.into()).or_default().extend(revisions);
    self
  }
}

impl HistorySource for MemoryHistory {
  fn revisions(&self, path: &Path) -> Result<Vec<Revision>, HistoryError> {
    Ok(self.records.get(path).cloned().unwrap_or_default())
  }
}

/// Builds the copyright lines of a file from its history.
///
/// Results are memoised per path for the lifetime of the aggregator, which is
/// meant to span a single run.
pub struct HistoryAggregator {
  source: Box<dyn HistorySource>,
  remapper: OwnerRemapper,
  cache: HashMap<PathBuf, Vec<String>>,
}

impl HistoryAggregator {
  pub fn new(source: Box<dyn HistorySource>, remapper: OwnerRemapper) -> Self {
    Self {
      source,
      remapper,
      cache: HashMap::new(),
    }
  }

  /// Fills a fresh ledger from the history of `path`.
  pub fn ledger(&self, path: &Path) -> Result<OwnerLedger, HistoryError> {
    let revisions = self.source.revisions(path)?;
    trace!("{} revision records for {}", revisions.len(), path.display());

    let mut ledger = OwnerLedger::new();
    for revision in &revisions {
      let (identity_key, display_name) = self.remapper.remap(&revision.author_email, &revision.author_name);
      ledger.add_contribution(&identity_key, &display_name, revision.year);
    }

    debug!("{} copyright owners for {}", ledger.len(), path.display());
    Ok(ledger)
  }

  /// Returns the rendered copyright lines for `path`.
  pub fn copyright_lines(&mut self, path: &Path) -> Result<Vec<String>, HistoryError> {
    if let Some(lines) = self.cache.get(path) {
      return Ok(lines.clone());
    }

    let lines = self.ledger(path)?.render();
    self.cache.insert(path.to_path_buf(), lines.clone());
    Ok(lines)
  }
}
