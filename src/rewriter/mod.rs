//! # Rewriter Module
//!
//! This module contains the core of headstamp: expanding configured tokens in
//! a file and replacing the file transactionally.
//!
//! The module is organized into several submodules:
//! - [`token`] - Token matching and prologue/epilogue preserving substitution
//! - [`file_io`] - Byte-level reads and temp-file-then-rename writes
//!
//! Expansion is two-phase. A line containing a header token is replaced by the
//! token's template lines; every resulting line that contains the
//! [`COPYRIGHTS_MARKER`] is then expanded again into the copyright lines
//! generated from the file's history, so decoration such as ` * ` around the
//! marker is repeated on each copyright line.

pub mod file_io;
pub mod token;

use std::path::{Path, PathBuf};

pub use file_io::{FileIO, WriteError};
pub use token::{TokenRule, join_block, rules_from_headers, split_lines};
use tracing::{debug, trace};

use crate::copyright::COPYRIGHTS_MARKER;
use crate::diff::DiffManager;
use crate::history::{HistoryAggregator, HistoryError};

/// What happened to a processed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteOutcome {
  /// No token matched; the file was left alone.
  Unchanged,
  /// Tokens were expanded and the result written.
  Rewritten,
  /// Dry run: tokens would have been expanded.
  WouldRewrite,
  /// No token matched, but the file was copied to the output root.
  Copied,
}

/// Error type for processing a single file.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
  /// The source file could not be read.
  #[error("Failed to read file '{path}': {source}")]
  Read { path: PathBuf, source: std::io::Error },

  /// The history behind a copyrights marker could not be read.
  #[error(transparent)]
  History(#[from] HistoryError),

  /// The rewritten file could not be written.
  #[error(transparent)]
  Write(#[from] WriteError),

  /// The diff of a dry run could not be produced.
  #[error("Failed to render diff for '{path}': {message}")]
  Diff { path: PathBuf, message: String },
}

/// Expands tokens in files, one file at a time.
pub struct FileRewriter {
  /// Header rules, in configuration order
  rules: Vec<TokenRule>,

  /// Source of the copyright lines for the copyrights marker
  aggregator: HistoryAggregator,

  /// Directory mirroring the repository that receives the output instead of
  /// the files themselves
  output_root: Option<PathBuf>,

  /// Whether to only report what would change
  dry_run: bool,

  /// Diff output for dry runs
  diff_manager: DiffManager,
}

impl FileRewriter {
  pub const fn new(rules: Vec<TokenRule>, aggregator: HistoryAggregator) -> Self {
    Self {
      rules,
      aggregator,
      output_root: None,
      dry_run: false,
      diff_manager: DiffManager::new(false, None),
    }
  }

  /// Writes results below `output_root` instead of in place.
  pub fn with_output_root(mut self, output_root: Option<PathBuf>) -> Self {
    self.output_root = output_root;
    self
  }

  /// Enables dry-run mode, optionally producing diffs.
  pub fn with_dry_run(mut self, diff_manager: DiffManager) -> Self {
    self.dry_run = true;
    self.diff_manager = diff_manager;
    self
  }

  /// Where the output for `path` is written.
  pub fn destination(&self, path: &Path) -> PathBuf {
    match self.output_root {
      Some(ref root) => root.join(path),
      None => path.to_path_buf(),
    }
  }

  /// Expands every token in `content`.
  ///
  /// `path` is the repository-relative path used to look up history, which
  /// happens at most once per call and only if an expansion contains the
  /// copyrights marker.
  pub fn rewrite_content(&mut self, path: &Path, content: &[u8]) -> Result<Vec<u8>, HistoryError> {
    let marker = COPYRIGHTS_MARKER.as_bytes();
    let mut copyrights: Option<TokenRule> = None;
    let mut output = Vec::with_capacity(content.len());

    for line in split_lines(content) {
      let Some(rule) = self.rules.iter().find(|rule| rule.matches(line)) else {
        output.extend_from_slice(line);
        continue;
      };
      trace!("{}: expanding {}", path.display(), String::from_utf8_lossy(rule.token()));

      let mut block = Vec::new();
      for expanded in rule.substitute(line) {
        if token::find(&expanded, marker).is_none() {
          block.push(expanded);
          continue;
        }

        if copyrights.is_none() {
          let owners = self.aggregator.copyright_lines(path)?;
          let owners = owners.into_iter().map(String::into_bytes).collect();
          copyrights = Some(TokenRule::new(marker, owners));
        }
        if let Some(ref owners_rule) = copyrights {
          block.extend(owners_rule.substitute(&expanded));
        }
      }
      join_block(&mut output, &block);
    }

    Ok(output)
  }

  /// Processes one file.
  ///
  /// Files without tokens are not written, unless an output root is set, in
  /// which case they are copied there so the mirror is complete.
  pub fn process(&mut self, path: &Path) -> Result<RewriteOutcome, RewriteError> {
    let content = FileIO::read_bytes(path).map_err(|e| RewriteError::Read {
      path: path.to_path_buf(),
      source: e,
    })?;

    let rewritten = self.rewrite_content(path, &content)?;
    let changed = rewritten != content;

    if self.dry_run {
      if !changed {
        return Ok(RewriteOutcome::Unchanged);
      }
      self
        .diff_manager
        .display_diff(
          path,
          &String::from_utf8_lossy(&content),
          &String::from_utf8_lossy(&rewritten),
        )
        .map_err(|e| RewriteError::Diff {
          path: path.to_path_buf(),
          message: format!("{e:#}"),
        })?;
      return Ok(RewriteOutcome::WouldRewrite);
    }

    if !changed && self.output_root.is_none() {
      return Ok(RewriteOutcome::Unchanged);
    }

    let destination = self.destination(path);
    FileIO::replace_atomically(path, &destination, &rewritten)?;
    debug!("Wrote {}", destination.display());

    Ok(if changed {
      RewriteOutcome::Rewritten
    } else {
      RewriteOutcome::Copied
    })
  }
}
