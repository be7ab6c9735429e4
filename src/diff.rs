//! # Diff Module
//!
//! This module renders the changes a dry run would make as unified diffs,
//! printed to stderr and/or appended to a file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use similar::TextDiff;

/// Manages diff creation and rendering for dry runs.
pub struct DiffManager {
  /// Whether to print diffs to stderr
  pub show_diff: bool,

  /// File that diffs are appended to
  pub save_diff_path: Option<PathBuf>,
}

impl DiffManager {
  pub const fn new(show_diff: bool, save_diff_path: Option<PathBuf>) -> Self {
    Self {
      show_diff,
      save_diff_path,
    }
  }

  /// Whether any diff output was requested.
  pub const fn is_enabled(&self) -> bool {
    self.show_diff || self.save_diff_path.is_some()
  }

  /// Truncates the diff file so a run starts from an empty file.
  pub fn init(&self) -> Result<()> {
    if let Some(ref path) = self.save_diff_path {
      std::fs::write(path, "").with_context(|| format!("Failed to create diff file: {}", path.display()))?;
    }
    Ok(())
  }

  /// Renders the unified diff between `original` and `new` for `path`.
  pub fn render(path: &Path, original: &str, new: &str) -> String {
    let name = path.display().to_string();
    TextDiff::from_lines(original, new)
      .unified_diff()
      .context_radius(3)
      .header(&format!("a/{name}"), &format!("b/{name}"))
      .to_string()
  }

  /// Displays and/or saves the diff for one file.
  pub fn display_diff(&self, path: &Path, original: &str, new: &str) -> Result<()> {
    if !self.is_enabled() {
      return Ok(());
    }

    let diff = Self::render(path, original, new);

    if self.show_diff {
      for line in diff.lines() {
        let colored = if line.starts_with('+') && !line.starts_with("+++") {
          line.if_supports_color(Stream::Stderr, |l| l.green()).to_string()
        } else if line.starts_with('-') && !line.starts_with("---") {
          line.if_supports_color(Stream::Stderr, |l| l.red()).to_string()
        } else if line.starts_with("@@") {
          line.if_supports_color(Stream::Stderr, |l| l.cyan()).to_string()
        } else {
          line.to_string()
        };
        eprintln!("{colored}");
      }
    }

    if let Some(ref diff_path) = self.save_diff_path {
      let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(diff_path)
        .with_context(|| format!("Failed to open diff file: {}", diff_path.display()))?;
      file
        .write_all(diff.as_bytes())
        .with_context(|| format!("Failed to write diff file: {}", diff_path.display()))?;
    }

    Ok(())
  }
}
