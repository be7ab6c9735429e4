//! # Output Module
//!
//! This module centralizes all user-facing output for the headstamp tool.
//! Normal output goes to stdout and is silenced by `-q`; failures go to stderr
//! regardless.

use std::path::{Path, PathBuf};
use std::time::Duration;

use owo_colors::{OwoColorize, Stream};

use crate::logging::{is_quiet, is_verbose};
use crate::rewriter::RewriteOutcome;

/// Symbols used in output
pub mod symbols {
  /// File rewritten
  pub const SUCCESS: &str = "\u{2713}"; // ✓
  /// File failed
  pub const FAILURE: &str = "\u{2717}"; // ✗
  /// File would be rewritten
  pub const PENDING: &str = "\u{21bb}"; // ↻
}

/// Maximum number of files to list before truncating, unless `-v` is given.
const DEFAULT_FILE_LIST_LIMIT: usize = 20;

/// Tally of one run.
#[derive(Debug, Default)]
pub struct RunSummary {
  pub rewritten: Vec<PathBuf>,
  pub would_rewrite: Vec<PathBuf>,
  pub failed: Vec<PathBuf>,
  pub unchanged: usize,
  pub copied: usize,
  pub skipped: usize,
  pub elapsed: Duration,
}

impl RunSummary {
  /// Records the outcome for one file.
  pub fn record(&mut self, path: &Path, outcome: RewriteOutcome) {
    match outcome {
      RewriteOutcome::Rewritten => self.rewritten.push(path.to_path_buf()),
      RewriteOutcome::WouldRewrite => self.would_rewrite.push(path.to_path_buf()),
      RewriteOutcome::Unchanged => self.unchanged += 1,
      RewriteOutcome::Copied => self.copied += 1,
    }
  }

  pub fn record_failure(&mut self, path: &Path) {
    self.failed.push(path.to_path_buf());
  }

  pub fn processed(&self) -> usize {
    self.rewritten.len() + self.would_rewrite.len() + self.failed.len() + self.unchanged + self.copied
  }

  pub fn has_failures(&self) -> bool {
    !self.failed.is_empty()
  }
}

/// Print the initial "Processing N files..." or "Checking N files..." message.
pub fn print_start_message(file_count: usize, dry_run: bool) {
  if is_quiet() {
    return;
  }

  let verb = if dry_run { "Checking" } else { "Processing" };
  let files_word = if file_count == 1 { "file" } else { "files" };
  println!("{verb} {file_count} {files_word}...");
}

/// Print a blank line for visual separation (respects quiet mode).
pub fn print_blank_line() {
  if !is_quiet() {
    println!();
  }
}

/// Print a headed list of files, truncated unless verbose.
fn print_file_list(symbol: &str, description: &str, files: &[PathBuf]) {
  if files.is_empty() {
    return;
  }

  if is_quiet() {
    // Just the paths, for scripting.
    for file in files {
      println!("{}", file.display());
    }
    return;
  }

  let count = files.len();
  println!(
    "{} {} {} {}:",
    symbol,
    count,
    if count == 1 { "file" } else { "files" },
    description
  );

  let limit = if is_verbose() { count } else { DEFAULT_FILE_LIST_LIMIT };
  for file in files.iter().take(limit) {
    println!("  {}", file.display());
  }
  if count > limit {
    println!("  ... and {} more (use -v to see all)", count - limit);
  }
}

/// Print the files that were rewritten or would be rewritten.
pub fn print_changed_files(summary: &RunSummary) {
  print_file_list(
    &symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()).to_string(),
    "rewritten",
    &summary.rewritten,
  );
  print_file_list(
    &symbols::PENDING.if_supports_color(Stream::Stdout, |s| s.yellow()).to_string(),
    "would be rewritten",
    &summary.would_rewrite,
  );
}

/// Print an error for a file that could not be processed.
pub fn print_failure(path: &Path, error: &dyn std::fmt::Display) {
  eprintln!(
    "{} {}: {}",
    symbols::FAILURE.if_supports_color(Stream::Stderr, |s| s.red()),
    path.display(),
    error
  );
}

/// Print the one-line summary at the end of a run.
pub fn print_summary(summary: &RunSummary) {
  if is_quiet() {
    return;
  }

  let mut parts = Vec::new();
  if !summary.rewritten.is_empty() {
    parts.push(format!("{} rewritten", summary.rewritten.len()));
  }
  if !summary.would_rewrite.is_empty() {
    parts.push(format!("{} would be rewritten", summary.would_rewrite.len()));
  }
  if summary.copied > 0 {
    parts.push(format!("{} copied", summary.copied));
  }
  parts.push(format!("{} unchanged", summary.unchanged));
  if summary.skipped > 0 {
    parts.push(format!("{} skipped", summary.skipped));
  }
  if summary.has_failures() {
    parts.push(format!("{} failed", summary.failed.len()));
  }

  println!(
    "{} ({} files in {:.2}s)",
    parts.join(", "),
    summary.processed(),
    summary.elapsed.as_secs_f64()
  );
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_summary_records_outcomes() {
    let mut summary = RunSummary::default();
    summary.record(Path::new("a"), RewriteOutcome::Rewritten);
    summary.record(Path::new("b"), RewriteOutcome::Unchanged);
    summary.record(Path::new("c"), RewriteOutcome::Copied);
    summary.record(Path::new("d"), RewriteOutcome::WouldRewrite);
    summary.record_failure(Path::new("e"));

    assert_eq!(summary.rewritten, vec![PathBuf::from("a")]);
    assert_eq!(summary.would_rewrite, vec![PathBuf::from("d")]);
    assert_eq!(summary.unchanged, 1);
    assert_eq!(summary.copied, 1);
    assert_eq!(summary.processed(), 5);
    assert!(summary.has_failures());
  }
}
