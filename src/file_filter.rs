//! # File Filter Module
//!
//! This module contains components for narrowing the list of tracked files
//! down to the ones the rewriter should open: regular files only, never the
//! configuration file, optionally restricted by path selections and exclude
//! globs.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;

use crate::verbose_log;

/// Result of a file filtering operation.
pub struct FilterResult {
  /// Whether the file should be processed
  pub should_process: bool,
  /// Reason why the file should not be processed (if any)
  pub reason: Option<String>,
}

impl FilterResult {
  /// Creates a new FilterResult indicating the file should be processed.
  pub const fn process() -> Self {
    Self {
      should_process: true,
      reason: None,
    }
  }

  /// Creates a new FilterResult indicating the file should be skipped.
  pub fn skip(reason: impl Into<String>) -> Self {
    Self {
      should_process: false,
      reason: Some(reason.into()),
    }
  }
}

/// Trait for components that filter files based on certain criteria.
///
/// Paths are relative to the repository root, which is also the current
/// directory while filters run.
pub trait FileFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult>;
}

/// Skips symlinks, directories, and anything else that is not a regular file.
pub struct RegularFileFilter;

impl FileFilter for RegularFileFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    // symlink_metadata so that links are never followed.
    match std::fs::symlink_metadata(path) {
      Ok(metadata) if metadata.file_type().is_symlink() => Ok(FilterResult::skip("Symlink")),
      Ok(metadata) if metadata.file_type().is_file() => Ok(FilterResult::process()),
      Ok(_) => Ok(FilterResult::skip("Not a regular file")),
      // Tracked in the index but deleted from the working tree.
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FilterResult::skip("Missing from working tree")),
      Err(e) => Err(e).with_context(|| format!("Failed to stat {}", path.display())),
    }
  }
}

/// Skips one specific path, e.g. the configuration file.
pub struct ExactPathFilter {
  path: PathBuf,
  reason: &'static str,
}

impl ExactPathFilter {
  pub fn new(path: impl Into<PathBuf>, reason: &'static str) -> Self {
    Self {
      path: path.into(),
      reason,
    }
  }
}

impl FileFilter for ExactPathFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    if path == self.path {
      Ok(FilterResult::skip(self.reason))
    } else {
      Ok(FilterResult::process())
    }
  }
}

/// Skips files matching any of a set of glob patterns.
pub struct ExcludeFilter {
  patterns: Vec<Pattern>,
}

impl ExcludeFilter {
  pub fn from_patterns(patterns: &[String]) -> Result<Self> {
    let patterns = patterns
      .iter()
      .map(|p| Pattern::new(p).with_context(|| format!("Invalid exclude pattern: {p}")))
      .collect::<Result<Vec<_>>>()?;
    Ok(Self { patterns })
  }
}

impl FileFilter for ExcludeFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    if self.patterns.iter().any(|p| p.matches_path(path)) {
      verbose_log!("Skipping: {} (matches exclude pattern)", path.display());
      Ok(FilterResult::skip("Matches exclude pattern"))
    } else {
      Ok(FilterResult::process())
    }
  }
}

/// Keeps only files selected on the command line.
///
/// A selection is either a path prefix (a file or a directory) or a glob
/// pattern. No selections means every file is selected.
pub struct SelectionFilter {
  prefixes: Vec<PathBuf>,
  globs: Vec<Pattern>,
}

impl SelectionFilter {
  pub fn new(selections: &[String]) -> Result<Self> {
    let mut prefixes = Vec::new();
    let mut globs = Vec::new();

    for selection in selections {
      if selection.contains(['*', '?', '[']) {
        globs.push(Pattern::new(selection).with_context(|| format!("Invalid glob pattern: {selection}"))?);
      } else {
        let prefix: PathBuf = Path::new(selection)
          .components()
          .filter(|component| !matches!(component, Component::CurDir))
          .collect();
        prefixes.push(prefix);
      }
    }

    Ok(Self { prefixes, globs })
  }

  const fn selects_everything(&self) -> bool {
    self.prefixes.is_empty() && self.globs.is_empty()
  }
}

impl FileFilter for SelectionFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    if self.selects_everything()
      || self.prefixes.iter().any(|prefix| path.starts_with(prefix))
      || self.globs.iter().any(|glob| glob.matches_path(path))
    {
      Ok(FilterResult::process())
    } else {
      Ok(FilterResult::skip("Not selected"))
    }
  }
}

/// Filter that combines multiple filters.
pub struct CompositeFilter {
  filters: Vec<Box<dyn FileFilter>>,
}

impl CompositeFilter {
  /// Creates a new CompositeFilter with the given filters.
  pub fn new(filters: Vec<Box<dyn FileFilter>>) -> Self {
    Self { filters }
  }

  /// Adds a filter to this CompositeFilter.
  pub fn add_filter(&mut self, filter: Box<dyn FileFilter>) {
    self.filters.push(filter);
  }
}

impl FileFilter for CompositeFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    for filter in &self.filters {
      let result = filter.should_process(path)?;
      if !result.should_process {
        return Ok(result);
      }
    }
    Ok(FilterResult::process())
  }
}

/// Constructs the filter chain used for tracked files.
///
/// # Parameters
///
/// * `selections` - Path prefixes or globs given on the command line
/// * `exclude_patterns` - Glob patterns for files to leave alone
/// * `config_path` - Repository-relative path of the loaded config file, if any
pub fn create_default_filter(
  selections: &[String],
  exclude_patterns: &[String],
  config_path: Option<&Path>,
) -> Result<CompositeFilter> {
  let mut filter = CompositeFilter::new(vec![
    Box::new(SelectionFilter::new(selections)?),
    Box::new(ExcludeFilter::from_patterns(exclude_patterns)?),
  ]);
  if let Some(config_path) = config_path {
    filter.add_filter(Box::new(ExactPathFilter::new(config_path, "Configuration file")));
  }
  filter.add_filter(Box::new(RegularFileFilter));
  Ok(filter)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_exclude_filter() {
    let filter = ExcludeFilter::from_patterns(&["*.bak".to_string(), "vendor/*".to_string()]).expect("patterns");

    assert!(filter.should_process(Path::new("src/main.rs")).expect("filter").should_process);

    let result = filter.should_process(Path::new("src/main.rs.bak")).expect("filter");
    assert!(!result.should_process);
    assert!(result.reason.is_some());

    assert!(!filter.should_process(Path::new("vendor/lib.c")).expect("filter").should_process);
  }

  #[test]
  fn test_selection_filter_prefixes_and_globs() {
    let filter = SelectionFilter::new(&["./src".to_string(), "*.py".to_string()]).expect("selections");

    assert!(filter.should_process(Path::new("src/lib.rs")).expect("filter").should_process);
    assert!(filter.should_process(Path::new("tools/gen.py")).expect("filter").should_process);
    assert!(!filter.should_process(Path::new("docs/index.md")).expect("filter").should_process);
    assert!(!filter.should_process(Path::new("srcfoo/lib.rs")).expect("filter").should_process);
  }

  #[test]
  fn test_empty_selection_selects_everything() {
    let filter = SelectionFilter::new(&[]).expect("selections");
    assert!(filter.should_process(Path::new("any/file")).expect("filter").should_process);
  }

  #[test]
  fn test_exact_path_filter() {
    let filter = ExactPathFilter::new(".headstamp.yml", "Configuration file");
    let result = filter.should_process(Path::new(".headstamp.yml")).expect("filter");
    assert!(!result.should_process);
    assert_eq!(result.reason.as_deref(), Some("Configuration file"));
    assert!(filter.should_process(Path::new("sub/.headstamp.yml")).expect("filter").should_process);
  }

  #[test]
  fn test_regular_file_filter() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let file = temp_dir.path().join("file.txt");
    std::fs::write(&file, "x").expect("write");

    assert!(RegularFileFilter.should_process(&file).expect("filter").should_process);
    assert!(!RegularFileFilter.should_process(temp_dir.path()).expect("filter").should_process);
    assert!(
      !RegularFileFilter
        .should_process(&temp_dir.path().join("gone.txt"))
        .expect("filter")
        .should_process
    );

    #[cfg(unix)]
    {
      let link = temp_dir.path().join("link.txt");
      std::os::unix::fs::symlink(&file, &link).expect("symlink");
      let result = RegularFileFilter.should_process(&link).expect("filter");
      assert!(!result.should_process);
      assert_eq!(result.reason.as_deref(), Some("Symlink"));
    }
  }

  #[test]
  fn test_composite_filter_stops_at_first_skip() {
    struct MockFilter;
    impl FileFilter for MockFilter {
      fn should_process(&self, path: &Path) -> Result<FilterResult> {
        if path.to_string_lossy().contains("pass") {
          Ok(FilterResult::process())
        } else {
          Ok(FilterResult::skip("Not a pass file"))
        }
      }
    }

    let mut composite = CompositeFilter::new(Vec::new());
    composite.add_filter(Box::new(MockFilter));
    composite.add_filter(Box::new(ExactPathFilter::new("src/pass_skip.rs", "Exact")));

    assert!(composite.should_process(Path::new("src/pass_test.rs")).expect("filter").should_process);
    let result = composite.should_process(Path::new("src/fail_test.rs")).expect("filter");
    assert_eq!(result.reason.as_deref(), Some("Not a pass file"));
    let result = composite.should_process(Path::new("src/pass_skip.rs")).expect("filter");
    assert_eq!(result.reason.as_deref(), Some("Exact"));
  }
}
