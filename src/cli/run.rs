//! # Run Command
//!
//! This module implements a full pass of headstamp over the tracked files of
//! the repository enclosing the current directory.

use std::path::{Component, Path, PathBuf};
use std::process;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::Cli;
use crate::config::{Config, discover_config_path};
use crate::diff::DiffManager;
use crate::file_filter::{FileFilter, create_default_filter};
use crate::git::{get_git_tracked_files, open_history};
use crate::history::HistoryAggregator;
use crate::logging::{init_tracing, set_quiet, set_verbose};
use crate::output::{
  RunSummary, print_blank_line, print_changed_files, print_failure, print_start_message, print_summary,
};
use crate::rewriter::{FileRewriter, rules_from_headers};
use crate::workspace::resolve_workspace;
use crate::{info_log, verbose_log};

/// Run headstamp with the given arguments.
///
/// Exits the process with status 1 when no repository encloses the current
/// directory, when any file fails, or when a dry run finds files to rewrite.
pub fn run(args: Cli) -> Result<()> {
  // Initialize tracing subscriber for structured logging
  init_tracing(args.quiet, args.verbose);

  if args.verbose > 0 {
    set_verbose();
  } else if args.quiet {
    set_quiet();
  }
  args.colors.apply();

  let invocation_dir = std::env::current_dir()
    .with_context(|| "Failed to get current directory")?
    .canonicalize()
    .with_context(|| "Failed to resolve current directory")?;

  let workspace = match resolve_workspace(&invocation_dir) {
    Ok(workspace) => workspace,
    Err(e) => {
      eprintln!("ERROR: {e:#}");
      eprintln!("headstamp must be run from inside the working tree of a git repository");
      process::exit(1);
    }
  };
  let root = workspace.root().to_path_buf();
  debug!("Using repository root: {}", root.display());

  // Paths given on the command line are relative to where we were started.
  let output_root = args.output_root().map(|dir| invocation_dir.join(dir));
  let explicit_config = args.config.as_ref().map(|path| invocation_dir.join(path));
  let selections: Vec<String> = args
    .paths
    .iter()
    .map(|selection| to_repo_relative(selection, &invocation_dir, &root))
    .collect();

  // A relative HEADSTAMP_CONFIG is also relative to where we were started.
  let config_path = if args.no_config {
    None
  } else {
    discover_config_path(explicit_config.as_deref(), &root).map(|path| invocation_dir.join(path))
  };
  let config_in_repo = config_path.as_deref().and_then(|path| repo_relative_config(path, &root));
  let config = match config_path {
    Some(ref path) => Config::load(path).with_context(|| format!("Failed to load config from {}", path.display()))?,
    None => Config::default(),
  };
  if config.headers.is_empty() {
    warn!("No headers configured; files will be left unchanged");
  }

  workspace.enter()?;

  let diff_manager = DiffManager::new(args.show_diff, args.save_diff.map(|path| invocation_dir.join(path)));
  diff_manager.init()?;

  let history = open_history(&root, config.history)?;
  let aggregator = HistoryAggregator::new(history, config.remapper());
  let mut rewriter =
    FileRewriter::new(rules_from_headers(&config.headers), aggregator).with_output_root(output_root.clone());
  if args.dry_run {
    rewriter = rewriter.with_dry_run(diff_manager);
  }
  if let Some(ref dir) = output_root {
    info_log!("Writing output below {}", dir.display());
  }

  let filter = create_default_filter(&selections, &args.exclude, config_in_repo.as_deref())?;

  let tracked = get_git_tracked_files(&root)?;
  let mut summary = RunSummary::default();
  let mut files = Vec::with_capacity(tracked.len());
  for path in tracked {
    let result = filter.should_process(&path)?;
    if result.should_process {
      files.push(path);
    } else {
      verbose_log!(
        "Skipping: {} ({})",
        path.display(),
        result.reason.as_deref().unwrap_or("filtered")
      );
      summary.skipped += 1;
    }
  }

  print_start_message(files.len(), args.dry_run);
  let start_time = Instant::now();

  for path in &files {
    match rewriter.process(path) {
      Ok(outcome) => {
        verbose_log!("{}: {:?}", path.display(), outcome);
        summary.record(path, outcome);
      }
      Err(e) => {
        print_failure(path, &e);
        summary.record_failure(path);
      }
    }
  }
  summary.elapsed = start_time.elapsed();

  print_blank_line();
  print_changed_files(&summary);
  print_summary(&summary);

  if summary.has_failures() || !summary.would_rewrite.is_empty() {
    process::exit(1);
  }
  Ok(())
}

/// Makes a command-line selection relative to the repository root.
///
/// Glob patterns are taken as already relative to the root. A selection that
/// lies outside the root is returned unchanged and then matches nothing.
fn to_repo_relative(selection: &str, invocation_dir: &Path, root: &Path) -> String {
  if selection.contains(['*', '?', '[']) {
    return selection.to_string();
  }

  let absolute = normalize(&invocation_dir.join(selection));
  match absolute.strip_prefix(root) {
    Ok(relative) if relative.as_os_str().is_empty() => String::new(),
    Ok(relative) => relative.to_string_lossy().into_owned(),
    Err(_) => {
      warn!("Selection '{}' is outside the repository", selection);
      selection.to_string()
    }
  }
}

/// Resolves `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
  let mut normalized = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        normalized.pop();
      }
      other => normalized.push(other),
    }
  }
  normalized
}

/// The config file's path relative to the repository root, if it is inside it.
fn repo_relative_config(path: &Path, root: &Path) -> Option<PathBuf> {
  let absolute = path.canonicalize().ok()?;
  absolute.strip_prefix(root).ok().map(Path::to_path_buf)
}
