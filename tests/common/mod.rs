#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use tempfile::{TempDir, tempdir};

/// Checks if git is available on the system.
pub fn is_git_available() -> bool {
  Command::new("git").arg("--version").status().is_ok()
}

/// Runs a git command in the given directory, returning an error with stderr on
/// failure.
pub fn run_git(dir: &Path, args: &[&str]) -> Result<()> {
  run_git_with_env(dir, args, &[])
}

fn run_git_with_env(dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> Result<()> {
  let output = Command::new("git")
    .args(args)
    .envs(envs.iter().copied())
    .current_dir(dir)
    .output()
    .with_context(|| format!("Failed to execute git {:?}", args))?;

  if !output.status.success() {
    anyhow::bail!("git {:?} failed: {}", args, String::from_utf8_lossy(&output.stderr));
  }
  Ok(())
}

/// Initializes a git repository in the given directory with deterministic
/// settings.
///
/// Configures:
/// - Default branch name set to `main`
/// - User name and email for commits
/// - Disables commit signing for test isolation
pub fn init_git_repo(dir: &Path) -> Result<()> {
  run_git(dir, &["init"])?;
  run_git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
  run_git(dir, &["config", "user.name", "Test User"])?;
  run_git(dir, &["config", "user.email", "test@example.com"])?;
  // Disable commit signing for test isolation
  run_git(dir, &["config", "commit.gpgsign", "false"])?;
  Ok(())
}

/// Creates a fresh temporary repository.
pub fn temp_git_repo() -> Result<TempDir> {
  let temp_dir = tempdir()?;
  init_git_repo(temp_dir.path())?;
  Ok(temp_dir)
}

/// Writes `content` to `relative` below `dir`, creating parent directories.
pub fn write_file(dir: &Path, relative: &str, content: &str) -> Result<()> {
  let path = dir.join(relative);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)?;
  }
  fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Creates a commit with all staged changes.
pub fn git_commit(dir: &Path, message: &str) -> Result<()> {
  run_git(dir, &["commit", "-m", message])
}

/// Stages a file and creates a commit.
pub fn git_add_and_commit(dir: &Path, file: &str, message: &str) -> Result<()> {
  run_git(dir, &["add", file])?;
  git_commit(dir, message)
}

/// Stages a file and commits it with the given author, dated mid-year in
/// `year` (UTC).
pub fn commit_as(dir: &Path, file: &str, name: &str, email: &str, year: i32) -> Result<()> {
  let date = format!("{year}-06-15T12:00:00+00:00");
  let message = format!("Change {file} as {name}");
  run_git(dir, &["add", file])?;
  run_git_with_env(
    dir,
    &["commit", "--allow-empty", "-m", &message],
    &[
      ("GIT_AUTHOR_NAME", name),
      ("GIT_AUTHOR_EMAIL", email),
      ("GIT_AUTHOR_DATE", &date),
      ("GIT_COMMITTER_NAME", name),
      ("GIT_COMMITTER_EMAIL", email),
      ("GIT_COMMITTER_DATE", &date),
    ],
  )
}

/// Writes `content` to `file` and commits it with the given author and year.
pub fn write_and_commit(dir: &Path, file: &str, content: &str, name: &str, email: &str, year: i32) -> Result<()> {
  write_file(dir, file, content)?;
  commit_as(dir, file, name, email, year)
}
