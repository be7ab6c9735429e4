//! # File I/O Module
//!
//! This module provides the byte-level reads and the transactional
//! temp-file-then-rename writes used by the rewriter.

use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, trace};

/// Error type for writing a rewritten file.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
  /// The temporary file could not be prepared.
  #[error("Failed to write temporary file for '{path}': {source}")]
  Stage { path: PathBuf, source: io::Error },

  /// The temporary file could not replace the destination.
  #[error("Failed to replace '{path}': {source}")]
  Persist { path: PathBuf, source: io::Error },
}

/// File I/O operations for the rewriter.
pub struct FileIO;

impl FileIO {
  /// Reads the complete file as raw bytes.
  pub fn read_bytes(path: &Path) -> io::Result<Vec<u8>> {
    std::fs::read(path)
  }

  /// Replaces `destination` with `content` without exposing a partial file.
  ///
  /// The content is staged in a temporary file in the destination directory
  /// (created if missing), given the permission bits of `permissions_from`, and
  /// renamed over the destination. When the rename fails because the
  /// destination is in use but already holds exactly `content`, the failure is
  /// ignored.
  pub fn replace_atomically(permissions_from: &Path, destination: &Path, content: &[u8]) -> Result<(), WriteError> {
    let stage_error = |source| WriteError::Stage {
      path: destination.to_path_buf(),
      source,
    };

    let dir = destination
      .parent()
      .filter(|parent| !parent.as_os_str().is_empty())
      .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(stage_error)?;

    let mut temp = NamedTempFile::new_in(dir).map_err(stage_error)?;
    temp.write_all(content).map_err(stage_error)?;
    temp.as_file().sync_all().map_err(stage_error)?;

    let permissions = std::fs::metadata(permissions_from).map_err(stage_error)?.permissions();
    temp.as_file().set_permissions(permissions).map_err(stage_error)?;
    trace!("Staged {} bytes for {} in {}", content.len(), destination.display(), temp.path().display());

    match temp.persist(destination) {
      Ok(_) => Ok(()),
      // Dropping the PersistError removes the temporary file.
      Err(e) => Self::settle_persist_failure(e.error, destination, content),
    }
  }

  /// Decides whether a failed rename still leaves `destination` correct.
  ///
  /// A busy destination that already holds exactly `content` counts as
  /// written. Anything else is a [`WriteError::Persist`].
  fn settle_persist_failure(error: io::Error, destination: &Path, content: &[u8]) -> Result<(), WriteError> {
    if is_busy(&error) && Self::holds(destination, content) {
      debug!("{} is busy but already up to date: {}", destination.display(), error);
      return Ok(());
    }
    Err(WriteError::Persist {
      path: destination.to_path_buf(),
      source: error,
    })
  }

  /// Whether `path` currently contains exactly `content`.
  fn holds(path: &Path, content: &[u8]) -> bool {
    std::fs::read(path).is_ok_and(|existing| existing == content)
  }
}

fn is_busy(error: &io::Error) -> bool {
  matches!(
    error.kind(),
    io::ErrorKind::PermissionDenied | io::ErrorKind::ResourceBusy
  )
}
