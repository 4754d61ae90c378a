//! Startup checks and the one-shot scan of the base directory
//!
//! Provides preflight checks before the watcher subscribes:
//! - Base directory exists and is a directory
//! - Destination directory exists and is a directory
//!
//! and the startup scan that feeds media already sitting in the base
//! directory through the same pipeline as newly arrived files.

use crate::processor::MediaSink;
use crate::scan::{list_media_files, MediaPath};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, Instrument, Span};

/// Error types for startup checks and the startup scan
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Directory not found: {0}")]
    Missing(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Verify that `path` exists and is a directory
pub fn check_directory(path: &Path) -> Result<(), StartupError> {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(StartupError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(StartupError::Missing(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Run all startup checks in order
///
/// 1. Base (watched) directory
/// 2. Destination directory
pub fn run_startup_checks(base_dir: &Path, dest_dir: &Path) -> Result<(), StartupError> {
    check_directory(base_dir)?;
    check_directory(dest_dir)?;
    Ok(())
}

/// Feed media files already present in `base_dir` through `sink`, once.
///
/// Only top-level files are considered; subdirectories are not descended
/// into here, unlike live directory notifications. Files are handled one at
/// a time in listing order, each `accept` completing before the next starts.
/// Returns the number of files fed.
pub async fn scan_once(
    base_dir: &Path,
    sink: &dyn MediaSink,
    span: Span,
) -> Result<usize, StartupError> {
    async {
        let dir = base_dir.to_path_buf();
        let entries = tokio::task::spawn_blocking(move || list_media_files(&dir))
            .await
            .map_err(io::Error::other)??;

        let count = entries.len();
        for entry in entries {
            sink.accept(MediaPath::new(entry.path)).await;
        }

        info!(base = %base_dir.display(), files = count, "base directory updated");
        Ok::<_, StartupError>(count)
    }
    .instrument(span)
    .await
}
