//! Move-then-enqueue pipeline for resolved media paths.

use crate::mover::{MoveError, Mover};
use crate::scan::MediaPath;
use crate::subtitles::{SubtitleQueue, SubtitleTask, SUBTITLE_LANGUAGES};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn, Instrument, Span};

/// Receiver of media paths produced by the watcher and the startup scan.
///
/// `accept` resolves once the path has been fully handled, which lets the
/// startup scan keep its moves strictly sequential.
#[async_trait]
pub trait MediaSink: Send + Sync {
    async fn accept(&self, path: MediaPath);
}

/// Moves media into the library and schedules subtitle fetches for it.
pub struct FileProcessor {
    mover: Arc<dyn Mover>,
    dest_dir: PathBuf,
    queue: SubtitleQueue,
    span: Span,
}

impl FileProcessor {
    pub fn new(
        mover: Arc<dyn Mover>,
        dest_dir: impl Into<PathBuf>,
        queue: SubtitleQueue,
        span: Span,
    ) -> Self {
        Self {
            mover,
            dest_dir: dest_dir.into(),
            queue,
            span,
        }
    }

    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// Move `path` into the destination directory.
    ///
    /// On success one subtitle task per language is queued for the
    /// destination path. A failed move, or one that reports no destination,
    /// queues nothing. The move itself is never retried.
    pub async fn process(&self, path: &MediaPath) -> Result<Option<PathBuf>, MoveError> {
        self.move_and_enqueue(path)
            .instrument(self.span.clone())
            .await
    }

    async fn move_and_enqueue(&self, path: &MediaPath) -> Result<Option<PathBuf>, MoveError> {
        let moved = match self.mover.move_file(path.as_path(), &self.dest_dir).await {
            Ok(moved) => moved,
            Err(e) => {
                error!(source = %path, error = %e, "move failed");
                return Err(e);
            }
        };

        let Some(destination) = moved else {
            warn!(source = %path, "mover reported no destination");
            return Ok(None);
        };

        info!(
            source = %path,
            destination = %destination.display(),
            "moved"
        );
        for language in SUBTITLE_LANGUAGES {
            self.queue
                .push(SubtitleTask::new(destination.clone(), language))
                .await;
        }

        Ok(Some(destination))
    }
}

#[async_trait]
impl MediaSink for FileProcessor {
    async fn accept(&self, path: MediaPath) {
        // Already logged; the move is not retried
        let _ = self.process(&path).await;
    }
}
