//! Daemon construction and main loop for mediadrop
//!
//! Wires the subtitle queue, file processor, directory watcher and startup
//! scan together for one base/destination directory pair.

use crate::config::{Config, ConfigError};
use crate::mover::{CommandMover, Mover};
use crate::processor::{FileProcessor, MediaSink};
use crate::startup::{run_startup_checks, scan_once, StartupError};
use crate::subtitles::{CommandFetcher, SubtitleFetcher, SubtitleQueue};
use crate::watcher::{DirectoryWatcher, WatchError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, info_span};

/// Error type for daemon operations
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Startup check failed
    #[error("Startup check failed: {0}")]
    Startup(#[from] StartupError),

    /// The directory watch ended
    #[error("Watch error: {0}")]
    Watch(#[from] WatchError),
}

/// Daemon state containing all runtime components
pub struct Daemon {
    base_dir: PathBuf,
    dest_dir: PathBuf,
    processor: Arc<FileProcessor>,
    queue: SubtitleQueue,
}

impl Daemon {
    /// Build the daemon for one watched directory and one library directory
    ///
    /// Runs the startup checks and starts the subtitle worker, so it must be
    /// called from within a tokio runtime. Watching and the startup scan begin
    /// with [`run`].
    ///
    /// [`run`]: Daemon::run
    pub fn new(
        base_dir: impl Into<PathBuf>,
        dest_dir: impl Into<PathBuf>,
        mover: Arc<dyn Mover>,
        fetcher: Arc<dyn SubtitleFetcher>,
    ) -> Result<Self, DaemonError> {
        let base_dir = base_dir.into();
        let dest_dir = dest_dir.into();

        run_startup_checks(&base_dir, &dest_dir)?;

        let queue = SubtitleQueue::start(fetcher, info_span!("subtitles"));
        let processor = Arc::new(FileProcessor::new(
            mover,
            dest_dir.clone(),
            queue.clone(),
            info_span!("processor", dest = %dest_dir.display()),
        ));

        Ok(Self {
            base_dir,
            dest_dir,
            processor,
            queue,
        })
    }

    /// Build the daemon with command-backed collaborators from configuration
    pub fn from_config(config: &Config) -> Result<Self, DaemonError> {
        let (base_dir, dest_dir) = config.watch_dirs()?;
        let mover = Arc::new(CommandMover::new(
            config.mover.program.clone(),
            config.mover.args.clone(),
        ));
        let fetcher = Arc::new(CommandFetcher::new(
            config.subtitles.program.clone(),
            config.subtitles.args.clone(),
        ));
        Self::new(base_dir, dest_dir, mover, fetcher)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    pub fn queue(&self) -> &SubtitleQueue {
        &self.queue
    }

    pub fn processor(&self) -> Arc<FileProcessor> {
        self.processor.clone()
    }

    /// Run the daemon
    ///
    /// Subscribes to the base directory, then scans what is already there in
    /// the background. Returns only when the watch fails.
    pub async fn run(&self) -> Result<(), DaemonError> {
        info!(
            base = %self.base_dir.display(),
            dest = %self.dest_dir.display(),
            "mediadrop starting"
        );

        let watcher = DirectoryWatcher::watch(
            &self.base_dir,
            info_span!("watcher", base = %self.base_dir.display()),
        )?;
        let sink: Arc<dyn MediaSink> = self.processor.clone();

        let scan_base = watcher.base().to_path_buf();
        let scan_sink = sink.clone();
        tokio::spawn(async move {
            let span = info_span!("startup_scan");
            if let Err(e) = scan_once(&scan_base, scan_sink.as_ref(), span).await {
                error!(base = %scan_base.display(), error = %e, "startup scan failed");
            }
        });

        watcher.run(sink).await?;
        Ok(())
    }
}
