//! mediadrop
//!
//! Watches a drop directory for newly arrived media, moves each file into a
//! library through an external mover, and keeps retrying subtitle downloads
//! for every moved file until they succeed.

pub mod daemon;
pub mod mover;
pub mod processor;
pub mod scan;
pub mod startup;
pub mod stats;
pub mod subtitles;
pub mod watcher;

#[cfg(test)]
pub(crate) mod testing;

pub use daemon::{Daemon, DaemonError};
pub use mediadrop_config as config;
pub use mediadrop_config::Config;
pub use mover::{build_mover_command, parse_destination, CommandMover, MoveError, Mover};
pub use processor::{FileProcessor, MediaSink};
pub use scan::{
    largest_media_file, list_media_files, matches_media_glob, select_largest, MediaEntry,
    MediaPath, MEDIA_EXTENSIONS, MEDIA_GLOB,
};
pub use startup::{check_directory, run_startup_checks, scan_once, StartupError};
pub use stats::{new_shared_stats, QueueStats, SharedQueueStats};
pub use subtitles::{
    build_fetcher_command, CommandFetcher, FetchError, Language, SubtitleFetcher, SubtitleQueue,
    SubtitleTask, SUBTITLE_LANGUAGES, SUBTITLE_RETRY_DELAY,
};
pub use watcher::{
    classify, notifications_from_event, DirectoryWatcher, NotificationKind, WatchError,
    WatchNotification, HANDLED_KINDS,
};
