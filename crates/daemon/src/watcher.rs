//! Non-recursive watcher for the base directory.
//!
//! Each OS notification is reduced to a [`WatchNotification`], filtered by
//! kind, stat'ed and classified: directories are resolved to their largest
//! media file, plain files must match the media glob. Nothing is debounced;
//! duplicate notifications for one change are expected and downstream
//! handling tolerates them.

use crate::processor::MediaSink;
use crate::scan::{largest_media_file, matches_media_glob, MediaPath, MEDIA_GLOB};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, Instrument, Span};

/// Error type for the watch loop
#[derive(Debug, Error)]
pub enum WatchError {
    /// The notification backend failed or rejected the directory
    #[error("Filesystem watch error: {0}")]
    Backend(#[from] notify::Error),

    /// The base directory could not be resolved
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend dropped its event stream
    #[error("Filesystem event stream closed")]
    Closed,
}

/// Category of a directory change as reported by the host.
///
/// Appearance, removal and renaming of an entry all surface as `Rename`;
/// writes to an entry surface as `Change`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Rename,
    Change,
    Access,
    Other,
}

/// The only kinds acted upon.
pub const HANDLED_KINDS: [NotificationKind; 2] =
    [NotificationKind::Rename, NotificationKind::Change];

impl NotificationKind {
    pub fn is_handled(self) -> bool {
        HANDLED_KINDS.contains(&self)
    }
}

impl From<&EventKind> for NotificationKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) | EventKind::Remove(_) => NotificationKind::Rename,
            EventKind::Modify(ModifyKind::Name(_)) => NotificationKind::Rename,
            EventKind::Modify(_) => NotificationKind::Change,
            EventKind::Access(_) => NotificationKind::Access,
            EventKind::Any | EventKind::Other => NotificationKind::Other,
        }
    }
}

/// One change notification for a direct child of the base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchNotification {
    pub kind: NotificationKind,
    /// Entry name relative to the base directory
    pub raw_name: OsString,
}

/// Split a backend event into per-entry notifications.
///
/// Paths that are not direct children of `base` are dropped.
pub fn notifications_from_event(base: &Path, event: &Event) -> Vec<WatchNotification> {
    let kind = NotificationKind::from(&event.kind);
    event
        .paths
        .iter()
        .filter(|path| path.parent() == Some(base))
        .filter_map(|path| path.file_name())
        .map(|name| WatchNotification {
            kind,
            raw_name: name.to_os_string(),
        })
        .collect()
}

/// Resolve a notification to the media path it refers to, if any.
///
/// A failed stat means the entry vanished or is inaccessible; the
/// notification is dropped without error.
pub async fn classify(base: &Path, notification: &WatchNotification) -> Option<MediaPath> {
    if !notification.kind.is_handled() {
        return None;
    }

    let path = base.join(&notification.raw_name);
    let metadata = match tokio::fs::metadata(&path).await {
        Ok(metadata) => metadata,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "dropping notification");
            return None;
        }
    };

    if metadata.is_dir() {
        let dir = path.clone();
        return tokio::task::spawn_blocking(move || largest_media_file(&dir))
            .await
            .unwrap_or_else(|e| {
                debug!(path = %path.display(), error = %e, "largest file lookup aborted");
                None
            });
    }

    if metadata.is_file() && matches_media_glob(&notification.raw_name) {
        Some(MediaPath::new(path))
    } else {
        None
    }
}

/// Subscription to change notifications on one base directory.
pub struct DirectoryWatcher {
    base: PathBuf,
    events: mpsc::UnboundedReceiver<notify::Result<Event>>,
    _watcher: RecommendedWatcher,
    span: Span,
}

impl DirectoryWatcher {
    /// Subscribe to `base` (non-recursive).
    ///
    /// Notifications queue up from this point on, even before [`run`] is
    /// awaited.
    ///
    /// [`run`]: DirectoryWatcher::run
    pub fn watch(base: &Path, span: Span) -> Result<Self, WatchError> {
        // Backends report canonical paths on some hosts
        let base = std::fs::canonicalize(base)?;
        let (tx, events) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = tx.send(res);
            },
            notify::Config::default(),
        )?;
        watcher.watch(&base, RecursiveMode::NonRecursive)?;

        span.in_scope(|| info!(base = %base.display(), glob = MEDIA_GLOB, "watching"));

        Ok(Self {
            base,
            events,
            _watcher: watcher,
            span,
        })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Classify notifications and forward media paths to `sink` until the
    /// backend fails.
    ///
    /// Each notification is handled on its own task, so moves triggered by
    /// distinct notifications run concurrently.
    pub async fn run(mut self, sink: Arc<dyn MediaSink>) -> Result<(), WatchError> {
        while let Some(res) = self.events.recv().await {
            let event = res?;
            for notification in notifications_from_event(&self.base, &event) {
                if !notification.kind.is_handled() {
                    self.span.in_scope(|| {
                        debug!(
                            kind = ?notification.kind,
                            name = ?notification.raw_name,
                            "ignoring notification"
                        )
                    });
                    continue;
                }
                let base = self.base.clone();
                let sink = sink.clone();
                tokio::spawn(
                    async move {
                        if let Some(path) = classify(&base, &notification).await {
                            sink.accept(path).await;
                        }
                    }
                    .instrument(self.span.clone()),
                );
            }
        }
        Err(WatchError::Closed)
    }
}
