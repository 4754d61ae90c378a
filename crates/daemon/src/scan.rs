//! Media discovery for the watched directory.
//!
//! Recognizes files matching the media glob (`*.mkv`, `*.avi`, `*.mp4`) and
//! picks the largest of them inside a per-title subdirectory, which skips the
//! small preview or sample clips that often ship alongside the feature.

use std::ffi::OsStr;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Extensions accepted by the media glob. Fixed, not configurable.
pub const MEDIA_EXTENSIONS: [&str; 3] = ["mkv", "avi", "mp4"];

/// Display form of the media glob, used in log records.
pub const MEDIA_GLOB: &str = "*.{mkv,avi,mp4}";

/// Extension comparison follows the host filesystem convention.
const CASE_INSENSITIVE_GLOB: bool = cfg!(any(windows, target_os = "macos"));

/// Absolute path known, at classification time, to be a regular file
/// matching the media glob.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaPath(PathBuf);

impl MediaPath {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for MediaPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for MediaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// A media file found while listing a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEntry {
    /// Full path to the media file.
    pub path: PathBuf,
    /// File size in bytes at listing time.
    pub size_bytes: u64,
}

fn extension_matches(ext: &str) -> bool {
    if CASE_INSENSITIVE_GLOB {
        MEDIA_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext))
    } else {
        MEDIA_EXTENSIONS.contains(&ext)
    }
}

/// Checks a bare entry name against the media glob.
///
/// Like a shell `*`, the wildcard never matches a leading dot, so hidden
/// entries such as `.partial.mkv` are rejected.
pub fn matches_media_glob(name: &OsStr) -> bool {
    let Some(name) = name.to_str() else {
        return false;
    };
    if name.starts_with('.') {
        return false;
    }
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(extension_matches)
        .unwrap_or(false)
}

/// Lists regular files directly inside `dir` that match the media glob.
///
/// Entries come back in listing order (byte-wise by file name). Entries that
/// vanish or cannot be stat'ed mid-listing are skipped; failing to read
/// `dir` itself is an error.
pub fn list_media_files(dir: &Path) -> io::Result<Vec<MediaEntry>> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    let mut entries = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() || !matches_media_glob(entry.file_name()) {
            continue;
        }

        match entry.metadata() {
            Ok(metadata) => entries.push(MediaEntry {
                path: entry.into_path(),
                size_bytes: metadata.len(),
            }),
            Err(e) => debug!(error = %e, "skipping entry without metadata"),
        }
    }

    Ok(entries)
}

/// Picks the entry with the greatest size. Ties go to the first one.
pub fn select_largest(entries: Vec<MediaEntry>) -> Option<MediaEntry> {
    entries.into_iter().fold(None, |best, entry| match best {
        Some(current) if current.size_bytes >= entry.size_bytes => Some(current),
        _ => Some(entry),
    })
}

/// Returns the largest media file directly inside `dir`, if any.
///
/// A directory without matching files (or one that cannot be read) yields
/// `None`, which callers treat as a no-op.
pub fn largest_media_file(dir: &Path) -> Option<MediaPath> {
    let entries = match list_media_files(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "cannot list directory");
            return None;
        }
    };
    select_largest(entries).map(|entry| MediaPath::new(entry.path))
}
