//! Subtitle retrieval for relocated media

pub mod fetcher;
pub mod queue;

pub use fetcher::{build_fetcher_command, CommandFetcher, FetchError, SubtitleFetcher};
pub use queue::SubtitleQueue;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Fixed wait between a failed fetch and its re-submission.
pub const SUBTITLE_RETRY_DELAY: Duration = Duration::from_secs(10 * 60);

/// Subtitle languages requested for every moved file, in enqueue order.
pub const SUBTITLE_LANGUAGES: [Language; 2] = [Language::Spanish, Language::English];

/// Languages the fetcher is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Spanish,
    English,
}

impl Language {
    /// ISO 639-2 code passed to the fetcher
    pub fn code(self) -> &'static str {
        match self {
            Language::Spanish => "spa",
            Language::English => "eng",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A pending request for one file in one language.
///
/// Carries no attempt counter: a task is retried until a fetch succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleTask {
    /// Post-move location of the media file
    pub filepath: PathBuf,
    pub language: Language,
}

impl SubtitleTask {
    pub fn new(filepath: PathBuf, language: Language) -> Self {
        Self { filepath, language }
    }
}
