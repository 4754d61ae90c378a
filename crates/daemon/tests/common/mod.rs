#![allow(dead_code)]

use async_trait::async_trait;
use mediadrop::{FetchError, Language, MoveError, Mover, SubtitleFetcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Mover that reports `dest_dir/<file name>` and records every source.
#[derive(Default)]
pub struct RecordingMover {
    calls: Mutex<Vec<PathBuf>>,
}

impl RecordingMover {
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mover for RecordingMover {
    async fn move_file(
        &self,
        source: &Path,
        dest_dir: &Path,
    ) -> Result<Option<PathBuf>, MoveError> {
        self.calls.lock().unwrap().push(source.to_path_buf());
        Ok(source.file_name().map(|name| dest_dir.join(name)))
    }
}

#[derive(Debug, Clone)]
pub struct FetchAttempt {
    pub file: PathBuf,
    pub language: Language,
    pub at: Instant,
}

/// Fetcher failing scripted `(file, language)` pairs a fixed number of times.
pub struct ScriptedFetcher {
    remaining_failures: Mutex<HashMap<(PathBuf, Language), usize>>,
    attempts: mpsc::UnboundedSender<FetchAttempt>,
}

impl ScriptedFetcher {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FetchAttempt>) {
        let (attempts, rx) = mpsc::unbounded_channel();
        let fetcher = Self {
            remaining_failures: Mutex::new(HashMap::new()),
            attempts,
        };
        (fetcher, rx)
    }

    pub fn fail_times(self, file: impl Into<PathBuf>, language: Language, times: usize) -> Self {
        self.remaining_failures
            .lock()
            .unwrap()
            .insert((file.into(), language), times);
        self
    }
}

#[async_trait]
impl SubtitleFetcher for ScriptedFetcher {
    async fn fetch(&self, file: &Path, language: Language) -> Result<(), FetchError> {
        let _ = self.attempts.send(FetchAttempt {
            file: file.to_path_buf(),
            language,
            at: Instant::now(),
        });

        let mut failures = self.remaining_failures.lock().unwrap();
        match failures.get_mut(&(file.to_path_buf(), language)) {
            Some(left) if *left > 0 => {
                *left -= 1;
                Err(FetchError::Other("provider unavailable".to_string()))
            }
            _ => Ok(()),
        }
    }
}
