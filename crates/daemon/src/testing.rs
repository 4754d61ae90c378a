//! Fakes for the external collaborators used across unit tests.

use crate::mover::{MoveError, Mover};
use crate::processor::MediaSink;
use crate::scan::MediaPath;
use crate::subtitles::{FetchError, Language, SubtitleFetcher};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// One recorded fetch attempt
#[derive(Debug, Clone)]
pub(crate) struct FetchCall {
    pub file: PathBuf,
    pub language: Language,
    pub at: Instant,
}

/// Fetcher that fails scripted `(file, language)` pairs a fixed number of times.
pub(crate) struct FakeFetcher {
    remaining_failures: Mutex<HashMap<(PathBuf, Language), usize>>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: mpsc::UnboundedSender<FetchCall>,
}

impl FakeFetcher {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FetchCall>) {
        let (calls, rx) = mpsc::unbounded_channel();
        let fetcher = Self {
            remaining_failures: Mutex::new(HashMap::new()),
            delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls,
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

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubtitleFetcher for FakeFetcher {
    async fn fetch(&self, file: &Path, language: Language) -> Result<(), FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _ = self.calls.send(FetchCall {
            file: file.to_path_buf(),
            language,
            at: Instant::now(),
        });

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let mut failures = self.remaining_failures.lock().unwrap();
        match failures.get_mut(&(file.to_path_buf(), language)) {
            Some(left) if *left > 0 => {
                *left -= 1;
                Err(FetchError::Other("no subtitles found".to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Mover that "moves" into `dest_dir/<file name>` without touching disk.
#[derive(Default)]
pub(crate) struct FakeMover {
    failing: HashSet<PathBuf>,
    silent: HashSet<PathBuf>,
    calls: Mutex<Vec<PathBuf>>,
}

impl FakeMover {
    pub fn failing_on(mut self, source: impl Into<PathBuf>) -> Self {
        self.failing.insert(source.into());
        self
    }

    pub fn silent_on(mut self, source: impl Into<PathBuf>) -> Self {
        self.silent.insert(source.into());
        self
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mover for FakeMover {
    async fn move_file(
        &self,
        source: &Path,
        dest_dir: &Path,
    ) -> Result<Option<PathBuf>, MoveError> {
        self.calls.lock().unwrap().push(source.to_path_buf());

        if self.failing.contains(source) {
            return Err(MoveError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "source vanished",
            )));
        }
        if self.silent.contains(source) {
            return Ok(None);
        }
        Ok(source.file_name().map(|name| dest_dir.join(name)))
    }
}

/// Sink that records every forwarded path and tracks overlap between calls.
pub(crate) struct RecordingSink {
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    accepted: Mutex<Vec<PathBuf>>,
    tx: mpsc::UnboundedSender<PathBuf>,
}

impl RecordingSink {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<PathBuf>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Self {
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            accepted: Mutex::new(Vec::new()),
            tx,
        };
        (sink, rx)
    }

    pub fn accepted(&self) -> Vec<PathBuf> {
        self.accepted.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaSink for RecordingSink {
    async fn accept(&self, path: MediaPath) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.accepted
            .lock()
            .unwrap()
            .push(path.as_path().to_path_buf());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let _ = self.tx.send(path.into_path_buf());
    }
}
