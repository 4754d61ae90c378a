//! Single-worker subtitle queue with fixed-delay retries.
//!
//! Tasks drain strictly FIFO through one worker, so at most one fetch is
//! outstanding at any instant. A failed task frees the worker at once and is
//! appended to the tail again after [`SUBTITLE_RETRY_DELAY`], forever, until
//! a fetch succeeds.

use super::{SubtitleFetcher, SubtitleTask, SUBTITLE_RETRY_DELAY};
use crate::stats::{new_shared_stats, SharedQueueStats};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn, Instrument, Span};

/// Handle to a running subtitle queue.
///
/// Cloning the handle shares the same queue and worker. The worker stops once
/// every handle is dropped; retries still sleeping at that point are dropped.
#[derive(Clone)]
pub struct SubtitleQueue {
    tx: mpsc::UnboundedSender<SubtitleTask>,
    stats: SharedQueueStats,
}

impl SubtitleQueue {
    /// Start the queue with the fixed ten-minute retry delay.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(fetcher: Arc<dyn SubtitleFetcher>, span: Span) -> Self {
        Self::with_retry_delay(fetcher, SUBTITLE_RETRY_DELAY, span)
    }

    pub fn with_retry_delay(
        fetcher: Arc<dyn SubtitleFetcher>,
        retry_delay: Duration,
        span: Span,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let stats = new_shared_stats();

        let worker = Worker {
            rx,
            retry_tx: tx.downgrade(),
            fetcher,
            stats: stats.clone(),
            retry_delay,
            span: span.clone(),
        };
        tokio::spawn(worker.run().instrument(span));

        Self { tx, stats }
    }

    /// Append a task at the tail of the queue.
    pub async fn push(&self, task: SubtitleTask) {
        enqueue(&self.tx, &self.stats, task).await;
    }

    pub fn stats(&self) -> SharedQueueStats {
        self.stats.clone()
    }
}

async fn enqueue(
    tx: &mpsc::UnboundedSender<SubtitleTask>,
    stats: &SharedQueueStats,
    task: SubtitleTask,
) {
    stats.write().await.pending += 1;
    if let Err(mpsc::error::SendError(task)) = tx.send(task) {
        stats.write().await.pending -= 1;
        warn!(
            path = %task.filepath.display(),
            language = %task.language,
            "subtitle queue stopped, dropping task"
        );
    }
}

struct Worker {
    rx: mpsc::UnboundedReceiver<SubtitleTask>,
    retry_tx: mpsc::WeakUnboundedSender<SubtitleTask>,
    fetcher: Arc<dyn SubtitleFetcher>,
    stats: SharedQueueStats,
    retry_delay: Duration,
    span: Span,
}

impl Worker {
    async fn run(mut self) {
        while let Some(task) = self.rx.recv().await {
            {
                let mut stats = self.stats.write().await;
                stats.pending = stats.pending.saturating_sub(1);
                stats.in_flight = 1;
            }

            let outcome = self.fetcher.fetch(&task.filepath, task.language).await;

            let mut stats = self.stats.write().await;
            stats.in_flight = 0;
            match outcome {
                Ok(()) => {
                    stats.completed += 1;
                    drop(stats);
                    info!(
                        path = %task.filepath.display(),
                        language = %task.language,
                        "subtitles downloaded"
                    );
                }
                Err(e) => {
                    stats.failed_attempts += 1;
                    stats.waiting_retry += 1;
                    drop(stats);
                    error!(
                        path = %task.filepath.display(),
                        language = %task.language,
                        error = %e,
                        retry_in_secs = self.retry_delay.as_secs(),
                        "subtitle fetch failed"
                    );
                    self.schedule_retry(task);
                }
            }
        }
    }

    /// Re-append `task` at the tail once the retry delay elapses.
    fn schedule_retry(&self, task: SubtitleTask) {
        let retry_tx = self.retry_tx.clone();
        let stats = self.stats.clone();
        let delay = self.retry_delay;

        tokio::spawn(
            async move {
                tokio::time::sleep(delay).await;
                {
                    let mut stats = stats.write().await;
                    stats.waiting_retry = stats.waiting_retry.saturating_sub(1);
                }
                match retry_tx.upgrade() {
                    Some(tx) => enqueue(&tx, &stats, task).await,
                    None => warn!(
                        path = %task.filepath.display(),
                        language = %task.language,
                        "subtitle queue stopped before retry"
                    ),
                }
            }
            .instrument(self.span.clone()),
        );
    }
}
