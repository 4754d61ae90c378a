//! Subtitle queue statistics
//!
//! A snapshot of the queue's state shared between the queue handle, the
//! worker loop and retry timers.

use std::sync::Arc;
use tokio::sync::RwLock;

/// Counters describing the subtitle queue at an instant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Tasks waiting in the queue
    pub pending: usize,
    /// Fetches currently running (never more than one)
    pub in_flight: usize,
    /// Tasks that reached their terminal success
    pub completed: u64,
    /// Failed fetch attempts, counting every retry
    pub failed_attempts: u64,
    /// Failed tasks sleeping until their retry delay elapses
    pub waiting_retry: usize,
}

impl QueueStats {
    /// Tasks not yet terminal, wherever they currently sit
    pub fn outstanding(&self) -> usize {
        self.pending + self.in_flight + self.waiting_retry
    }
}

/// Shared stats state for concurrent access across queue components
pub type SharedQueueStats = Arc<RwLock<QueueStats>>;

/// Create a new shared stats instance
pub fn new_shared_stats() -> SharedQueueStats {
    Arc::new(RwLock::new(QueueStats::default()))
}
