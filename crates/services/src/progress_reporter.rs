//! Background delivery of progress reports.
//!
//! Grading never waits on the network: reports go onto an unbounded queue and
//! a single worker posts them in order, retrying per [`RetryPolicy`]. A report
//! that runs out of attempts is logged and dropped. [`ReporterWorker::join`]
//! closes the queue, so reports submitted before it are still delivered while
//! later submissions are refused.

use std::sync::Arc;
use std::time::Duration;

use flashcards_core::model::ProgressReport;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::api::FlashcardApi;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one.
    #[must_use]
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff: max_backoff.max(initial_backoff),
        }
    }

    /// Single attempt, no retries.
    #[must_use]
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `retry` (1-based), doubling up to the cap.
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1_u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .map_or(self.max_backoff, |delay| delay.min(self.max_backoff))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(250), Duration::from_secs(2))
    }
}

/// Delivery counters returned when the worker shuts down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReportStats {
    pub delivered: u64,
    pub dropped: u64,
}

/// Cheap handle used to enqueue reports.
#[derive(Clone)]
pub struct ProgressReporter {
    tx: UnboundedSender<ProgressReport>,
}

/// Owns the worker task. Without a `join` the worker runs until every
/// `ProgressReporter` is dropped and the queue has drained.
pub struct ReporterWorker {
    handle: JoinHandle<ReportStats>,
    close: oneshot::Sender<()>,
}

impl ProgressReporter {
    /// Spawn the delivery worker on the current tokio runtime.
    #[must_use]
    pub fn spawn(
        api: Arc<dyn FlashcardApi>,
        policy: RetryPolicy,
    ) -> (ProgressReporter, ReporterWorker) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (close, close_rx) = oneshot::channel();
        let handle = tokio::spawn(run_worker(api, policy, rx, close_rx));
        (ProgressReporter { tx }, ReporterWorker { handle, close })
    }

    /// Queue a report without waiting. Returns `false` if the worker is gone.
    pub fn submit(&self, report: ProgressReport) -> bool {
        match self.tx.send(report) {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(
                    flashcard_id = %report.flashcard_id,
                    "progress worker stopped; report not queued"
                );
                false
            }
        }
    }
}

impl ReporterWorker {
    /// Stop accepting reports, deliver the ones already queued and return the
    /// counters. Live `ProgressReporter` clones do not hold this up.
    pub async fn join(self) -> ReportStats {
        let Self { handle, close } = self;
        // The worker may already be gone, in which case there is nothing to close.
        let _ = close.send(());
        match handle.await {
            Ok(stats) => stats,
            Err(err) => {
                tracing::error!(error = %err, "progress worker terminated abnormally");
                ReportStats::default()
            }
        }
    }
}

async fn run_worker(
    api: Arc<dyn FlashcardApi>,
    policy: RetryPolicy,
    mut rx: UnboundedReceiver<ProgressReport>,
    mut close: oneshot::Receiver<()>,
) -> ReportStats {
    let mut stats = ReportStats::default();
    let mut closing = false;
    loop {
        let next = tokio::select! {
            report = rx.recv() => report,
            signal = &mut close, if !closing => {
                closing = true;
                if signal.is_ok() {
                    rx.close();
                }
                continue;
            }
        };
        let Some(report) = next else { break };
        if deliver(api.as_ref(), policy, &report).await {
            stats.delivered += 1;
        } else {
            stats.dropped += 1;
        }
    }
    tracing::debug!(
        delivered = stats.delivered,
        dropped = stats.dropped,
        "progress worker finished"
    );
    stats
}

async fn deliver(api: &dyn FlashcardApi, policy: RetryPolicy, report: &ProgressReport) -> bool {
    for attempt in 1..=policy.max_attempts() {
        match api.post_progress(report).await {
            Ok(()) => return true,
            Err(err) if attempt < policy.max_attempts() => {
                tracing::warn!(
                    flashcard_id = %report.flashcard_id,
                    attempt,
                    error = %err,
                    "progress report failed; retrying"
                );
                sleep(policy.backoff(attempt)).await;
            }
            Err(err) => {
                tracing::error!(
                    flashcard_id = %report.flashcard_id,
                    attempts = attempt,
                    error = %err,
                    "progress report dropped"
                );
            }
        }
    }
    false
}
