//! Bounded waiting on the root task.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use rayon::ThreadPool;
use tokio_util::sync::CancellationToken;

use loadscan_core::ScanError;

/// Runs a job on the worker pool and waits for it at most `timeout`.
///
/// On expiry the job's cancellation token is cancelled so the task tree
/// stops at its next per-element check, and the caller gets
/// [`ScanError::Timeout`] straight away.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutGovernor {
    timeout: Duration,
}

impl TimeoutGovernor {
    /// Create a governor with the given bound.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// The configured bound.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Submit `job` to `pool` and wait for its result.
    ///
    /// A job that finishes after `cancel` was triggered by someone else
    /// yields [`ScanError::Cancelled`]: whatever it returned is partial.
    pub fn run<T, F>(&self, pool: &ThreadPool, cancel: &CancellationToken, job: F) -> Result<T, ScanError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded(1);

        pool.spawn(move || {
            // A panic here would reach rayon's panic handler and abort the
            // process; drop the sender instead so the caller sees WorkerLost.
            if let Ok(value) = catch_unwind(AssertUnwindSafe(job)) {
                let _ = tx.send(value);
            }
        });

        match rx.recv_timeout(self.timeout) {
            Ok(_) if cancel.is_cancelled() => Err(ScanError::Cancelled),
            Ok(value) => Ok(value),
            Err(RecvTimeoutError::Timeout) => {
                cancel.cancel();
                Err(ScanError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
            Err(RecvTimeoutError::Disconnected) => {
                cancel.cancel();
                Err(ScanError::WorkerLost)
            }
        }
    }
}
