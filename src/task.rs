//! Cooperative cancellation primitives
//!
//! Long operations (scans, update-check runs) execute on a dedicated
//! background task and poll a shared [`CancelToken`] at well-defined
//! checkpoints. Cancellation is never preemptive: a driver operation that is
//! mid-flight runs to its next checkpoint before the stopped state becomes
//! observable.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::CANCEL_POLL_INTERVAL_MS;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task was already started")]
    AlreadyStarted,

    #[error("task was never started")]
    NotStarted,

    #[error("task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Shared cancellation flag, cheap to clone and pass through function
/// boundaries. There is no ambient or thread-local signal: every function
/// that honors cancellation receives a token explicitly.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Sleeps for `duration`, returning early once cancellation is requested.
    ///
    /// The wait is sliced into [`CANCEL_POLL_INTERVAL_MS`] steps so the
    /// latency between a cancel request and the return is bounded by one
    /// polling interval.
    pub async fn delay(&self, duration: Duration) {
        let poll = Duration::from_millis(CANCEL_POLL_INTERVAL_MS);
        let mut remaining = duration;
        while !self.is_cancelled() && !remaining.is_zero() {
            let step = remaining.min(poll);
            tokio::time::sleep(step).await;
            remaining = remaining.saturating_sub(step);
        }
    }
}

/// A unit of work running off the interactive path with cooperative
/// cancellation.
///
/// Not reentrant: starting a task that was already started is a caller error
/// and fails with [`TaskError::AlreadyStarted`].
pub struct CancellableTask<T> {
    token: CancelToken,
    handle: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> CancellableTask<T> {
    pub fn new() -> Self {
        Self {
            token: CancelToken::new(),
            handle: None,
        }
    }

    /// The token handed to the spawned work; callers may clone it to observe
    /// or request cancellation from outside.
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Spawns the work onto the tokio runtime.
    pub fn start<F, Fut>(&mut self, work: F) -> Result<(), TaskError>
    where
        F: FnOnce(CancelToken) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        if self.handle.is_some() {
            return Err(TaskError::AlreadyStarted);
        }
        self.handle = Some(tokio::spawn(work(self.token.clone())));
        Ok(())
    }

    /// Requests cooperative cancellation. The work may take an unbounded time
    /// to honor it.
    pub fn request_cancellation(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| h.is_finished())
    }

    /// Waits for the work to finish and returns its output.
    pub async fn join(&mut self) -> Result<T, TaskError> {
        let handle = self.handle.take().ok_or(TaskError::NotStarted)?;
        Ok(handle.await?)
    }
}

impl<T: Send + 'static> Default for CancellableTask<T> {
    fn default() -> Self {
        Self::new()
    }
}
