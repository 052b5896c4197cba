//! Per-call execution context: an optional deadline and an optional
//! cancellation signal.
//!
//! The dispatcher races the transport against both. An explicit cancel is
//! reported as [`TransportError::Cancelled`], a passed deadline as
//! [`TransportError::DeadlineExceeded`], so callers can tell them apart.

use super::error::TransportError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

/// Deadline and cancellation scope for one or more requests.
///
/// Cloning is cheap; clones share the same cancellation signal.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Cancels every [`RequestContext`] derived from [`RequestContext::cancellable`].
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl RequestContext {
    /// No deadline and no cancellation; only the client's default timeout applies.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn timeout(timeout: Duration) -> Self {
        Self::background().and_timeout(timeout)
    }

    pub fn deadline(deadline: Instant) -> Self {
        Self::background().and_deadline(deadline)
    }

    /// A context plus the handle that cancels it.
    pub fn cancellable() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let ctx = Self {
            deadline: None,
            cancel: Some(rx),
        };
        (ctx, CancelHandle { tx: Arc::new(tx) })
    }

    /// Tighten the deadline to at most `timeout` from now. Never extends an
    /// existing deadline; the cancellation signal is kept.
    pub fn and_timeout(self, timeout: Duration) -> Self {
        self.and_deadline(Instant::now() + timeout)
    }

    pub fn and_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = earliest(self.deadline, Some(deadline));
        self
    }

    pub fn deadline_at(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    /// Drive `fut` to completion unless the context is cancelled or the
    /// effective deadline passes first. `fallback` is the client's default
    /// deadline for this call; the earlier of the two wins.
    pub(crate) async fn run<F>(
        &self,
        fallback: Option<Instant>,
        fut: F,
    ) -> Result<F::Output, TransportError>
    where
        F: Future,
    {
        let deadline = earliest(self.deadline, fallback);
        let mut cancel = self.cancel.clone();

        tokio::select! {
            biased;

            _ = wait_cancelled(cancel.as_mut()) => Err(TransportError::Cancelled),
            _ = wait_deadline(deadline) => Err(TransportError::DeadlineExceeded),
            output = fut => Ok(output),
        }
    }
}

fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

async fn wait_cancelled(rx: Option<&mut watch::Receiver<bool>>) {
    match rx {
        Some(rx) => {
            // A dropped handle that never cancelled leaves the context live.
            if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                std::future::pending::<()>().await;
            }
        }
        None => std::future::pending::<()>().await,
    }
}

async fn wait_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
