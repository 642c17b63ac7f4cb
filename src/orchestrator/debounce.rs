//! Quiet-period debouncing for search input.

use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::trace;

struct Pending<T> {
    value: T,
    deadline: Instant,
}

/// Holds at most one pending value. Scheduling a new value cancels the
/// previous one and restarts the quiet period.
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn schedule(&mut self, value: T) {
        let deadline = Instant::now() + self.quiet;
        trace!(quiet_ms = self.quiet.as_millis() as u64, "debounce re-armed");
        self.pending = Some(Pending { value, deadline });
    }

    /// Drop the pending value without firing it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Resolve with the pending value once its quiet period elapses; never
    /// resolves while nothing is pending.
    ///
    /// Cancel safe: dropping the future before it resolves keeps the value
    /// pending, so this can sit in a `select!` loop.
    pub async fn fired(&mut self) -> T {
        let Some(deadline) = self.pending.as_ref().map(|p| p.deadline) else {
            return futures::future::pending().await;
        };
        sleep_until(deadline).await;
        match self.pending.take() {
            Some(p) => p.value,
            None => futures::future::pending().await,
        }
    }
}
