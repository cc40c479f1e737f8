//! # Delayed-invocation primitive.
//!
//! The driver never waits on its own; it hands every backoff interval to a
//! [`Timer`]. Cancellation is layered on top by the driver (the wait is raced
//! against the session's `CancellationToken`), so implementations only need to
//! resolve after roughly `delay`.
//!
//! [`TokioTimer`] is the default and honours `tokio::time::pause()`, which is what
//! the tests use to run long backoff schedules instantly.

use std::time::Duration;

use async_trait::async_trait;

/// Waits for a backoff interval to pass.
#[async_trait]
pub trait Timer: Send + Sync + 'static {
    /// Resolves once `delay` has elapsed.
    async fn sleep(&self, delay: Duration);
}

/// [`Timer`] backed by `tokio::time::sleep`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn tokio_timer_waits_for_delay() {
        let start = Instant::now();
        TokioTimer.sleep(Duration::from_millis(1_500)).await;
        assert!(start.elapsed() >= Duration::from_millis(1_500));
    }
}
