//! # LogWriter: structured event logger
//!
//! A subscriber that turns incoming [`Event`]s into `tracing` records under the
//! `retryvisor` target. Install any `tracing` subscriber to see them.
//!
//! ## Example output (with `tracing_subscriber::fmt`)
//! ```text
//! INFO  retryvisor: starting session="fetch" attempt=1 last_interval_ms=500 elapsed_ms=0
//! WARN  retryvisor: attempt failed session="fetch" attempt=1 reason="reported"
//! INFO  retryvisor: backoff scheduled session="fetch" after_attempt=1 delay_ms=612 elapsed_ms=612
//! INFO  retryvisor: succeeded session="fetch" attempt=2 elapsed_ms=612
//! ERROR retryvisor: exhausted session="fetch" attempts=9 elapsed_ms=16120
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let session = e.session.as_deref().unwrap_or("unknown");
        match e.kind {
            EventKind::SessionStarted => {
                tracing::info!(target: "retryvisor", session, "session started");
            }
            EventKind::AttemptStarting => {
                tracing::info!(
                    target: "retryvisor",
                    session,
                    attempt = e.attempt,
                    last_interval_ms = e.delay_ms,
                    elapsed_ms = e.elapsed_ms,
                    "starting"
                );
            }
            EventKind::AttemptSucceeded => {
                tracing::info!(
                    target: "retryvisor",
                    session,
                    attempt = e.attempt,
                    elapsed_ms = e.elapsed_ms,
                    "succeeded"
                );
            }
            EventKind::AttemptFailed => {
                tracing::warn!(
                    target: "retryvisor",
                    session,
                    attempt = e.attempt,
                    reason = e.reason.as_deref(),
                    "attempt failed"
                );
            }
            EventKind::AttemptAborted => {
                tracing::warn!(target: "retryvisor", session, attempt = e.attempt, "aborted");
            }
            EventKind::BackoffScheduled => {
                tracing::info!(
                    target: "retryvisor",
                    session,
                    after_attempt = e.attempt,
                    delay_ms = e.delay_ms,
                    elapsed_ms = e.elapsed_ms,
                    "backoff scheduled"
                );
            }
            EventKind::SessionExhausted => {
                tracing::error!(
                    target: "retryvisor",
                    session,
                    attempts = e.attempt,
                    elapsed_ms = e.elapsed_ms,
                    "exhausted"
                );
            }
            EventKind::SessionCancelled => {
                tracing::info!(target: "retryvisor", session, attempts = e.attempt, "cancelled");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(
                    target: "retryvisor",
                    subscriber = session,
                    reason = e.reason.as_deref(),
                    "subscriber overflow"
                );
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(
                    target: "retryvisor",
                    subscriber = session,
                    info = e.reason.as_deref().unwrap_or("unknown"),
                    "subscriber panicked"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
