//! # Lifecycle events emitted by retry sessions.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Attempt events**: one attempt's flow (starting, succeeded, failed, aborted)
//! - **Session events**: start, backoff scheduling, and terminal states (exhausted, cancelled)
//! - **Subscriber events**: fan-out problems (overflow, panic)
//!
//! The [`Event`] struct carries metadata such as timestamps, session name,
//! attempt number, backoff delay, and accumulated elapsed time.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use retryvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::BackoffScheduled)
//!     .with_session("fetch-profile")
//!     .with_attempt(3)
//!     .with_delay_ms(1_250)
//!     .with_elapsed_ms(2_000);
//!
//! assert_eq!(ev.kind, EventKind::BackoffScheduled);
//! assert_eq!(ev.session.as_deref(), Some("fetch-profile"));
//! assert_eq!(ev.delay_ms, Some(1_250));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of retry events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `session`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `session`: subscriber name
    /// - `reason`: "full" or "closed"
    SubscriberOverflow,

    // === Attempt events ===
    /// Session started; no attempt has run yet.
    ///
    /// Sets:
    /// - `session`: session name
    SessionStarted,

    /// Operation is being invoked.
    ///
    /// Sets:
    /// - `session`: session name
    /// - `attempt`: attempt number (1-based)
    /// - `delay_ms`: last interval handed to the operation
    /// - `elapsed_ms`: backoff time accumulated so far
    AttemptStarting,

    /// Operation reported success. Terminal.
    ///
    /// Sets:
    /// - `session`, `attempt`, `elapsed_ms`
    AttemptSucceeded,

    /// Operation reported failure (or dropped its completion handle).
    ///
    /// Sets:
    /// - `session`, `attempt`
    /// - `reason`: "reported" or "completion dropped"
    AttemptFailed,

    /// Operation asked the driver to stop retrying. Terminal.
    ///
    /// Sets:
    /// - `session`, `attempt`
    AttemptAborted,

    // === Session events ===
    /// Next attempt scheduled after a failure.
    ///
    /// Sets:
    /// - `session`: session name
    /// - `attempt`: the failed attempt number
    /// - `delay_ms`: wait before the next attempt
    /// - `elapsed_ms`: accumulated backoff including this wait
    BackoffScheduled,

    /// Elapsed-time budget exhausted; no further attempt. Terminal.
    ///
    /// Sets:
    /// - `session`, `attempt`
    /// - `elapsed_ms`: accumulated backoff (may exceed the budget by the last wait)
    SessionExhausted,

    /// Session torn down by its owner. Terminal.
    ///
    /// Sets:
    /// - `session`, `attempt` (attempts invoked so far)
    SessionCancelled,
}

impl EventKind {
    /// Returns `true` for kinds after which the session emits nothing more.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EventKind::AttemptSucceeded
                | EventKind::AttemptAborted
                | EventKind::SessionExhausted
                | EventKind::SessionCancelled
        )
    }
}

/// Retry event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Event classification.
    pub kind: EventKind,
    /// Name of the session (or subscriber, for subscriber events).
    pub session: Option<Arc<str>>,
    /// Attempt number (starting from 1).
    pub attempt: Option<u32>,
    /// Backoff interval in milliseconds.
    pub delay_ms: Option<u64>,
    /// Accumulated backoff time in milliseconds.
    pub elapsed_ms: Option<u64>,
    /// Human-readable reason (failure details, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            session: None,
            attempt: None,
            delay_ms: None,
            elapsed_ms: None,
            reason: None,
        }
    }

    /// Attaches a session name.
    #[inline]
    pub fn with_session(mut self, session: impl Into<Arc<str>>) -> Self {
        self.session = Some(session.into());
        self
    }

    /// Attaches an attempt number.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a backoff interval.
    #[inline]
    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches the accumulated elapsed time.
    #[inline]
    pub fn with_elapsed_ms(mut self, ms: u64) -> Self {
        self.elapsed_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_session(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_session(subscriber)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::SessionStarted);
        let b = Event::new(EventKind::AttemptStarting);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn terminal_kinds() {
        assert!(EventKind::AttemptSucceeded.is_terminal());
        assert!(EventKind::SessionExhausted.is_terminal());
        assert!(EventKind::SessionCancelled.is_terminal());
        assert!(EventKind::AttemptAborted.is_terminal());
        assert!(!EventKind::AttemptFailed.is_terminal());
        assert!(!EventKind::BackoffScheduled.is_terminal());
    }

    #[test]
    fn overflow_event_names_subscriber() {
        let ev = Event::subscriber_overflow("audit", "full");
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.session.as_deref(), Some("audit"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=audit reason=full"));
    }
}
