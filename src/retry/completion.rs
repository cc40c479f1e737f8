//! # One-shot completion handle.
//!
//! Every attempt receives a [`Completion`]. The operation must eventually report
//! the attempt's outcome through it **exactly once**; all reporting methods take
//! `self` by value, so a second report does not compile.
//!
//! ## Caller obligations
//! - Report eventually. A completion that is held forever stalls the session
//!   (cancel the session to recover).
//! - A completion dropped without reporting counts as a failed attempt.
//! - Reporting after the session was cancelled is allowed and ignored.

use tokio::sync::oneshot;

use super::state::BackOffState;

/// Single-use handle reporting the outcome of one attempt.
#[derive(Debug)]
#[must_use = "the retry session stalls until the completion is reported"]
pub struct Completion {
    tx: oneshot::Sender<BackOffState>,
}

impl Completion {
    /// Creates a detached completion and the receiver it reports to.
    ///
    /// The driver creates one per attempt; this is public so operations can be
    /// unit-tested in isolation.
    pub fn channel() -> (Self, oneshot::Receiver<BackOffState>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Reports an explicit [`BackOffState`].
    pub fn report(self, state: BackOffState) {
        if self.tx.send(state).is_err() {
            tracing::trace!(?state, "completion reported after the session ended");
        }
    }

    /// Reports a plain success flag (`false` means "retry").
    pub fn complete(self, success: bool) {
        self.report(BackOffState::from_success(success));
    }

    /// Reports success.
    pub fn succeeded(self) {
        self.report(BackOffState::Succeeded);
    }

    /// Reports a retryable failure.
    pub fn failed(self) {
        self.report(BackOffState::Retry);
    }

    /// Reports a permanent failure; no further attempts will be made.
    pub fn abort(self) {
        self.report(BackOffState::Abort);
    }

    /// Returns `true` once nobody is waiting for this report anymore
    /// (the session was cancelled or finished).
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}
