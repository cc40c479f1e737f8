//! # Attempt signals, driver states, and session outcomes.
//!
//! - [`BackOffState`] what an operation reports for one attempt
//! - [`DriverState`] where the driver is in its state machine
//! - [`Outcome`] / [`SessionReport`] how a session ended
//!
//! ## State machine
//! ```text
//!   Idle ──► Attempting ──► Succeeded
//!              │   │
//!              │   ├──────► Aborted
//!              │   ▼
//!              │  Deciding ──► Exhausted
//!              │   │
//!              │   ▼
//!              └─ Scheduled
//!
//!   Idle / Attempting / Scheduled ──► Cancelled
//! ```

use crate::error::RetryError;

/// Outcome an operation reports for one attempt through its [`Completion`](crate::Completion).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOffState {
    /// The attempt succeeded; the session ends.
    Succeeded,
    /// The attempt failed; back off and try again while the budget allows.
    Retry,
    /// The attempt failed permanently; stop without further attempts.
    Abort,
}

impl BackOffState {
    /// Maps a plain success flag: `true` → `Succeeded`, `false` → `Retry`.
    #[inline]
    pub fn from_success(success: bool) -> Self {
        if success {
            BackOffState::Succeeded
        } else {
            BackOffState::Retry
        }
    }
}

impl From<bool> for BackOffState {
    fn from(success: bool) -> Self {
        BackOffState::from_success(success)
    }
}

/// States of a [`RetryDriver`](crate::RetryDriver).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// No attempt in flight yet.
    Idle,
    /// Operation invoked; waiting for its completion.
    Attempting,
    /// Failure reported; consulting the policy.
    Deciding,
    /// Next attempt handed to the timer.
    Scheduled,
    /// Terminal: success reported.
    Succeeded,
    /// Terminal: elapsed-time budget exhausted.
    Exhausted,
    /// Terminal: operation reported [`BackOffState::Abort`].
    Aborted,
    /// Terminal: session torn down by its owner.
    Cancelled,
}

impl DriverState {
    /// Returns `true` for states the driver never leaves.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DriverState::Succeeded
                | DriverState::Exhausted
                | DriverState::Aborted
                | DriverState::Cancelled
        )
    }

    /// Returns `true` if `self → next` is a legal transition.
    pub fn can_transition_to(&self, next: DriverState) -> bool {
        use DriverState::*;
        matches!(
            (self, next),
            (Idle, Attempting)
                | (Idle, Cancelled)
                | (Attempting, Succeeded)
                | (Attempting, Deciding)
                | (Attempting, Aborted)
                | (Attempting, Cancelled)
                | (Deciding, Exhausted)
                | (Deciding, Scheduled)
                | (Scheduled, Attempting)
                | (Scheduled, Cancelled)
        )
    }
}

/// How a retry session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation reported success.
    Succeeded,
    /// The elapsed-time budget ran out.
    Exhausted,
    /// The operation reported [`BackOffState::Abort`].
    Aborted,
    /// The session was cancelled.
    Cancelled,
}

impl Outcome {
    /// Returns `true` only for [`Outcome::Succeeded`].
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded)
    }
}

impl From<Outcome> for DriverState {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Succeeded => DriverState::Succeeded,
            Outcome::Exhausted => DriverState::Exhausted,
            Outcome::Aborted => DriverState::Aborted,
            Outcome::Cancelled => DriverState::Cancelled,
        }
    }
}

/// Summary of a finished retry session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    /// How the session ended.
    pub outcome: Outcome,
    /// Number of times the operation was invoked.
    pub attempts: u32,
    /// Number of backoff waits scheduled.
    pub retries: u32,
    /// Total backoff time scheduled.
    pub elapsed_time_millis: u64,
    /// The most recent scheduled wait (the initial interval if none was scheduled).
    pub last_interval_millis: u64,
}

impl SessionReport {
    /// Returns `true` if the operation succeeded.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Converts the report into a `Result`, mapping every non-success outcome to
    /// the matching [`RetryError`].
    ///
    /// # Example
    /// ```
    /// use retryvisor::{Outcome, RetryError, SessionReport};
    ///
    /// let report = SessionReport {
    ///     outcome: Outcome::Exhausted,
    ///     attempts: 3,
    ///     retries: 2,
    ///     elapsed_time_millis: 1_500,
    ///     last_interval_millis: 1_000,
    /// };
    /// assert_eq!(
    ///     report.into_result(),
    ///     Err(RetryError::Exhausted { attempts: 3, elapsed_time_millis: 1_500 })
    /// );
    /// ```
    pub fn into_result(self) -> Result<SessionReport, RetryError> {
        match self.outcome {
            Outcome::Succeeded => Ok(self),
            Outcome::Exhausted => Err(RetryError::Exhausted {
                attempts: self.attempts,
                elapsed_time_millis: self.elapsed_time_millis,
            }),
            Outcome::Aborted => Err(RetryError::Aborted {
                attempts: self.attempts,
            }),
            Outcome::Cancelled => Err(RetryError::Cancelled {
                attempts: self.attempts,
            }),
        }
    }
}
