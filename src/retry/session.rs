//! # Per-session retry state.
//!
//! [`RetrySession`] is owned by exactly one driver for the lifetime of one
//! session. It advances once per failed attempt and is discarded when the
//! session ends; nothing in it outlives the session.
//!
//! ## Decision step
//! ```text
//! elapsed >= max_elapsed_time  ──► Exhausted (no wait is drawn)
//! otherwise:
//!     wait             = randomize(current_interval)
//!     elapsed         += wait
//!     last_interval    = wait
//!     current_interval = grow(current_interval)
//!     attempt_count   += 1
//!     ──► RetryAfter(wait)
//! ```
//!
//! The last scheduled wait may carry `elapsed` past the budget; the session then
//! stops at the next decision. `current_interval` stays un-jittered, so jitter
//! never feeds back into growth.

use rand::Rng;

use crate::policies::BackoffPolicy;

/// Decision taken after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Wait this many milliseconds, then attempt again.
    RetryAfter(u64),
    /// Stop: the elapsed-time budget is used up.
    Exhausted,
}

/// Mutable state of one retry session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySession {
    current_interval_millis: u64,
    last_interval_millis: u64,
    elapsed_time_millis: u64,
    attempt_count: u32,
}

impl RetrySession {
    /// Starts a fresh session for `policy`.
    pub fn new(policy: &BackoffPolicy) -> Self {
        Self {
            current_interval_millis: policy.first_interval(),
            last_interval_millis: policy.config().initial_interval_millis(),
            elapsed_time_millis: 0,
            attempt_count: 0,
        }
    }

    /// Un-jittered interval the next wait will be drawn around.
    #[inline]
    pub fn current_interval_millis(&self) -> u64 {
        self.current_interval_millis
    }

    /// Interval handed to the operation as "how long the driver waited".
    ///
    /// Equals the initial interval until the first wait is scheduled.
    #[inline]
    pub fn last_interval_millis(&self) -> u64 {
        self.last_interval_millis
    }

    /// Sum of all scheduled waits.
    #[inline]
    pub fn elapsed_time_millis(&self) -> u64 {
        self.elapsed_time_millis
    }

    /// Number of waits scheduled so far (diagnostics only).
    #[inline]
    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// Runs the decision step after a failed attempt.
    ///
    /// On [`Decision::Exhausted`] the session is left untouched.
    pub fn decide<R: Rng + ?Sized>(&mut self, policy: &BackoffPolicy, rng: &mut R) -> Decision {
        if !policy.should_continue(self.elapsed_time_millis) {
            return Decision::Exhausted;
        }

        let wait = policy.randomize(self.current_interval_millis, rng);
        self.elapsed_time_millis = self.elapsed_time_millis.saturating_add(wait);
        self.last_interval_millis = wait;
        self.current_interval_millis = policy.grow(self.current_interval_millis);
        self.attempt_count = self.attempt_count.saturating_add(1);
        Decision::RetryAfter(wait)
    }
}
