//! Backoff policies.
//!
//! This module groups the pure computations that decide **how long** to wait
//! between attempts and **whether** another attempt is allowed.
//!
//! ## Contents
//! - [`BackoffPolicy`] interval growth (initial / multiplier / cap) and the elapsed-time budget
//! - [`jitter`] symmetric randomization band used to avoid thundering herds
//!
//! ## Quick wiring
//! ```text
//! BackoffConfig ──► BackoffPolicy
//!      └─► retry::RetryDriver uses:
//!           - policy.should_continue(elapsed) to stop at the budget
//!           - policy.randomize(current) for the next wait
//!           - policy.grow(current) to advance the session
//! ```

mod backoff;
pub mod jitter;

pub use backoff::BackoffPolicy;
