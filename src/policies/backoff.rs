//! # Exponential backoff policy.
//!
//! [`BackoffPolicy`] is pure computation over a validated [`BackoffConfig`]:
//! - [`BackoffPolicy::next_interval`] grows an interval by `multiplier`, caps it at
//!   `max_interval_millis`, then applies jitter;
//! - [`BackoffPolicy::should_continue`] checks an elapsed time against the budget.
//!
//! The cap bounds the growth curve, not the random draw: once the deterministic
//! part saturates at `max_interval_millis`, jitter may still return values up to
//! `max_interval_millis × (1 + randomization_factor)`.
//!
//! # Example
//! ```rust
//! use rand::{SeedableRng, rngs::StdRng};
//! use retryvisor::{BackoffConfig, BackoffPolicy};
//!
//! let cfg = BackoffConfig::builder()
//!     .with_multiplier(2.0)
//!     .with_randomization_factor(0.0)
//!     .with_max_interval_millis(2_000)
//!     .with_max_elapsed_time_millis(3_000)
//!     .build()
//!     .unwrap();
//! let policy = BackoffPolicy::new(cfg);
//! let mut rng = StdRng::seed_from_u64(0);
//!
//! assert_eq!(policy.next_interval(500, &mut rng), 1_000);
//! assert_eq!(policy.next_interval(1_500, &mut rng), 2_000); // capped
//!
//! assert!(policy.should_continue(2_999));
//! assert!(!policy.should_continue(3_000));
//! ```

use rand::Rng;

use crate::config::BackoffConfig;
use crate::policies::jitter;

/// Exponential backoff computations bound to one configuration.
///
/// Cheap to copy; holds nothing but the immutable config.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BackoffPolicy {
    cfg: BackoffConfig,
}

impl From<BackoffConfig> for BackoffPolicy {
    fn from(cfg: BackoffConfig) -> Self {
        Self::new(cfg)
    }
}

impl BackoffPolicy {
    /// Creates a policy over an already validated configuration.
    pub fn new(cfg: BackoffConfig) -> Self {
        Self { cfg }
    }

    /// Returns the underlying configuration.
    #[inline]
    pub fn config(&self) -> &BackoffConfig {
        &self.cfg
    }

    /// Un-jittered interval for the first retry: the initial interval, capped.
    #[inline]
    pub fn first_interval(&self) -> u64 {
        self.cfg
            .initial_interval_millis()
            .min(self.cfg.max_interval_millis())
    }

    /// Deterministic growth step: `min(current × multiplier, max_interval_millis)`.
    ///
    /// Overflow to infinity saturates at the cap.
    pub fn grow(&self, current: u64) -> u64 {
        let cap = self.cfg.max_interval_millis();
        let grown = current as f64 * self.cfg.multiplier();

        if !grown.is_finite() || grown >= cap as f64 {
            cap
        } else {
            grown.round() as u64
        }
    }

    /// Applies jitter to an interval using the configured randomization factor.
    #[inline]
    pub fn randomize<R: Rng + ?Sized>(&self, interval: u64, rng: &mut R) -> u64 {
        jitter::randomize(interval, self.cfg.randomization_factor(), rng)
    }

    /// Computes the next randomized interval after `current`.
    ///
    /// Equivalent to `randomize(grow(current))`:
    /// - the result is never negative;
    /// - it never exceeds `max_interval_millis × (1 + randomization_factor)`;
    /// - with `randomization_factor = 0` it equals [`grow`](Self::grow) exactly.
    pub fn next_interval<R: Rng + ?Sized>(&self, current: u64, rng: &mut R) -> u64 {
        self.randomize(self.grow(current), rng)
    }

    /// Returns `true` iff `elapsed_time_millis` is strictly below the budget.
    ///
    /// An elapsed time equal to `max_elapsed_time_millis` does **not** continue.
    #[inline]
    pub fn should_continue(&self, elapsed_time_millis: u64) -> bool {
        elapsed_time_millis < self.cfg.max_elapsed_time_millis()
    }
}
