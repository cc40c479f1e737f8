//! Error types used by retryvisor configuration and retry sessions.
//!
//! This module defines two error enums:
//!
//! - [`ConfigError`]: raised while constructing a [`BackoffConfig`](crate::BackoffConfig).
//! - [`RetryError`]: a non-success session outcome, for callers that prefer `Result`.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//!
//! Operation failures are **not** errors at this layer: an attempt that reports
//! [`BackOffState::Retry`](crate::BackOffState::Retry) is normal input for the retry loop.

use thiserror::Error;

/// # Errors produced while building a backoff configuration.
///
/// Validation happens once, at construction. Policy functions only ever see
/// configurations that passed these checks.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Multiplier is below 1.0 or not a finite number.
    #[error("multiplier must be a finite number >= 1.0, got {multiplier}")]
    InvalidMultiplier {
        /// The rejected multiplier.
        multiplier: f64,
    },

    /// Randomization factor is outside `[0, 1)` or not a number.
    #[error("randomization factor must be within [0, 1), got {factor}")]
    InvalidRandomizationFactor {
        /// The rejected factor.
        factor: f64,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use retryvisor::ConfigError;
    ///
    /// let err = ConfigError::InvalidMultiplier { multiplier: 0.5 };
    /// assert_eq!(err.as_label(), "config_invalid_multiplier");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::InvalidMultiplier { .. } => "config_invalid_multiplier",
            ConfigError::InvalidRandomizationFactor { .. } => "config_invalid_randomization_factor",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ConfigError::InvalidMultiplier { multiplier } => {
                format!("invalid multiplier: {multiplier}")
            }
            ConfigError::InvalidRandomizationFactor { factor } => {
                format!("invalid randomization factor: {factor}")
            }
        }
    }
}

/// # Non-success outcome of a retry session.
///
/// Produced by [`SessionReport::into_result`](crate::SessionReport::into_result).
/// Exhaustion is kept distinct from abort and cancellation so callers can
/// alert or escalate on "gave up" specifically.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetryError {
    /// The elapsed-time budget ran out before the operation succeeded.
    #[error("gave up after {attempts} attempts ({elapsed_time_millis}ms of backoff)")]
    Exhausted {
        /// Number of times the operation was invoked.
        attempts: u32,
        /// Total backoff time scheduled during the session.
        elapsed_time_millis: u64,
    },

    /// The operation reported [`BackOffState::Abort`](crate::BackOffState::Abort).
    #[error("aborted by operation on attempt {attempts}")]
    Aborted {
        /// Number of times the operation was invoked.
        attempts: u32,
    },

    /// The session was torn down through its cancellation token.
    #[error("session cancelled after {attempts} attempts")]
    Cancelled {
        /// Number of times the operation was invoked.
        attempts: u32,
    },
}

impl RetryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use retryvisor::RetryError;
    ///
    /// let err = RetryError::Exhausted { attempts: 3, elapsed_time_millis: 1500 };
    /// assert_eq!(err.as_label(), "retry_exhausted");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RetryError::Exhausted { .. } => "retry_exhausted",
            RetryError::Aborted { .. } => "retry_aborted",
            RetryError::Cancelled { .. } => "retry_cancelled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RetryError::Exhausted {
                attempts,
                elapsed_time_millis,
            } => format!("exhausted: attempts={attempts} elapsed={elapsed_time_millis}ms"),
            RetryError::Aborted { attempts } => format!("aborted: attempts={attempts}"),
            RetryError::Cancelled { attempts } => format!("cancelled: attempts={attempts}"),
        }
    }

    /// Number of times the operation was invoked before the session ended.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. }
            | RetryError::Aborted { attempts }
            | RetryError::Cancelled { attempts } => *attempts,
        }
    }

    /// Indicates whether the session ended because the time budget ran out.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display_mentions_value() {
        let err = ConfigError::InvalidRandomizationFactor { factor: 1.0 };
        assert_eq!(
            err.to_string(),
            "randomization factor must be within [0, 1), got 1"
        );
        assert_eq!(err.as_label(), "config_invalid_randomization_factor");
    }

    #[test]
    fn retry_error_labels_are_distinct() {
        let exhausted = RetryError::Exhausted {
            attempts: 4,
            elapsed_time_millis: 2500,
        };
        let aborted = RetryError::Aborted { attempts: 2 };
        let cancelled = RetryError::Cancelled { attempts: 1 };

        assert!(exhausted.is_exhausted());
        assert!(!aborted.is_exhausted());
        assert_ne!(exhausted.as_label(), aborted.as_label());
        assert_ne!(aborted.as_label(), cancelled.as_label());
        assert_eq!(exhausted.attempts(), 4);
        assert_eq!(cancelled.as_message(), "cancelled: attempts=1");
    }
}
