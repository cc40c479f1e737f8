//! # Backoff configuration.
//!
//! Provides [`BackoffConfig`], the immutable parameter set shared by every attempt
//! of a retry session (and by any number of concurrent sessions).
//!
//! A config can be created:
//! - **From defaults** with [`BackoffConfig::default`]
//! - **Field by field** with [`BackoffConfig::builder`] and a fallible `build()`
//! - **From a config file** with serde (feature `serde`), validated the same way
//!
//! ## Defaults
//! | field                     | default  |
//! |---------------------------|----------|
//! | `initial_interval_millis` | 500      |
//! | `max_interval_millis`     | 60 000   |
//! | `max_elapsed_time_millis` | 900 000  |
//! | `multiplier`              | 1.5      |
//! | `randomization_factor`    | 0.5      |
//!
//! ## Rules
//! - `multiplier` is finite and `>= 1.0`
//! - `randomization_factor` is within `[0, 1)`
//! - millisecond fields are unsigned, so they can never be negative
//!
//! ## Example
//! ```rust
//! use retryvisor::BackoffConfig;
//!
//! let cfg = BackoffConfig::builder()
//!     .with_initial_interval_millis(100)
//!     .with_multiplier(2.0)
//!     .with_randomization_factor(0.0)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(cfg.initial_interval_millis(), 100);
//! assert_eq!(cfg.max_interval_millis(), 60_000);
//!
//! assert!(BackoffConfig::builder().with_multiplier(0.9).build().is_err());
//! ```

use crate::error::ConfigError;

/// Default initial interval in milliseconds (0.5 seconds).
pub const DEFAULT_INITIAL_INTERVAL_MILLIS: u64 = 500;
/// Default cap on interval growth in milliseconds (1 minute).
pub const DEFAULT_MAX_INTERVAL_MILLIS: u64 = 60_000;
/// Default total backoff budget in milliseconds (15 minutes).
pub const DEFAULT_MAX_ELAPSED_TIME_MILLIS: u64 = 900_000;
/// Default growth factor (50% increase per backoff).
pub const DEFAULT_MULTIPLIER: f64 = 1.5;
/// Default randomization factor (intervals land between 50% below and 50% above).
pub const DEFAULT_RANDOMIZATION_FACTOR: f64 = 0.5;

/// Validated, immutable backoff parameters.
///
/// Fields are private so an invalid value can never be observed; use
/// [`BackoffConfig::builder`] to override them.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "BackoffConfigBuilder", into = "BackoffConfigBuilder")
)]
pub struct BackoffConfig {
    initial_interval_millis: u64,
    max_interval_millis: u64,
    max_elapsed_time_millis: u64,
    multiplier: f64,
    randomization_factor: f64,
}

impl Default for BackoffConfig {
    /// Returns the documented defaults (see module docs).
    fn default() -> Self {
        Self {
            initial_interval_millis: DEFAULT_INITIAL_INTERVAL_MILLIS,
            max_interval_millis: DEFAULT_MAX_INTERVAL_MILLIS,
            max_elapsed_time_millis: DEFAULT_MAX_ELAPSED_TIME_MILLIS,
            multiplier: DEFAULT_MULTIPLIER,
            randomization_factor: DEFAULT_RANDOMIZATION_FACTOR,
        }
    }
}

impl BackoffConfig {
    /// Starts a builder pre-filled with the defaults.
    pub fn builder() -> BackoffConfigBuilder {
        BackoffConfigBuilder::default()
    }

    /// Interval used for the first retry wait.
    #[inline]
    pub fn initial_interval_millis(&self) -> u64 {
        self.initial_interval_millis
    }

    /// Cap on the deterministic part of the interval.
    ///
    /// Jitter is applied after the cap, so a drawn interval may reach
    /// `max_interval_millis * (1 + randomization_factor)`.
    #[inline]
    pub fn max_interval_millis(&self) -> u64 {
        self.max_interval_millis
    }

    /// Total backoff budget across all attempts of one session.
    #[inline]
    pub fn max_elapsed_time_millis(&self) -> u64 {
        self.max_elapsed_time_millis
    }

    /// Growth factor applied to the interval after every failed attempt.
    #[inline]
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Half-width of the uniform jitter band, as a fraction of the interval.
    #[inline]
    pub fn randomization_factor(&self) -> f64 {
        self.randomization_factor
    }
}

/// Builder for [`BackoffConfig`].
///
/// Every field is independently overridable; unset fields keep their defaults.
/// Validation runs once, in [`BackoffConfigBuilder::build`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase", deny_unknown_fields)
)]
pub struct BackoffConfigBuilder {
    initial_interval_millis: u64,
    max_interval_millis: u64,
    max_elapsed_time_millis: u64,
    multiplier: f64,
    randomization_factor: f64,
}

impl Default for BackoffConfigBuilder {
    fn default() -> Self {
        BackoffConfig::default().into()
    }
}

impl BackoffConfigBuilder {
    /// Sets the initial interval (milliseconds).
    pub fn with_initial_interval_millis(mut self, millis: u64) -> Self {
        self.initial_interval_millis = millis;
        self
    }

    /// Sets the interval cap (milliseconds).
    pub fn with_max_interval_millis(mut self, millis: u64) -> Self {
        self.max_interval_millis = millis;
        self
    }

    /// Sets the elapsed-time budget (milliseconds).
    pub fn with_max_elapsed_time_millis(mut self, millis: u64) -> Self {
        self.max_elapsed_time_millis = millis;
        self
    }

    /// Sets the growth factor.
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Sets the randomization factor.
    pub fn with_randomization_factor(mut self, factor: f64) -> Self {
        self.randomization_factor = factor;
        self
    }

    /// Validates the parameters and freezes them into a [`BackoffConfig`].
    ///
    /// # Errors
    /// - [`ConfigError::InvalidMultiplier`] if `multiplier < 1.0` or not finite
    /// - [`ConfigError::InvalidRandomizationFactor`] if the factor is outside `[0, 1)`
    pub fn build(self) -> Result<BackoffConfig, ConfigError> {
        if !(self.multiplier.is_finite() && self.multiplier >= 1.0) {
            return Err(ConfigError::InvalidMultiplier {
                multiplier: self.multiplier,
            });
        }
        // NaN fails both comparisons.
        if !(self.randomization_factor >= 0.0 && self.randomization_factor < 1.0) {
            return Err(ConfigError::InvalidRandomizationFactor {
                factor: self.randomization_factor,
            });
        }

        Ok(BackoffConfig {
            initial_interval_millis: self.initial_interval_millis,
            max_interval_millis: self.max_interval_millis,
            max_elapsed_time_millis: self.max_elapsed_time_millis,
            multiplier: self.multiplier,
            randomization_factor: self.randomization_factor,
        })
    }
}

impl From<BackoffConfig> for BackoffConfigBuilder {
    fn from(cfg: BackoffConfig) -> Self {
        Self {
            initial_interval_millis: cfg.initial_interval_millis,
            max_interval_millis: cfg.max_interval_millis,
            max_elapsed_time_millis: cfg.max_elapsed_time_millis,
            multiplier: cfg.multiplier,
            randomization_factor: cfg.randomization_factor,
        }
    }
}

impl TryFrom<BackoffConfigBuilder> for BackoffConfig {
    type Error = ConfigError;

    fn try_from(builder: BackoffConfigBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = BackoffConfig::default();
        assert_eq!(cfg.initial_interval_millis(), 500);
        assert_eq!(cfg.max_interval_millis(), 60_000);
        assert_eq!(cfg.max_elapsed_time_millis(), 900_000);
        assert_eq!(cfg.multiplier(), 1.5);
        assert_eq!(cfg.randomization_factor(), 0.5);
    }

    #[test]
    fn builder_without_overrides_matches_default() {
        let cfg = BackoffConfig::builder().build().unwrap();
        assert_eq!(cfg, BackoffConfig::default());
    }

    #[test]
    fn builder_overrides_fields_independently() {
        let cfg = BackoffConfig::builder()
            .with_max_elapsed_time_millis(3_000)
            .build()
            .unwrap();
        assert_eq!(cfg.max_elapsed_time_millis(), 3_000);
        assert_eq!(cfg.initial_interval_millis(), DEFAULT_INITIAL_INTERVAL_MILLIS);
        assert_eq!(cfg.multiplier(), DEFAULT_MULTIPLIER);
    }

    #[test]
    fn rejects_multiplier_below_one() {
        let err = BackoffConfig::builder()
            .with_multiplier(0.99)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidMultiplier { multiplier: 0.99 });
    }

    #[test]
    fn rejects_non_finite_multiplier() {
        assert!(BackoffConfig::builder()
            .with_multiplier(f64::INFINITY)
            .build()
            .is_err());
        assert!(BackoffConfig::builder()
            .with_multiplier(f64::NAN)
            .build()
            .is_err());
    }

    #[test]
    fn accepts_multiplier_of_exactly_one() {
        let cfg = BackoffConfig::builder().with_multiplier(1.0).build().unwrap();
        assert_eq!(cfg.multiplier(), 1.0);
    }

    #[test]
    fn randomization_factor_bounds() {
        assert!(BackoffConfig::builder()
            .with_randomization_factor(0.0)
            .build()
            .is_ok());
        assert!(BackoffConfig::builder()
            .with_randomization_factor(0.999)
            .build()
            .is_ok());
        assert_eq!(
            BackoffConfig::builder()
                .with_randomization_factor(1.0)
                .build()
                .unwrap_err(),
            ConfigError::InvalidRandomizationFactor { factor: 1.0 }
        );
        assert!(BackoffConfig::builder()
            .with_randomization_factor(-0.1)
            .build()
            .is_err());
        assert!(BackoffConfig::builder()
            .with_randomization_factor(f64::NAN)
            .build()
            .is_err());
    }

    #[test]
    fn config_converts_back_into_builder() {
        let cfg = BackoffConfig::builder()
            .with_initial_interval_millis(42)
            .build()
            .unwrap();
        let again = BackoffConfigBuilder::from(cfg)
            .with_max_interval_millis(84)
            .build()
            .unwrap();
        assert_eq!(again.initial_interval_millis(), 42);
        assert_eq!(again.max_interval_millis(), 84);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_partial_camel_case() {
        let json = r#"{ "initialIntervalMillis": 250, "multiplier": 2.0 }"#;
        let cfg: BackoffConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.initial_interval_millis(), 250);
        assert_eq!(cfg.multiplier(), 2.0);
        assert_eq!(cfg.max_interval_millis(), DEFAULT_MAX_INTERVAL_MILLIS);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_rejects_invalid_factor() {
        let json = r#"{ "randomizationFactor": 1.5 }"#;
        let res: Result<BackoffConfig, _> = serde_json::from_str(json);
        assert!(res.is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_rejects_negative_millis() {
        let json = r#"{ "maxIntervalMillis": -1 }"#;
        let res: Result<BackoffConfig, _> = serde_json::from_str(json);
        assert!(res.is_err());
    }
}
