//! # Jitter for retry intervals.
//!
//! Spreads retries from many callers apart so they don't all fire at the same
//! moment after a shared outage (thundering herd).
//!
//! The interval is perturbed symmetrically: with randomization factor `rf`, the
//! result is drawn uniformly from the closed band
//! ```text
//! [interval × (1 − rf), interval × (1 + rf)]
//! ```
//! and rounded to whole milliseconds. `rf = 0` disables jitter entirely.
//!
//! The random source is always passed in, never taken from a global, so tests can
//! seed it and concurrent sessions don't contend on shared state.

use rand::Rng;

/// Returns the closed jitter band `(low, high)` for `interval_millis`.
#[inline]
pub fn jitter_bounds(interval_millis: u64, factor: f64) -> (f64, f64) {
    let base = interval_millis as f64;
    (base * (1.0 - factor), base * (1.0 + factor))
}

/// Draws a randomized interval from the jitter band around `interval_millis`.
///
/// ### Notes
/// - `factor` must already be validated to `[0, 1)`.
/// - Rounding never escapes the band: the result is clamped to the integer
///   milliseconds inside `[low, high]`.
pub fn randomize<R: Rng + ?Sized>(interval_millis: u64, factor: f64, rng: &mut R) -> u64 {
    if factor == 0.0 || interval_millis == 0 {
        return interval_millis;
    }

    let (low, high) = jitter_bounds(interval_millis, factor);
    let drawn = rng.random_range(low..=high);

    let upper = high.floor();
    let lower = low.ceil().min(upper);
    drawn.round().clamp(lower, upper) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn zero_factor_is_identity() {
        let mut rng = StdRng::seed_from_u64(1);
        for ms in [0, 1, 500, 60_000] {
            assert_eq!(randomize(ms, 0.0, &mut rng), ms);
        }
    }

    #[test]
    fn zero_interval_stays_zero() {
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(randomize(0, 0.5, &mut rng), 0);
    }

    #[test]
    fn bounds_are_symmetric() {
        assert_eq!(jitter_bounds(1000, 0.5), (500.0, 1500.0));
        assert_eq!(jitter_bounds(1000, 0.0), (1000.0, 1000.0));
    }

    #[test]
    fn draws_stay_inside_band() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10_000 {
            let ms = randomize(1000, 0.5, &mut rng);
            assert!((500..=1500).contains(&ms), "drawn {ms} outside [500, 1500]");
        }
    }

    #[test]
    fn draws_cover_both_halves_of_band() {
        let mut rng = StdRng::seed_from_u64(4);
        let (mut below, mut above) = (false, false);
        for _ in 0..1_000 {
            let ms = randomize(1000, 0.5, &mut rng);
            below |= ms < 900;
            above |= ms > 1100;
        }
        assert!(below && above, "jitter band looks one-sided");
    }

    #[test]
    fn narrow_fractional_band_rounds_inside() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..1_000 {
            // band is [2.7, 3.3]: only 3 is an integer inside it
            assert_eq!(randomize(3, 0.1, &mut rng), 3);
        }
    }
}
