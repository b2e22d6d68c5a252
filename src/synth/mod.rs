//! Deterministic synthetic city data.
//!
//! Each domain splits generation into a pure `baseline(key, now)` (city hash,
//! time-of-day, day-of-week and daily drift) and a `synthesize` step that adds
//! bounded jitter from the caller's RNG and clamps to plausible ranges.

pub mod air_quality;
pub mod hash;
pub mod time;
pub mod transport;
pub mod weather;

use rand::Rng;

use crate::error::DashboardError;
use crate::models::Trend;

pub use hash::fnv1a_32;

/// Compare the mean of `predicted` against `current` with a fixed band.
pub fn classify_trend(
    current: f64,
    predicted: &[f64],
    threshold: f64,
    rising: Trend,
    falling: Trend,
) -> Trend {
    if predicted.is_empty() {
        return Trend::Stable;
    }
    let mean = predicted.iter().sum::<f64>() / predicted.len() as f64;
    if mean > current + threshold {
        rising
    } else if mean < current - threshold {
        falling
    } else {
        Trend::Stable
    }
}

/// Display confidence: `base` plus up to 10 points, capped at 95.
pub fn confidence<R: Rng + ?Sized>(base: u8, rng: &mut R) -> u8 {
    base.saturating_add(rng.gen_range(0..=10)).min(95)
}

/// Uniform integer noise in `[-spread, spread]`.
pub(crate) fn jitter<R: Rng + ?Sized>(rng: &mut R, spread: i32) -> f64 {
    if spread <= 0 {
        return 0.0;
    }
    f64::from(rng.gen_range(-spread..=spread))
}

pub(crate) fn ensure_finite(field: &str, value: f64) -> Result<f64, DashboardError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DashboardError::synthesis(format!("{field} is not finite ({value})")))
    }
}

pub(crate) fn clamp_round(value: f64, min: f64, max: f64) -> f64 {
    value.round().clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn trend_band() {
        let up = [30.0, 31.0, 32.0];
        let flat = [25.0, 26.0, 24.0];
        let down = [10.0, 11.0, 12.0];
        assert_eq!(classify_trend(25.0, &up, 2.0, Trend::Warming, Trend::Cooling), Trend::Warming);
        assert_eq!(classify_trend(25.0, &flat, 2.0, Trend::Warming, Trend::Cooling), Trend::Stable);
        assert_eq!(classify_trend(25.0, &down, 2.0, Trend::Warming, Trend::Cooling), Trend::Cooling);
        assert_eq!(classify_trend(25.0, &[], 2.0, Trend::Warming, Trend::Cooling), Trend::Stable);
    }

    #[test]
    fn confidence_stays_in_display_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let c = confidence(90, &mut rng);
            assert!((90..=95).contains(&c));
            let c = confidence(70, &mut rng);
            assert!((70..=80).contains(&c));
        }
    }

    #[test]
    fn non_finite_is_a_synthesis_failure() {
        assert!(ensure_finite("temp", 21.5).is_ok());
        assert!(matches!(
            ensure_finite("temp", f64::NAN),
            Err(DashboardError::SynthesisFailure(_))
        ));
    }
}
