use chrono::{DateTime, FixedOffset};
use rand::Rng;

use super::time::{DayPeriod, daily_drift, next_hours};
use super::{clamp_round, classify_trend, confidence, ensure_finite, fnv1a_32, jitter};
use crate::city::CityKey;
use crate::error::DashboardError;
use crate::models::{AirQualityMetrics, PredictionSet, Trend};

pub const AQI_RANGE: (f64, f64) = (10.0, 500.0);
const TREND_THRESHOLD_AQI: f64 = 20.0;
const DRIFT_AMPLITUDE_AQI: f64 = 12.0;
const BASE_CONFIDENCE: u8 = 70;

/// Category label for an AQI value.
pub fn aqi_status(aqi: u32) -> &'static str {
    match aqi {
        0..=50 => "Good",
        51..=100 => "Moderate",
        101..=150 => "Unhealthy for Sensitive Groups",
        151..=200 => "Unhealthy",
        201..=300 => "Very Unhealthy",
        _ => "Hazardous",
    }
}

/// Pollution shift for the time of day: traffic peaks push it up.
pub fn aqi_offset(at: DateTime<FixedOffset>) -> f64 {
    match DayPeriod::at(at) {
        DayPeriod::MorningRush | DayPeriod::EveningRush => 20.0,
        DayPeriod::Night => -12.0,
        DayPeriod::OffPeak => -8.0,
    }
}

/// Jitter-free air quality for a city at an instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirQualityBaseline {
    pub aqi: f64,
    pub pm25: f64,
    pub no2: f64,
    pub so2: f64,
    pub co: f64,
    pub o3: f64,
}

pub fn baseline(key: &CityKey, now: DateTime<FixedOffset>) -> AirQualityBaseline {
    let hash = fnv1a_32(key.as_str());
    let base_aqi = f64::from(30 + hash % 170);
    let base_pm25 = (base_aqi / 2.0 + f64::from(hash % 20) - 5.0).max(5.0);
    let city_offset = f64::from(hash % 15) - 7.0;
    let offset = aqi_offset(now);
    let rush = if DayPeriod::at(now).is_rush() { 1.2 } else { 1.0 };

    AirQualityBaseline {
        aqi: base_aqi + offset + (daily_drift(now) * DRIFT_AMPLITUDE_AQI).round() + city_offset,
        pm25: (base_pm25 + offset * 0.35 + f64::from(hash % 7) - 3.0).max(4.0),
        no2: f64::from(10 + (hash >> 4) % 60) * rush,
        so2: f64::from(5 + (hash >> 8) % 25),
        co: f64::from(200 + (hash >> 12) % 1200) * rush,
        o3: f64::from(20 + (hash >> 20) % 90),
    }
}

pub fn synthesize<R: Rng + ?Sized>(
    key: &CityKey,
    now: DateTime<FixedOffset>,
    rng: &mut R,
) -> Result<AirQualityMetrics, DashboardError> {
    let base = baseline(key, now);

    let aqi = ensure_finite("aqi", base.aqi + jitter(rng, 5))?;
    let aqi = clamp_round(aqi, AQI_RANGE.0, AQI_RANGE.1) as u32;
    let pm25 = ensure_finite("pm25", base.pm25 + jitter(rng, 2))?.round().max(4.0);

    Ok(AirQualityMetrics {
        aqi,
        pm25: pm25 as u32,
        pm10: (pm25 * 1.25).round() as u32,
        status: aqi_status(aqi).to_string(),
        no2: ensure_finite("no2", base.no2)?.round() as u32,
        so2: ensure_finite("so2", base.so2)?.round() as u32,
        co: ensure_finite("co", base.co)?.round() as u32,
        o3: ensure_finite("o3", base.o3)?.round() as u32,
    })
}

/// Six hourly AQI values following the rush-hour curve from `current`.
pub fn predict<R: Rng + ?Sized>(
    current: u32,
    now: DateTime<FixedOffset>,
    rng: &mut R,
) -> PredictionSet<u32> {
    let current = f64::from(current);
    let now_offset = aqi_offset(now);

    let raw: Vec<f64> = next_hours(now)
        .map(|at| {
            let value = current + aqi_offset(at) - now_offset + jitter(rng, 5);
            clamp_round(value, AQI_RANGE.0, AQI_RANGE.1)
        })
        .collect();

    PredictionSet {
        trend: classify_trend(current, &raw, TREND_THRESHOLD_AQI, Trend::Worsening, Trend::Improving),
        next_hours: raw.into_iter().map(|v| v as u32).collect(),
        confidence: confidence(BASE_CONFIDENCE, rng),
    }
}

pub fn fallback() -> (AirQualityMetrics, PredictionSet<u32>) {
    (
        AirQualityMetrics {
            aqi: 85,
            pm25: 45,
            pm10: 65,
            status: aqi_status(85).to_string(),
            no2: 25,
            so2: 15,
            co: 500,
            o3: 40,
        },
        PredictionSet {
            next_hours: vec![85, 90, 88, 86, 84, 85],
            trend: Trend::Stable,
            confidence: 70,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::normalize;
    use rand::{SeedableRng, rngs::StdRng};

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn status_bands() {
        assert_eq!(aqi_status(10), "Good");
        assert_eq!(aqi_status(50), "Good");
        assert_eq!(aqi_status(51), "Moderate");
        assert_eq!(aqi_status(150), "Unhealthy for Sensitive Groups");
        assert_eq!(aqi_status(200), "Unhealthy");
        assert_eq!(aqi_status(300), "Very Unhealthy");
        assert_eq!(aqi_status(301), "Hazardous");
    }

    #[test]
    fn rush_hour_is_dirtier_than_night() {
        let key = normalize("Lagos").unwrap();
        let rush = at("2024-03-04T08:00:00+00:00");
        let night = at("2024-03-04T02:00:00+00:00");
        assert!(aqi_offset(rush) > aqi_offset(night));

        let r = baseline(&key, rush);
        let n = baseline(&key, night);
        assert!(r.pm25 > n.pm25);
        assert!(r.no2 >= n.no2);
    }

    #[test]
    fn baseline_is_pure_and_seeded_output_reproducible() {
        let key = normalize("lagos").unwrap();
        let now = at("2024-03-04T18:45:00+01:00");
        assert_eq!(baseline(&key, now), baseline(&key, now));
        assert_eq!(
            synthesize(&key, now, &mut StdRng::seed_from_u64(9)).unwrap(),
            synthesize(&key, now, &mut StdRng::seed_from_u64(9)).unwrap()
        );
    }

    #[test]
    fn aqi_is_clamped() {
        let mut rng = StdRng::seed_from_u64(21);
        let now = at("2024-03-04T08:00:00+00:00");
        for i in 0..500 {
            let key = normalize(&format!("city {i}")).unwrap();
            let m = synthesize(&key, now, &mut rng).unwrap();
            assert!((10..=500).contains(&m.aqi));
            assert_eq!(m.status, aqi_status(m.aqi));
        }
    }

    #[test]
    fn predictions_clamp_and_classify() {
        let now = at("2024-03-04T02:00:00+00:00");
        let set = predict(10, now, &mut StdRng::seed_from_u64(2));
        assert_eq!(set.next_hours.len(), 6);
        assert!(set.next_hours.iter().all(|v| (10..=500).contains(v)));

        // 10:00 is the last rush hour, 11:00..16:00 are all off-peak
        let end_of_rush = at("2024-03-04T10:00:00+00:00");
        let set = predict(100, end_of_rush, &mut StdRng::seed_from_u64(2));
        assert_eq!(set.trend, Trend::Improving);
    }
}
