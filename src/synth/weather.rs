use chrono::{DateTime, FixedOffset, Timelike};
use rand::Rng;

use super::time::{DayPeriod, daily_drift, next_hours};
use super::{clamp_round, classify_trend, confidence, ensure_finite, fnv1a_32, jitter};
use crate::city::CityKey;
use crate::error::DashboardError;
use crate::models::{PredictionSet, Trend, WeatherMetrics};

pub const TEMP_RANGE: (f64, f64) = (-30.0, 60.0);
pub const HUMIDITY_RANGE: (f64, f64) = (10.0, 95.0);
const TREND_THRESHOLD_C: f64 = 2.0;
const DRIFT_AMPLITUDE_C: f64 = 3.0;
const BASE_CONFIDENCE: u8 = 75;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Climate {
    base_temp: f64,
    humidity: f64,
    desc: &'static str,
    icon: &'static str,
}

const fn climate(base_temp: f64, humidity: f64, desc: &'static str, icon: &'static str) -> Climate {
    Climate { base_temp, humidity, desc, icon }
}

const KNOWN_CITIES: &[(&str, Climate)] = &[
    ("delhi", climate(35.0, 68.0, "Hazy", "50d")),
    ("mumbai", climate(29.0, 87.0, "Light rain", "10d")),
    ("bangalore", climate(23.0, 52.0, "Pleasant", "02d")),
    ("chennai", climate(32.0, 78.0, "Hot and humid", "01d")),
    ("kolkata", climate(31.0, 82.0, "Muggy", "04d")),
    ("hyderabad", climate(28.0, 58.0, "Warm", "03d")),
    ("pune", climate(25.0, 48.0, "Moderate", "02d")),
    ("ahmedabad", climate(38.0, 42.0, "Very hot", "01d")),
    ("jaipur", climate(36.0, 38.0, "Dry heat", "01d")),
    ("goa", climate(30.0, 85.0, "Heavy rain", "10d")),
    ("shimla", climate(18.0, 65.0, "Cool", "03d")),
    ("manali", climate(15.0, 70.0, "Cold", "13d")),
];

const CONDITIONS: &[(&str, &str)] = &[
    ("Partly cloudy", "02d"),
    ("Clear", "01d"),
    ("Light rain", "10d"),
    ("Hazy", "50d"),
    ("Windy", "03d"),
    ("Overcast", "04d"),
];

fn climate_for(key: &CityKey) -> Climate {
    if let Some((_, known)) = KNOWN_CITIES.iter().find(|(name, _)| *name == key.as_str()) {
        return *known;
    }

    let hash = fnv1a_32(key.as_str());
    let (desc, icon) = CONDITIONS[((hash >> 2) % CONDITIONS.len() as u32) as usize];
    Climate {
        base_temp: f64::from(18 + hash % 18),
        humidity: f64::from(30 + (hash >> 3) % 60),
        desc,
        icon,
    }
}

/// Temperature shift for the local hour: cold small hours, warm afternoon.
pub fn temperature_offset(at: DateTime<FixedOffset>) -> f64 {
    match at.hour() {
        0..=5 => -5.0,
        6..=11 => 0.0,
        12..=17 => 3.0,
        18..=21 => -2.0,
        _ => -5.0,
    }
}

fn humidity_offset(at: DateTime<FixedOffset>) -> f64 {
    match (DayPeriod::at(at), at.hour()) {
        (DayPeriod::Night, _) => 6.0,
        (_, 12..=17) => -4.0,
        _ => 0.0,
    }
}

/// Jitter-free weather for a city at an instant.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherBaseline {
    pub temp: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pressure: f64,
    pub desc: String,
    pub icon: String,
}

pub fn baseline(key: &CityKey, now: DateTime<FixedOffset>) -> WeatherBaseline {
    let climate = climate_for(key);
    let hash = fnv1a_32(key.as_str());
    let night = DayPeriod::at(now) == DayPeriod::Night;

    let (desc, icon) = if night {
        (
            format!("Cool night, {}", climate.desc.to_lowercase()),
            night_icon(climate.icon),
        )
    } else {
        (climate.desc.to_string(), climate.icon.to_string())
    };

    WeatherBaseline {
        temp: climate.base_temp + temperature_offset(now) + daily_drift(now) * DRIFT_AMPLITUDE_C,
        humidity: climate.humidity + humidity_offset(now),
        wind_speed: f64::from(5 + (hash >> 7) % 8),
        pressure: f64::from(1008 + (hash >> 11) % 11),
        desc,
        icon,
    }
}

fn night_icon(icon: &str) -> String {
    match icon.strip_suffix('d') {
        Some(code) => format!("{code}n"),
        None => icon.to_string(),
    }
}

pub fn synthesize<R: Rng + ?Sized>(
    key: &CityKey,
    now: DateTime<FixedOffset>,
    rng: &mut R,
) -> Result<WeatherMetrics, DashboardError> {
    let base = baseline(key, now);

    let temp = ensure_finite("temp", base.temp + jitter(rng, 1))?;
    let humidity = ensure_finite("humidity", base.humidity + jitter(rng, 4))?;
    let wind = ensure_finite("windSpeed", base.wind_speed + jitter(rng, 2))?;
    let pressure = ensure_finite("pressure", base.pressure + jitter(rng, 5))?;

    Ok(WeatherMetrics {
        temp: clamp_round(temp, TEMP_RANGE.0, TEMP_RANGE.1) as i32,
        humidity: clamp_round(humidity, HUMIDITY_RANGE.0, HUMIDITY_RANGE.1) as u8,
        desc: base.desc,
        icon: base.icon,
        wind_speed: clamp_round(wind, 0.0, 200.0) as u32,
        pressure: clamp_round(pressure, 870.0, 1085.0) as u32,
    })
}

/// Six hourly temperatures following the diurnal curve from `current`.
pub fn predict<R: Rng + ?Sized>(
    current: i32,
    now: DateTime<FixedOffset>,
    rng: &mut R,
) -> PredictionSet<i32> {
    let current = f64::from(current);
    let now_offset = temperature_offset(now);

    let raw: Vec<f64> = next_hours(now)
        .map(|at| {
            let value = current + temperature_offset(at) - now_offset + jitter(rng, 1);
            clamp_round(value, TEMP_RANGE.0, TEMP_RANGE.1)
        })
        .collect();

    PredictionSet {
        trend: classify_trend(current, &raw, TREND_THRESHOLD_C, Trend::Warming, Trend::Cooling),
        next_hours: raw.into_iter().map(|t| t as i32).collect(),
        confidence: confidence(BASE_CONFIDENCE, rng),
    }
}

pub fn fallback() -> (WeatherMetrics, PredictionSet<i32>) {
    (
        WeatherMetrics {
            temp: 25,
            humidity: 65,
            desc: "Partly cloudy".to_string(),
            icon: "02d".to_string(),
            wind_speed: 10,
            pressure: 1013,
        },
        PredictionSet {
            next_hours: vec![25, 26, 27, 27, 26, 25],
            trend: Trend::Stable,
            confidence: 70,
        },
    )
}
