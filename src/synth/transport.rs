use chrono::{DateTime, FixedOffset};
use rand::Rng;

use super::time::{DayPeriod, daily_drift, is_weekend, next_hours};
use super::{clamp_round, classify_trend, confidence, ensure_finite, fnv1a_32, jitter};
use crate::city::CityKey;
use crate::error::DashboardError;
use crate::models::{PredictionSet, TrafficLevel, TransportMetrics, Trend};

const TREND_THRESHOLD_LEVELS: f64 = 0.5;
const DRIFT_AMPLITUDE_CONGESTION: f64 = 5.0;
const BASE_CONFIDENCE: u8 = 75;
const LEVEL_NOISE_CHANCE: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Network {
    buses: f64,
    metro: f64,
    level: TrafficLevel,
    congestion: f64,
}

const fn network(buses: f64, metro: f64, level: TrafficLevel, congestion: f64) -> Network {
    Network { buses, metro, level, congestion }
}

const KNOWN_CITIES: &[(&str, Network)] = &[
    ("delhi", network(45.0, 18.0, TrafficLevel::High, 85.0)),
    ("mumbai", network(52.0, 22.0, TrafficLevel::VeryHigh, 95.0)),
    ("bangalore", network(38.0, 12.0, TrafficLevel::High, 78.0)),
    ("chennai", network(35.0, 8.0, TrafficLevel::Moderate, 65.0)),
    ("kolkata", network(42.0, 15.0, TrafficLevel::High, 82.0)),
    ("hyderabad", network(32.0, 10.0, TrafficLevel::Moderate, 70.0)),
    ("pune", network(28.0, 6.0, TrafficLevel::Moderate, 68.0)),
    ("ahmedabad", network(25.0, 4.0, TrafficLevel::Moderate, 72.0)),
    ("jaipur", network(22.0, 2.0, TrafficLevel::Low, 45.0)),
    ("goa", network(15.0, 0.0, TrafficLevel::Low, 35.0)),
    ("shimla", network(8.0, 0.0, TrafficLevel::Low, 25.0)),
    ("manali", network(5.0, 0.0, TrafficLevel::Low, 20.0)),
];

fn network_for(key: &CityKey) -> Network {
    if let Some((_, known)) = KNOWN_CITIES.iter().find(|(name, _)| *name == key.as_str()) {
        return *known;
    }

    let hash = fnv1a_32(key.as_str());
    let congestion = f64::from(25 + (hash >> 2) % 71);
    Network {
        buses: f64::from(10 + hash % 45),
        metro: f64::from((hash >> 9) % 20),
        level: TrafficLevel::from_congestion(congestion),
        congestion,
    }
}

/// Multipliers and traffic level for one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile {
    pub bus_multiplier: f64,
    pub traffic_multiplier: f64,
    pub level: TrafficLevel,
    pub period: DayPeriod,
}

fn profile(base_level: TrafficLevel, at: DateTime<FixedOffset>) -> Profile {
    let period = DayPeriod::at(at);
    let weekend = is_weekend(at);

    let (bus_multiplier, traffic_multiplier, level) = if period == DayPeriod::Night {
        (0.3, 0.2, TrafficLevel::VeryLow)
    } else if period.is_rush() && !weekend {
        (1.6, 1.8, base_level.raised())
    } else if weekend {
        (0.8, 0.6, base_level.lowered())
    } else {
        (1.0, 1.0, base_level)
    };

    Profile { bus_multiplier, traffic_multiplier, level, period }
}

fn wait_minutes(period: DayPeriod) -> f64 {
    match period {
        DayPeriod::MorningRush | DayPeriod::EveningRush => 14.0,
        DayPeriod::Night => 25.0,
        DayPeriod::OffPeak => 6.0,
    }
}

fn speed_kmh(level: TrafficLevel) -> f64 {
    match level {
        TrafficLevel::VeryHigh => 17.0,
        TrafficLevel::High => 30.0,
        TrafficLevel::Moderate => 42.0,
        TrafficLevel::Low | TrafficLevel::VeryLow => 55.0,
    }
}

/// Jitter-free transport state for a city at an instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportBaseline {
    pub buses: f64,
    pub metro: f64,
    pub level: TrafficLevel,
    pub congestion: f64,
    pub wait_minutes: f64,
    pub active_routes: f64,
    pub speed_kmh: f64,
}

pub fn baseline(key: &CityKey, now: DateTime<FixedOffset>) -> TransportBaseline {
    let network = network_for(key);
    let profile = profile(network.level, now);
    let buses = network.buses * profile.bus_multiplier;

    TransportBaseline {
        buses,
        metro: network.metro,
        level: profile.level,
        congestion: network.congestion * profile.traffic_multiplier
            + daily_drift(now) * DRIFT_AMPLITUDE_CONGESTION,
        wait_minutes: wait_minutes(profile.period),
        active_routes: (buses * 0.85).round(),
        speed_kmh: speed_kmh(profile.level),
    }
}

pub fn synthesize<R: Rng + ?Sized>(
    key: &CityKey,
    now: DateTime<FixedOffset>,
    rng: &mut R,
) -> Result<TransportMetrics, DashboardError> {
    let base = baseline(key, now);

    let buses = ensure_finite("buses", base.buses + jitter(rng, 3))?;
    let metro = ensure_finite("metro", base.metro + jitter(rng, 2))?;
    let congestion = ensure_finite("congestionIndex", base.congestion + jitter(rng, 5))?;
    let wait = ensure_finite("avgWaitTime", base.wait_minutes + jitter(rng, 4))?;
    let speed = ensure_finite("speedKmh", base.speed_kmh + jitter(rng, 6))?;

    Ok(TransportMetrics {
        buses: clamp_round(buses, 3.0, f64::from(u32::MAX)) as u32,
        metro: metro.round().max(0.0) as u32,
        traffic: base.level,
        congestion_index: clamp_round(congestion, 0.0, 100.0) as u32,
        avg_wait_time: wait.round().max(1.0) as u32,
        active_routes: ensure_finite("activeRoutes", base.active_routes)?.max(0.0) as u32,
        speed_kmh: speed.round().max(5.0) as u32,
    })
}

/// Noise-free traffic level for each of the next six hours.
pub fn planned_levels(key: &CityKey, now: DateTime<FixedOffset>) -> Vec<TrafficLevel> {
    let base_level = network_for(key).level;
    next_hours(now).map(|at| profile(base_level, at).level).collect()
}

// Levels are discrete, so noise is an occasional one-step nudge; night stays VeryLow
fn nudge<R: Rng + ?Sized>(level: TrafficLevel, rng: &mut R) -> TrafficLevel {
    if level == TrafficLevel::VeryLow || !rng.gen_bool(LEVEL_NOISE_CHANCE) {
        return level;
    }
    if rng.gen_bool(0.5) { level.raised() } else { level.lowered() }
}

/// Traffic level for each of the next six hours, compared by ordinal
/// against `current`.
pub fn predict<R: Rng + ?Sized>(
    key: &CityKey,
    current: TrafficLevel,
    now: DateTime<FixedOffset>,
    rng: &mut R,
) -> PredictionSet<TrafficLevel> {
    let levels: Vec<TrafficLevel> = planned_levels(key, now)
        .into_iter()
        .map(|level| nudge(level, rng))
        .collect();
    let ordinals: Vec<f64> = levels.iter().map(|l| f64::from(l.ordinal())).collect();

    PredictionSet {
        trend: classify_trend(
            f64::from(current.ordinal()),
            &ordinals,
            TREND_THRESHOLD_LEVELS,
            Trend::Worsening,
            Trend::Improving,
        ),
        next_hours: levels,
        confidence: confidence(BASE_CONFIDENCE, rng),
    }
}

pub fn fallback() -> (TransportMetrics, PredictionSet<TrafficLevel>) {
    (
        TransportMetrics {
            buses: 35,
            metro: 12,
            traffic: TrafficLevel::Moderate,
            congestion_index: 65,
            avg_wait_time: 6,
            active_routes: 28,
            speed_kmh: 35,
        },
        PredictionSet {
            next_hours: vec![
                TrafficLevel::Moderate,
                TrafficLevel::High,
                TrafficLevel::Moderate,
                TrafficLevel::Moderate,
                TrafficLevel::Moderate,
                TrafficLevel::Moderate,
            ],
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

    // 2024-03-04 is a Monday, 2024-03-09 a Saturday
    const WEEKDAY_RUSH: &str = "2024-03-04T08:30:00+05:30";
    const WEEKDAY_NOON: &str = "2024-03-04T13:00:00+05:30";
    const SATURDAY_RUSH: &str = "2024-03-09T08:30:00+05:30";
    const NIGHT: &str = "2024-03-04T02:00:00+05:30";

    #[test]
    fn weekday_rush_raises_level_and_buses() {
        let key = normalize("Pune").unwrap();
        let rush = baseline(&key, at(WEEKDAY_RUSH));
        let noon = baseline(&key, at(WEEKDAY_NOON));
        assert_eq!(rush.level, TrafficLevel::High);
        assert_eq!(noon.level, TrafficLevel::Moderate);
        assert!(rush.buses > noon.buses);
        assert!(rush.wait_minutes > noon.wait_minutes);
    }

    #[test]
    fn weekend_reduces_frequency_and_traffic() {
        let key = normalize("Mumbai").unwrap();
        let weekday = baseline(&key, at(WEEKDAY_RUSH));
        let weekend = baseline(&key, at(SATURDAY_RUSH));
        assert_eq!(weekend.level, TrafficLevel::High);
        assert!(weekend.buses < weekday.buses);
        assert!(weekend.congestion < weekday.congestion);
    }

    #[test]
    fn night_is_very_low() {
        let key = normalize("delhi").unwrap();
        let night = baseline(&key, at(NIGHT));
        assert_eq!(night.level, TrafficLevel::VeryLow);
        assert!((night.buses - 45.0 * 0.3).abs() < 1e-9);
    }

    #[test]
    fn unknown_cities_get_their_own_network() {
        let now = at(WEEKDAY_NOON);
        let a = baseline(&normalize("Springfield").unwrap(), now);
        let b = baseline(&normalize("Shelbyville").unwrap(), now);
        assert_ne!(a, b);
        assert_eq!(a, baseline(&normalize("springfield.").unwrap(), now));
    }

    #[test]
    fn synthesized_values_are_clamped() {
        let mut rng = StdRng::seed_from_u64(4);
        for time in [WEEKDAY_RUSH, WEEKDAY_NOON, SATURDAY_RUSH, NIGHT] {
            for name in ["mumbai", "manali", "springfield", "x"] {
                let m = synthesize(&normalize(name).unwrap(), at(time), &mut rng).unwrap();
                assert!(m.buses >= 3);
                assert!(m.congestion_index <= 100);
                assert!(m.avg_wait_time >= 1);
            }
        }
    }

    #[test]
    fn predictions_follow_the_day() {
        let key = normalize("Delhi").unwrap();
        // 03:30 Monday -> 04:30..09:30, night then rush
        let now = at("2024-03-04T03:30:00+05:30");
        assert_eq!(
            planned_levels(&key, now),
            vec![
                TrafficLevel::VeryLow,
                TrafficLevel::VeryLow,
                TrafficLevel::High,
                TrafficLevel::VeryHigh,
                TrafficLevel::VeryHigh,
                TrafficLevel::VeryHigh,
            ]
        );
        let set = predict(&key, TrafficLevel::VeryLow, now, &mut StdRng::seed_from_u64(1));
        assert_eq!(set.trend, Trend::Worsening);

        // 20:00 Monday -> 21:00 off-peak, then night
        let evening = at("2024-03-04T20:00:00+05:30");
        let set = predict(&key, TrafficLevel::VeryHigh, evening, &mut StdRng::seed_from_u64(1));
        assert_eq!(set.trend, Trend::Improving);
        assert_eq!(set.next_hours.len(), 6);
    }

    #[test]
    fn noise_moves_at_most_one_level() {
        let key = normalize("Mumbai").unwrap();
        let now = at(WEEKDAY_NOON);
        let plan = planned_levels(&key, now);
        let mut rng = StdRng::seed_from_u64(9);

        let mut nudged = false;
        for _ in 0..200 {
            let set = predict(&key, TrafficLevel::Moderate, now, &mut rng);
            for (got, planned) in set.next_hours.iter().zip(&plan) {
                let step = i16::from(got.ordinal()) - i16::from(planned.ordinal());
                assert!(step.abs() <= 1);
                if *planned == TrafficLevel::VeryLow {
                    assert_eq!(got, planned);
                }
                nudged |= step != 0;
            }
        }
        assert!(nudged);
    }
}
