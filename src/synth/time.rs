use chrono::{DateTime, Datelike, FixedOffset, Timelike, Weekday};
use std::f64::consts::TAU;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Coarse traffic bands of the local day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPeriod {
    /// 22:00 to 05:59
    Night,
    /// 07:00 to 10:59
    MorningRush,
    /// 17:00 to 20:59
    EveningRush,
    OffPeak,
}

impl DayPeriod {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            22..=23 | 0..=5 => DayPeriod::Night,
            7..=10 => DayPeriod::MorningRush,
            17..=20 => DayPeriod::EveningRush,
            _ => DayPeriod::OffPeak,
        }
    }

    pub fn at(now: DateTime<FixedOffset>) -> Self {
        Self::from_hour(now.hour())
    }

    pub fn is_rush(self) -> bool {
        matches!(self, DayPeriod::MorningRush | DayPeriod::EveningRush)
    }
}

pub fn is_weekend(now: DateTime<FixedOffset>) -> bool {
    matches!(now.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Smooth oscillation in [-1, 1] with a 24h period, keyed off absolute time.
pub fn daily_drift(now: DateTime<FixedOffset>) -> f64 {
    let seconds = now.timestamp().rem_euclid(SECONDS_PER_DAY as i64) as f64;
    (TAU * seconds / SECONDS_PER_DAY).sin()
}

/// The next six hourly instants after `now`.
pub fn next_hours(now: DateTime<FixedOffset>) -> impl Iterator<Item = DateTime<FixedOffset>> {
    (1..=6).map(move |h| now + chrono::Duration::hours(h))
}
