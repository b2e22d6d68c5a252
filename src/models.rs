use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Query string shared by the city endpoints. A repeated `city` keeps the
/// first non-blank value instead of rejecting the request; unknown
/// parameters are ignored.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CityQuery {
    pub city: Option<String>,
}

impl<'de> Deserialize<'de> for CityQuery {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CityQueryVisitor;

        impl<'de> Visitor<'de> for CityQueryVisitor {
            type Value = CityQuery;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a query string")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<CityQuery, A::Error> {
                let mut city: Option<String> = None;
                while let Some(name) = map.next_key::<String>()? {
                    if name != "city" {
                        map.next_value::<IgnoredAny>()?;
                        continue;
                    }
                    let value: String = map.next_value()?;
                    if city.as_deref().is_none_or(|c| c.trim().is_empty()) {
                        city = Some(value);
                    }
                }
                Ok(CityQuery { city })
            }
        }

        deserializer.deserialize_map(CityQueryVisitor)
    }
}

// Where a payload came from, shown by the UI as a banner when not live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceTag {
    LiveProvider,
    Synthetic,
    StaticFallback,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::LiveProvider => "live-provider",
            SourceTag::Synthetic => "synthetic",
            SourceTag::StaticFallback => "static-fallback",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Weather,
    AirQuality,
    Transport,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Weather => "weather",
            Domain::AirQuality => "airquality",
            Domain::Transport => "transport",
        }
    }

    pub const fn all() -> &'static [Domain] {
        &[Domain::Weather, Domain::AirQuality, Domain::Transport]
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Worsening,
    Improving,
    Warming,
    Cooling,
    Stable,
}

/// Ordered from calmest to busiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrafficLevel {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl TrafficLevel {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_congestion(index: f64) -> Self {
        match index {
            i if i < 40.0 => TrafficLevel::Low,
            i if i < 65.0 => TrafficLevel::Moderate,
            i if i < 85.0 => TrafficLevel::High,
            _ => TrafficLevel::VeryHigh,
        }
    }

    /// One step busier, saturating at `VeryHigh`.
    pub fn raised(self) -> Self {
        match self {
            TrafficLevel::VeryLow => TrafficLevel::Low,
            TrafficLevel::Low => TrafficLevel::Moderate,
            TrafficLevel::Moderate => TrafficLevel::High,
            TrafficLevel::High | TrafficLevel::VeryHigh => TrafficLevel::VeryHigh,
        }
    }

    /// One step calmer, but never below `Low` (only night is `VeryLow`).
    pub fn lowered(self) -> Self {
        match self {
            TrafficLevel::VeryHigh => TrafficLevel::High,
            TrafficLevel::High => TrafficLevel::Moderate,
            TrafficLevel::Moderate | TrafficLevel::Low | TrafficLevel::VeryLow => TrafficLevel::Low,
        }
    }
}

/// Six hourly forecasts plus a trend and a display confidence (a
/// presentation heuristic, not a statistical interval).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionSet<V> {
    pub next_hours: Vec<V>,
    pub trend: Trend,
    pub confidence: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherMetrics {
    pub temp: i32,
    pub humidity: u8,
    pub desc: String,
    pub icon: String,
    pub wind_speed: u32,
    pub pressure: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub city: String,
    pub weather: WeatherMetrics,
    pub predictions: PredictionSet<i32>,
    pub source: SourceTag,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualityMetrics {
    pub aqi: u32,
    pub pm25: u32,
    pub pm10: u32,
    pub status: String,
    pub no2: u32,
    pub so2: u32,
    pub co: u32,
    pub o3: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualityReport {
    pub city: String,
    pub air_quality: AirQualityMetrics,
    pub predictions: PredictionSet<u32>,
    pub source: SourceTag,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportMetrics {
    pub buses: u32,
    pub metro: u32,
    pub traffic: TrafficLevel,
    pub congestion_index: u32,
    pub avg_wait_time: u32,
    pub active_routes: u32,
    pub speed_kmh: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportReport {
    pub transport: TransportMetrics,
    pub predictions: PredictionSet<TrafficLevel>,
    pub source: SourceTag,
    pub updated_at: String,
}

// Insights panel: rule-of-thumb advice derived from the cached readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Weather,
    AirQuality,
    Transport,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub icon: String,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsReport {
    pub city: String,
    pub insights: Vec<Insight>,
    pub generated_at: String,
}
