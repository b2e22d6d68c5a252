use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::DashboardError;

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Current conditions as reported by a live provider.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveWeather {
    pub city_name: String,
    pub temp_c: f64,
    pub humidity_pct: f64,
    pub description: String,
    pub icon: String,
    pub wind_speed_mps: f64,
    pub pressure_hpa: f64,
}

/// Pollution reading as reported by a live provider. `index` is the
/// provider's 1-5 scale.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveAirQuality {
    pub city_name: String,
    pub index: u8,
    pub pm2_5: f64,
    pub pm10: f64,
    pub no2: f64,
    pub so2: f64,
    pub co: f64,
    pub o3: f64,
}

/// Upstream source of real weather and air quality. Any failure is reported
/// as `ProviderUnavailable` and the caller falls back to synthetic data.
#[async_trait]
pub trait MetricsProvider: Send + Sync + Debug {
    async fn current_weather(&self, city: &str) -> Result<LiveWeather, DashboardError>;

    async fn air_quality(&self, city: &str) -> Result<LiveAirQuality, DashboardError>;
}
