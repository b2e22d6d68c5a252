use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::{LiveAirQuality, LiveWeather, MetricsProvider};
use crate::error::DashboardError;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Coordinates {
    lat: f64,
    lon: f64,
}

impl OpenWeatherProvider {
    pub fn new(api_key: Option<String>, base_url: &str, timeout: Duration) -> reqwest::Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("city-dashboard/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn api_key(&self) -> Result<&str, DashboardError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| DashboardError::provider("no OpenWeather API key configured"))
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, DashboardError> {
        Url::parse_with_params(&format!("{}{}", self.base_url, path), params)
            .map_err(|e| DashboardError::provider(format!("invalid OpenWeather URL: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T, DashboardError> {
        debug!(request = what, path = url.path(), "calling OpenWeather");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| DashboardError::provider(format!("OpenWeather {what} request failed: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| DashboardError::provider(format!("failed to read OpenWeather {what} body: {e}")))?;

        if !status.is_success() {
            return Err(DashboardError::provider(format!(
                "OpenWeather {what} returned {status}: {}",
                truncate_body(&body)
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| DashboardError::provider(format!("failed to parse OpenWeather {what} JSON: {e}")))
    }

    // Geocode the raw (non-normalized) city text, the provider matches it more richly
    async fn geocode(&self, city: &str, key: &str) -> Result<(Coordinates, String), DashboardError> {
        let url = self.url("/geo/1.0/direct", &[("q", city), ("limit", "1"), ("appid", key)])?;
        let places: Vec<OwGeoPlace> = self.get_json(url, "geocoding").await?;

        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| DashboardError::provider(format!("city not found: {city}")))?;

        Ok((Coordinates { lat: place.lat, lon: place.lon }, place.name))
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoPlace {
    name: String,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: Option<String>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Default, Deserialize)]
struct OwComponents {
    #[serde(default)]
    pm2_5: f64,
    #[serde(default)]
    pm10: f64,
    #[serde(default)]
    no2: f64,
    #[serde(default)]
    so2: f64,
    #[serde(default)]
    co: f64,
    #[serde(default)]
    o3: f64,
}

#[derive(Debug, Deserialize)]
struct OwPollutionMain {
    aqi: u8,
}

#[derive(Debug, Deserialize)]
struct OwPollutionEntry {
    main: OwPollutionMain,
    #[serde(default)]
    components: OwComponents,
}

#[derive(Debug, Deserialize)]
struct OwPollutionResponse {
    list: Vec<OwPollutionEntry>,
}

#[async_trait]
impl MetricsProvider for OpenWeatherProvider {
    async fn current_weather(&self, city: &str) -> Result<LiveWeather, DashboardError> {
        let key = self.api_key()?;
        let (coords, place_name) = self.geocode(city, key).await?;

        let (lat, lon) = (coords.lat.to_string(), coords.lon.to_string());
        let url = self.url(
            "/data/2.5/weather",
            &[("lat", lat.as_str()), ("lon", lon.as_str()), ("appid", key), ("units", "metric")],
        )?;
        let parsed: OwCurrentResponse = self.get_json(url, "current weather").await?;

        let (description, icon) = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| (w.description, w.icon))
            .unwrap_or_else(|| ("Unknown".to_string(), "02d".to_string()));

        Ok(LiveWeather {
            city_name: parsed.name.filter(|n| !n.is_empty()).unwrap_or(place_name),
            temp_c: parsed.main.temp,
            humidity_pct: parsed.main.humidity,
            description,
            icon,
            wind_speed_mps: parsed.wind.speed,
            pressure_hpa: parsed.main.pressure,
        })
    }

    async fn air_quality(&self, city: &str) -> Result<LiveAirQuality, DashboardError> {
        let key = self.api_key()?;
        let (coords, place_name) = self.geocode(city, key).await?;

        let (lat, lon) = (coords.lat.to_string(), coords.lon.to_string());
        let url = self.url(
            "/data/2.5/air_pollution",
            &[("lat", lat.as_str()), ("lon", lon.as_str()), ("appid", key)],
        )?;
        let parsed: OwPollutionResponse = self.get_json(url, "air pollution").await?;

        let entry = parsed
            .list
            .into_iter()
            .next()
            .ok_or_else(|| DashboardError::provider("OpenWeather air pollution response contained no data"))?;

        Ok(LiveAirQuality {
            city_name: place_name,
            index: entry.main.aqi,
            pm2_5: entry.components.pm2_5,
            pm10: entry.components.pm10,
            no2: entry.components.no2,
            so2: entry.components.so2,
            co: entry.components.co,
            o3: entry.components.o3,
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
