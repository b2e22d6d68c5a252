use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, FixedOffset};
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::city::{CityKey, normalize_param};
use crate::error::DashboardError;
use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::{CityQuery, Domain, SourceTag, WeatherMetrics, WeatherReport};
use crate::pipeline::FallbackChain;
use crate::provider::LiveWeather;
use crate::state::AppState;
use crate::synth::{clamp_round, weather};

pub async fn weather_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CityQuery>,
) -> Result<Json<WeatherReport>, DashboardError> {
    REQUEST_TOTAL.with_label_values(&[Domain::Weather.as_str()]).inc();

    let key = normalize_param(query.city.as_deref())?;
    let city = query.city.as_deref().unwrap_or_default().trim();

    let start_time = Instant::now();
    let now = state.clock.now();
    info!(city, key = %key, "weather request");

    let live = async {
        let reading = state.provider.current_weather(city).await?;
        Ok::<_, DashboardError>(live_report(reading, now, &mut rand::thread_rng()))
    };

    let resolved = FallbackChain::new(Domain::Weather, &state.weather_cache, &key, now, state.provider_timeout)
        .run(
            Some(live),
            || synthetic_report(city, &key, now, &mut rand::thread_rng()),
            || fallback_report(city, now),
        )
        .await;

    REQUEST_LATENCY
        .with_label_values(&[Domain::Weather.as_str()])
        .observe(start_time.elapsed().as_secs_f64());

    Ok(Json(resolved.payload))
}

fn live_report<R: Rng + ?Sized>(reading: LiveWeather, now: DateTime<FixedOffset>, rng: &mut R) -> WeatherReport {
    let temp = clamp_round(reading.temp_c, weather::TEMP_RANGE.0, weather::TEMP_RANGE.1) as i32;

    WeatherReport {
        city: reading.city_name,
        weather: WeatherMetrics {
            temp,
            humidity: clamp_round(reading.humidity_pct, weather::HUMIDITY_RANGE.0, weather::HUMIDITY_RANGE.1)
                as u8,
            desc: reading.description,
            icon: reading.icon,
            // m/s to km/h
            wind_speed: (reading.wind_speed_mps * 3.6).round().max(0.0) as u32,
            pressure: reading.pressure_hpa.round().max(0.0) as u32,
        },
        predictions: weather::predict(temp, now, rng),
        source: SourceTag::LiveProvider,
        updated_at: now.to_rfc3339(),
    }
}

fn synthetic_report<R: Rng + ?Sized>(
    city: &str,
    key: &CityKey,
    now: DateTime<FixedOffset>,
    rng: &mut R,
) -> Result<WeatherReport, DashboardError> {
    let metrics = weather::synthesize(key, now, rng)?;
    let predictions = weather::predict(metrics.temp, now, rng);

    Ok(WeatherReport {
        city: city.to_string(),
        weather: metrics,
        predictions,
        source: SourceTag::Synthetic,
        updated_at: now.to_rfc3339(),
    })
}

fn fallback_report(city: &str, now: DateTime<FixedOffset>) -> WeatherReport {
    let (metrics, predictions) = weather::fallback();
    WeatherReport {
        city: city.to_string(),
        weather: metrics,
        predictions,
        source: SourceTag::StaticFallback,
        updated_at: now.to_rfc3339(),
    }
}
