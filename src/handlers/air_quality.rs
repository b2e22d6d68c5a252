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
use crate::models::{AirQualityMetrics, AirQualityReport, CityQuery, Domain, SourceTag};
use crate::pipeline::FallbackChain;
use crate::provider::LiveAirQuality;
use crate::state::AppState;
use crate::synth::{air_quality, clamp_round};

pub async fn air_quality_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CityQuery>,
) -> Result<Json<AirQualityReport>, DashboardError> {
    REQUEST_TOTAL.with_label_values(&[Domain::AirQuality.as_str()]).inc();

    let key = normalize_param(query.city.as_deref())?;
    let city = query.city.as_deref().unwrap_or_default().trim();

    let start_time = Instant::now();
    let now = state.clock.now();
    info!(city, key = %key, "air quality request");

    let live = async {
        let reading = state.provider.air_quality(city).await?;
        Ok::<_, DashboardError>(live_report(reading, now, &mut rand::thread_rng()))
    };

    let resolved = FallbackChain::new(
        Domain::AirQuality,
        &state.air_quality_cache,
        &key,
        now,
        state.provider_timeout,
    )
    .run(
        Some(live),
        || synthetic_report(city, &key, now, &mut rand::thread_rng()),
        || fallback_report(city, now),
    )
    .await;

    REQUEST_LATENCY
        .with_label_values(&[Domain::AirQuality.as_str()])
        .observe(start_time.elapsed().as_secs_f64());

    Ok(Json(resolved.payload))
}

fn live_report<R: Rng + ?Sized>(
    reading: LiveAirQuality,
    now: DateTime<FixedOffset>,
    rng: &mut R,
) -> AirQualityReport {
    // provider index is 1..=5, scale it onto the familiar AQI range
    let aqi = clamp_round(
        f64::from(reading.index.max(1)) * 50.0,
        air_quality::AQI_RANGE.0,
        air_quality::AQI_RANGE.1,
    ) as u32;
    let round = |v: f64| v.round().max(0.0) as u32;

    AirQualityReport {
        city: reading.city_name,
        air_quality: AirQualityMetrics {
            aqi,
            pm25: round(reading.pm2_5),
            pm10: round(reading.pm10),
            status: air_quality::aqi_status(aqi).to_string(),
            no2: round(reading.no2),
            so2: round(reading.so2),
            co: round(reading.co),
            o3: round(reading.o3),
        },
        predictions: air_quality::predict(aqi, now, rng),
        source: SourceTag::LiveProvider,
        updated_at: now.to_rfc3339(),
    }
}

fn synthetic_report<R: Rng + ?Sized>(
    city: &str,
    key: &CityKey,
    now: DateTime<FixedOffset>,
    rng: &mut R,
) -> Result<AirQualityReport, DashboardError> {
    let metrics = air_quality::synthesize(key, now, rng)?;
    let predictions = air_quality::predict(metrics.aqi, now, rng);

    Ok(AirQualityReport {
        city: city.to_string(),
        air_quality: metrics,
        predictions,
        source: SourceTag::Synthetic,
        updated_at: now.to_rfc3339(),
    })
}

fn fallback_report(city: &str, now: DateTime<FixedOffset>) -> AirQualityReport {
    let (metrics, predictions) = air_quality::fallback();
    AirQualityReport {
        city: city.to_string(),
        air_quality: metrics,
        predictions,
        source: SourceTag::StaticFallback,
        updated_at: now.to_rfc3339(),
    }
}
