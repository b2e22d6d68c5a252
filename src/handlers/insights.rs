use axum::{
    Json,
    extract::{Query, State},
};
use std::sync::Arc;
use tracing::info;

use crate::city::normalize_param;
use crate::error::DashboardError;
use crate::insights::{self, Snapshot};
use crate::metrics::REQUEST_TOTAL;
use crate::models::{CityQuery, InsightsReport};
use crate::state::AppState;

const INSIGHTS_LABEL: &str = "insights";

// Read-only view over the domain caches; never calls the provider or synthesizes
pub async fn insights_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CityQuery>,
) -> Result<Json<InsightsReport>, DashboardError> {
    REQUEST_TOTAL.with_label_values(&[INSIGHTS_LABEL]).inc();

    let key = normalize_param(query.city.as_deref())?;
    let city = query.city.as_deref().unwrap_or_default().trim();
    let now = state.clock.now();

    let weather = state.weather_cache.get(&key, now);
    let air_quality = state.air_quality_cache.get(&key, now);
    let transport = state.transport_cache.get(&key, now);
    let snapshot = Snapshot {
        weather: weather.as_ref().map(|e| &e.payload.weather),
        air_quality: air_quality.as_ref().map(|e| &e.payload.air_quality),
        transport: transport.as_ref().map(|e| &e.payload.transport),
    };

    let insights = insights::derive(&snapshot, now);
    info!(city, key = %key, count = insights.len(), "insights request");

    Ok(Json(InsightsReport {
        city: city.to_string(),
        insights,
        generated_at: now.to_rfc3339(),
    }))
}
