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
use crate::models::{CityQuery, Domain, SourceTag, TransportReport};
use crate::pipeline::FallbackChain;
use crate::state::AppState;
use crate::synth::transport;

// Transport has no live provider, synthesis is its only data path
pub async fn transport_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CityQuery>,
) -> Result<Json<TransportReport>, DashboardError> {
    REQUEST_TOTAL.with_label_values(&[Domain::Transport.as_str()]).inc();

    let key = normalize_param(query.city.as_deref())?;

    let start_time = Instant::now();
    let now = state.clock.now();
    info!(key = %key, "transport request");

    let resolved = FallbackChain::new(
        Domain::Transport,
        &state.transport_cache,
        &key,
        now,
        state.provider_timeout,
    )
    .run_offline(
        || synthetic_report(&key, now, &mut rand::thread_rng()),
        || fallback_report(now),
    )
    .await;

    REQUEST_LATENCY
        .with_label_values(&[Domain::Transport.as_str()])
        .observe(start_time.elapsed().as_secs_f64());

    Ok(Json(resolved.payload))
}

fn synthetic_report<R: Rng + ?Sized>(
    key: &CityKey,
    now: DateTime<FixedOffset>,
    rng: &mut R,
) -> Result<TransportReport, DashboardError> {
    let metrics = transport::synthesize(key, now, rng)?;
    let predictions = transport::predict(key, metrics.traffic, now, rng);

    Ok(TransportReport {
        transport: metrics,
        predictions,
        source: SourceTag::Synthetic,
        updated_at: now.to_rfc3339(),
    })
}

fn fallback_report(now: DateTime<FixedOffset>) -> TransportReport {
    let (metrics, predictions) = transport::fallback();
    TransportReport {
        transport: metrics,
        predictions,
        source: SourceTag::StaticFallback,
        updated_at: now.to_rfc3339(),
    }
}
