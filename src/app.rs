use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{
    air_quality_handler, health_handler, insights_handler, metrics_handler, not_found_handler, root_handler,
    transport_handler, weather_handler,
};
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/weather", get(weather_handler))
        .route("/api/airquality", get(air_quality_handler))
        .route("/api/transport", get(transport_handler))
        .route("/api/insights", get(insights_handler))
        .fallback(not_found_handler)
        // the dashboard UI is served from a different origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
