use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use city_dashboard::clock::SystemClock;
use city_dashboard::provider::OpenWeatherProvider;
use city_dashboard::worker::cache_sweeper;
use city_dashboard::{AppState, Args, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env feeds the clap env fallbacks, a missing file is fine
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let api_key = args.api_key().map(str::to_owned);
    if api_key.is_none() {
        warn!("OPENWEATHER_API_KEY not set, weather and air quality will be synthetic");
    }

    let provider = OpenWeatherProvider::new(api_key, &args.openweather_base_url, args.provider_timeout())
        .context("failed to build OpenWeather HTTP client")?;

    let state = Arc::new(AppState::new(&args, Arc::new(provider), Arc::new(SystemClock)));

    tokio::spawn(cache_sweeper(state.clone(), args.sweep_interval()));

    let app = build_router(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "city dashboard API listening");
    info!(
        weather_ttl = args.weather_ttl,
        air_quality_ttl = args.air_quality_ttl,
        transport_ttl = args.transport_ttl,
        provider_timeout_ms = args.provider_timeout_ms,
        "cache and provider settings"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
