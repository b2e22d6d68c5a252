use clap::Parser;
use std::time::Duration;

// CLI argument structure, every flag can also come from the environment (or .env)
#[derive(Parser, Debug, Clone)]
#[command(name = "city-dashboard")]
#[command(about = "Weather, air quality and transport API for the city dashboard")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    // Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    // OpenWeatherMap credential, live data is skipped when absent
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub openweather_api_key: Option<String>,

    // OpenWeatherMap base URL (geocoding and data APIs hang off it)
    #[arg(long, env = "OPENWEATHER_BASE_URL", default_value = "https://api.openweathermap.org")]
    pub openweather_base_url: String,

    // Provider call timeout in milliseconds
    #[arg(long, env = "PROVIDER_TIMEOUT_MS", default_value_t = 4000)]
    pub provider_timeout_ms: u64,

    // Weather cache TTL in seconds
    #[arg(long, env = "WEATHER_CACHE_TTL", default_value_t = 600)]
    pub weather_ttl: u64,

    // Air quality cache TTL in seconds
    #[arg(long, env = "AIR_QUALITY_CACHE_TTL", default_value_t = 600)]
    pub air_quality_ttl: u64,

    // Transport cache TTL in seconds
    #[arg(long, env = "TRANSPORT_CACHE_TTL", default_value_t = 300)]
    pub transport_ttl: u64,

    // How often expired cache entries are swept, in seconds
    #[arg(long, env = "CACHE_SWEEP_INTERVAL", default_value_t = 60)]
    pub sweep_interval: u64,

    // tracing filter directive, RUST_LOG wins when set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval.max(1))
    }

    /// The credential, ignoring blank values left over in `.env` files.
    pub fn api_key(&self) -> Option<&str> {
        self.openweather_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}
