use std::sync::Arc;
use std::time::Duration;

use crate::cache::ResponseCache;
use crate::clock::Clock;
use crate::config::Args;
use crate::metrics::CACHE_SIZE;
use crate::models::{AirQualityReport, Domain, TransportReport, WeatherReport};
use crate::provider::MetricsProvider;

// app's shared state, one cache per domain
#[derive(Debug)]
pub struct AppState {
    pub provider: Arc<dyn MetricsProvider>,
    pub clock: Arc<dyn Clock>,
    pub weather_cache: ResponseCache<WeatherReport>,
    pub air_quality_cache: ResponseCache<AirQualityReport>,
    pub transport_cache: ResponseCache<TransportReport>,
    pub provider_timeout: Duration, // how long a live call may take before we synthesize
}

impl AppState {
    pub fn new(args: &Args, provider: Arc<dyn MetricsProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            provider,
            clock,
            weather_cache: ResponseCache::new(Duration::from_secs(args.weather_ttl)),
            air_quality_cache: ResponseCache::new(Duration::from_secs(args.air_quality_ttl)),
            transport_cache: ResponseCache::new(Duration::from_secs(args.transport_ttl)),
            provider_timeout: args.provider_timeout(),
        }
    }

    pub fn cache_len(&self, domain: Domain) -> usize {
        match domain {
            Domain::Weather => self.weather_cache.len(),
            Domain::AirQuality => self.air_quality_cache.len(),
            Domain::Transport => self.transport_cache.len(),
        }
    }

    /// Drop expired entries from every cache, returning the total removed.
    pub fn sweep_caches(&self) -> usize {
        let now = self.clock.now();
        let removed = self.weather_cache.sweep(now)
            + self.air_quality_cache.sweep(now)
            + self.transport_cache.sweep(now);
        self.refresh_cache_gauges();
        removed
    }

    pub fn refresh_cache_gauges(&self) {
        for domain in Domain::all() {
            CACHE_SIZE
                .with_label_values(&[domain.as_str()])
                .set(self.cache_len(*domain) as i64);
        }
    }
}
