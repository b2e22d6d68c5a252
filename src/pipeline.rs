//! The live → synthetic → static degradation chain shared by every domain.

use chrono::{DateTime, FixedOffset};
use std::future::{Future, Ready};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::cache::ResponseCache;
use crate::city::CityKey;
use crate::error::DashboardError;
use crate::metrics::{CACHE_HITS, CACHE_MISSES, CACHE_SIZE, PROVIDER_FAILURES, RESPONSES_BY_SOURCE};
use crate::models::{Domain, SourceTag};

/// A payload plus where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub payload: T,
    pub source: SourceTag,
    pub from_cache: bool,
}

/// One request's walk down the tiers for a single city key.
pub struct FallbackChain<'a, T> {
    domain: Domain,
    cache: &'a ResponseCache<T>,
    key: &'a CityKey,
    now: DateTime<FixedOffset>,
    provider_timeout: Duration,
}

impl<'a, T: Clone> FallbackChain<'a, T> {
    pub fn new(
        domain: Domain,
        cache: &'a ResponseCache<T>,
        key: &'a CityKey,
        now: DateTime<FixedOffset>,
        provider_timeout: Duration,
    ) -> Self {
        Self { domain, cache, key, now, provider_timeout }
    }

    /// Cache, then `live` (if any), then `synthesize`, then `fallback`.
    /// Never fails: the last tier is infallible.
    pub async fn run<L, S, F>(self, live: Option<L>, synthesize: S, fallback: F) -> Resolved<T>
    where
        L: Future<Output = Result<T, DashboardError>>,
        S: FnOnce() -> Result<T, DashboardError>,
        F: FnOnce() -> T,
    {
        let resolved = self.resolve(live, synthesize, fallback).await;
        RESPONSES_BY_SOURCE
            .with_label_values(&[self.domain.as_str(), resolved.source.as_str()])
            .inc();
        resolved
    }

    /// Same chain without a live tier.
    pub async fn run_offline<S, F>(self, synthesize: S, fallback: F) -> Resolved<T>
    where
        S: FnOnce() -> Result<T, DashboardError>,
        F: FnOnce() -> T,
    {
        self.run(None::<Ready<Result<T, DashboardError>>>, synthesize, fallback)
            .await
    }

    async fn resolve<L, S, F>(&self, live: Option<L>, synthesize: S, fallback: F) -> Resolved<T>
    where
        L: Future<Output = Result<T, DashboardError>>,
        S: FnOnce() -> Result<T, DashboardError>,
        F: FnOnce() -> T,
    {
        let domain = self.domain.as_str();

        if let Some(entry) = self.cache.get(self.key, self.now) {
            CACHE_HITS.with_label_values(&[domain]).inc();
            let age = (self.now - entry.inserted_at).num_seconds();
            info!(domain, city = %self.key, age_secs = age, source = %entry.source, "cache hit");
            return Resolved { payload: entry.payload, source: entry.source, from_cache: true };
        }
        CACHE_MISSES.with_label_values(&[domain]).inc();
        debug!(domain, city = %self.key, "cache miss");

        if let Some(live) = live {
            match self.call_provider(live).await {
                Ok(payload) => return self.store(payload, SourceTag::LiveProvider),
                Err(e) => {
                    PROVIDER_FAILURES.with_label_values(&[domain]).inc();
                    warn!(domain, city = %self.key, error = %e, "live provider failed, synthesizing");
                }
            }
        }

        match synthesize() {
            Ok(payload) => self.store(payload, SourceTag::Synthetic),
            Err(e) => {
                error!(domain, city = %self.key, error = %e, "synthesis failed, serving static fallback");
                Resolved { payload: fallback(), source: SourceTag::StaticFallback, from_cache: false }
            }
        }
    }

    async fn call_provider<L>(&self, live: L) -> Result<T, DashboardError>
    where
        L: Future<Output = Result<T, DashboardError>>,
    {
        match tokio::time::timeout(self.provider_timeout, live).await {
            Ok(result) => result,
            Err(_) => Err(DashboardError::provider(format!(
                "timed out after {} ms",
                self.provider_timeout.as_millis()
            ))),
        }
    }

    fn store(&self, payload: T, source: SourceTag) -> Resolved<T> {
        self.cache.put(self.key, payload.clone(), source, self.now);
        CACHE_SIZE
            .with_label_values(&[self.domain.as_str()])
            .set(self.cache.len() as i64);
        info!(domain = self.domain.as_str(), city = %self.key, %source, "computed fresh response");
        Resolved { payload, source, from_cache: false }
    }
}
