use chrono::{DateTime, FixedOffset};
use dashmap::DashMap;
use tracing::warn;

use crate::city::CityKey;
use crate::models::SourceTag;

// Cache entry with timestamp and the key it was computed for
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub payload: T,
    pub inserted_at: DateTime<FixedOffset>,
    pub source: SourceTag,
    pub city_key: CityKey,
}

impl<T> CacheEntry<T> {
    pub fn is_expired(&self, now: DateTime<FixedOffset>, ttl: chrono::Duration) -> bool {
        now >= self.inserted_at + ttl
    }
}

/// Per-domain response cache keyed by normalized city. Expiry is lazy on
/// read; [`ResponseCache::sweep`] drops stale entries in bulk.
#[derive(Debug)]
pub struct ResponseCache<T> {
    entries: DashMap<CityKey, CacheEntry<T>>,
    ttl: chrono::Duration,
}

impl<T: Clone> ResponseCache<T> {
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(3650)),
        }
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    pub fn get(&self, key: &CityKey, now: DateTime<FixedOffset>) -> Option<CacheEntry<T>> {
        // clone out before touching the map again, a live Ref would deadlock remove
        let entry = self.entries.get(key).map(|e| e.value().clone())?;

        if entry.is_expired(now, self.ttl) {
            self.entries.remove_if(key, |_, e| e.is_expired(now, self.ttl));
            return None;
        }

        if entry.city_key != *key {
            warn!(
                lookup = %key,
                stored = %entry.city_key,
                "cache entry belongs to another city, treating as miss"
            );
            return None;
        }

        Some(entry)
    }

    /// Replace whatever is stored for `key`.
    pub fn put(&self, key: &CityKey, payload: T, source: SourceTag, now: DateTime<FixedOffset>) {
        self.entries.insert(
            key.clone(),
            CacheEntry {
                payload,
                inserted_at: now,
                source,
                city_key: key.clone(),
            },
        );
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn sweep(&self, now: DateTime<FixedOffset>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| !e.is_expired(now, self.ttl));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::normalize;
    use std::time::Duration;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn hit_within_ttl_miss_after() {
        let cache = ResponseCache::new(Duration::from_secs(300));
        let key = normalize("Mumbai").unwrap();
        let t0 = at("2024-03-04T09:00:00+00:00");

        cache.put(&key, 42u32, SourceTag::Synthetic, t0);

        let hit = cache.get(&key, t0 + chrono::Duration::seconds(299)).unwrap();
        assert_eq!(hit.payload, 42);
        assert_eq!(hit.source, SourceTag::Synthetic);

        assert!(cache.get(&key, t0 + chrono::Duration::seconds(300)).is_none());
        // lazily removed
        assert!(cache.is_empty());
    }

    #[test]
    fn equivalent_raw_names_share_an_entry() {
        let cache = ResponseCache::new(Duration::from_secs(600));
        let t0 = at("2024-03-04T09:00:00+00:00");

        cache.put(&normalize("New York").unwrap(), "ny", SourceTag::LiveProvider, t0);
        let hit = cache.get(&normalize("  new   YORK. ").unwrap(), t0).unwrap();
        assert_eq!(hit.payload, "ny");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn mismatched_owner_is_a_miss() {
        let cache = ResponseCache::new(Duration::from_secs(600));
        let t0 = at("2024-03-04T09:00:00+00:00");
        let delhi = normalize("delhi").unwrap();
        let pune = normalize("pune").unwrap();

        cache.entries.insert(
            delhi.clone(),
            CacheEntry {
                payload: 1u8,
                inserted_at: t0,
                source: SourceTag::Synthetic,
                city_key: pune,
            },
        );

        assert!(cache.get(&delhi, t0).is_none());
    }

    #[test]
    fn put_replaces_wholesale() {
        let cache = ResponseCache::new(Duration::from_secs(600));
        let t0 = at("2024-03-04T09:00:00+00:00");
        let key = normalize("goa").unwrap();

        cache.put(&key, 1u8, SourceTag::Synthetic, t0);
        cache.put(&key, 2u8, SourceTag::LiveProvider, t0 + chrono::Duration::seconds(10));

        let hit = cache.get(&key, t0 + chrono::Duration::seconds(10)).unwrap();
        assert_eq!(hit.payload, 2);
        assert_eq!(hit.source, SourceTag::LiveProvider);
        assert_eq!(hit.inserted_at, t0 + chrono::Duration::seconds(10));
    }

    #[test]
    fn sweep_drops_only_expired() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let t0 = at("2024-03-04T09:00:00+00:00");

        cache.put(&normalize("old").unwrap(), 1u8, SourceTag::Synthetic, t0);
        cache.put(
            &normalize("fresh").unwrap(),
            2u8,
            SourceTag::Synthetic,
            t0 + chrono::Duration::seconds(50),
        );

        let removed = cache.sweep(t0 + chrono::Duration::seconds(70));
        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 1);
    }
}
