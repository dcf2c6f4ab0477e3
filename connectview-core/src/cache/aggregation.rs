//! TTL-bounded, single-flight cache for aggregated connector lists
//!
//! Entries live in a Moka cache with `time_to_live`, so an entry older than
//! the TTL is never served and is evicted lazily. Misses go through an
//! `async_singleflight` group: concurrent misses for one key share a single
//! population, and a failed population stores nothing.

use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::CacheConfig;
use crate::models::{ConnectCacheKey, ConnectorRecord};
use crate::{Error, Result};

/// Aggregated connectors of one logical cluster, keyed by its identity
pub type ConnectorsCache = AggregationCache<ConnectCacheKey, Arc<Vec<ConnectorRecord>>>;

pub struct AggregationCache<K, V>
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// `None` when caching is administratively disabled
    entries: Option<moka::future::Cache<K, V>>,
    /// Flights resolve to the whole outcome so waiters get the leader's error verbatim
    in_flight: async_singleflight::Group<K, Result<V>, Error>,
    ttl: Duration,
}

impl<K, V> AggregationCache<K, V>
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache from configuration
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        if config.enabled {
            Self::with_ttl(config.ttl(), config.max_capacity)
        } else {
            Self::disabled()
        }
    }

    /// Create an enabled cache
    #[must_use]
    pub fn with_ttl(ttl: Duration, max_capacity: u64) -> Self {
        let entries = moka::future::Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self {
            entries: Some(entries),
            in_flight: async_singleflight::Group::new(),
            ttl,
        }
    }

    /// Create a pass-through cache that populates on every request
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            entries: None,
            in_flight: async_singleflight::Group::new(),
            ttl: Duration::ZERO,
        }
    }

    pub const fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value for `key`, populating it on a miss
    ///
    /// `populate` runs at most once per key at a time; its failure is
    /// returned to every waiter of that flight and is not cached.
    pub async fn get<F, Fut>(&self, key: K, populate: F) -> Result<V>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<V>> + Send,
    {
        let Some(entries) = &self.entries else {
            return populate(key).await;
        };

        if let Some(value) = entries.get(&key).await {
            debug!(key = ?key, "Aggregation cache hit");
            return Ok(value);
        }

        debug!(key = ?key, "Aggregation cache miss");

        let flight = {
            let entries = entries.clone();
            let flight_key = key.clone();
            let populating = populate(key.clone());
            async move {
                // A flight that finished between our lookup and joining the
                // group has already stored the value
                if let Some(value) = entries.get(&flight_key).await {
                    return Ok::<_, Error>(Ok(value));
                }
                let outcome = populating.await;
                if let Ok(value) = &outcome {
                    entries.insert(flight_key, value.clone()).await;
                }
                Ok::<_, Error>(outcome)
            }
        };

        match self.in_flight.work(&key, flight).await {
            Ok(outcome) => outcome,
            Err(Some(e)) => Err(e),
            // Flights always resolve to `Ok`; a dropped leader is taken over by a waiter
            Err(None) => Err(Error::Internal(
                "aggregation leader failed before completing".to_string(),
            )),
        }
    }

    /// Drop the entry for `key` so the next read repopulates it
    pub async fn invalidate(&self, key: &K) {
        if let Some(entries) = &self.entries {
            entries.invalidate(key).await;
            debug!(key = ?key, "Aggregation cache entry invalidated");
        }
    }

    /// Approximate number of live entries
    pub fn entry_count(&self) -> u64 {
        self.entries.as_ref().map_or(0, |e| e.entry_count())
    }
}
