//! Endpoints of one logical connect cluster and their health
//!
//! Health lives in one `AtomicU64` per endpoint holding the instant, in
//! milliseconds since the set was created, until which the endpoint is
//! suspected. Zero means healthy. Concurrent updates race benignly: the
//! worst outcome is one extra attempt against a dead endpoint or one skipped
//! attempt against a live one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::client::ConnectClient;

const HEALTHY: u64 = 0;

/// Health of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointHealth {
    Healthy,
    /// Skipped until the cooldown runs out
    Suspected { remaining: Duration },
}

/// Snapshot of one endpoint, for inspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointState {
    pub address: String,
    pub health: EndpointHealth,
}

pub struct Endpoint {
    address: String,
    client: Arc<dyn ConnectClient>,
    suspected_until: AtomicU64,
}

impl Endpoint {
    pub fn new(address: impl Into<String>, client: Arc<dyn ConnectClient>) -> Self {
        Self {
            address: address.into(),
            client,
            suspected_until: AtomicU64::new(HEALTHY),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn client(&self) -> Arc<dyn ConnectClient> {
        self.client.clone()
    }

    fn is_eligible(&self, now_ms: u64) -> bool {
        let until = self.suspected_until.load(Ordering::Acquire);
        until == HEALTHY || now_ms >= until
    }

    /// Returns true if the endpoint was healthy before
    fn mark_suspected(&self, until_ms: u64) -> bool {
        self.suspected_until
            .fetch_max(until_ms, Ordering::AcqRel)
            == HEALTHY
    }

    /// Returns true if the endpoint was suspected before
    fn mark_healthy(&self) -> bool {
        self.suspected_until.swap(HEALTHY, Ordering::AcqRel) != HEALTHY
    }

    fn health(&self, now_ms: u64) -> EndpointHealth {
        match self.suspected_until.load(Ordering::Acquire) {
            HEALTHY => EndpointHealth::Healthy,
            until => EndpointHealth::Suspected {
                remaining: Duration::from_millis(until.saturating_sub(now_ms)),
            },
        }
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("address", &self.address)
            .field("suspected_until", &self.suspected_until.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Ordered endpoints of one logical cluster; earlier entries are preferred
#[derive(Debug)]
pub struct EndpointSet {
    endpoints: Vec<Endpoint>,
    epoch: Instant,
}

impl EndpointSet {
    #[must_use]
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self {
            endpoints,
            epoch: Instant::now(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn addresses(&self) -> Vec<String> {
        self.endpoints.iter().map(|e| e.address.clone()).collect()
    }

    /// Milliseconds since the set was created, offset by one so it is never
    /// mistaken for the healthy marker
    fn now_ms(&self) -> u64 {
        let elapsed = self.epoch.elapsed().as_millis();
        u64::try_from(elapsed).unwrap_or(u64::MAX).saturating_add(1)
    }

    pub(crate) fn is_eligible(&self, endpoint: &Endpoint) -> bool {
        endpoint.is_eligible(self.now_ms())
    }

    /// Suspect `endpoint` for `cooldown` from now; true on a fresh demotion
    pub(crate) fn suspect(&self, endpoint: &Endpoint, cooldown: Duration) -> bool {
        let cooldown_ms = u64::try_from(cooldown.as_millis()).unwrap_or(u64::MAX);
        endpoint.mark_suspected(self.now_ms().saturating_add(cooldown_ms))
    }

    /// Mark `endpoint` healthy; true if it was suspected
    pub(crate) fn recover(&self, endpoint: &Endpoint) -> bool {
        endpoint.mark_healthy()
    }

    pub fn states(&self) -> Vec<EndpointState> {
        let now = self.now_ms();
        self.endpoints
            .iter()
            .map(|e| EndpointState {
                address: e.address.clone(),
                health: e.health(now),
            })
            .collect()
    }

    pub fn eligible_count(&self) -> usize {
        let now = self.now_ms();
        self.endpoints.iter().filter(|e| e.is_eligible(now)).count()
    }
}
