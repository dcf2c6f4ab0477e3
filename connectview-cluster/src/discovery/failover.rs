//! Failover across the endpoints of one logical cluster
//!
//! Endpoints are tried in configured order. An endpoint that fails at the
//! transport level (connect error, timeout, 5xx) is suspected for a cooldown
//! period and skipped until it runs out; application errors (4xx, malformed
//! bodies) are returned immediately since another endpoint of the same
//! cluster would give the same answer.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use connectview_core::{Error, Result};

use super::endpoint::{EndpointSet, EndpointState};
use crate::client::{ClientError, ClientResult, ConnectClient};

/// Default time an endpoint is skipped after a transport failure
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5);

/// Hides the endpoints of one logical cluster behind a single call handle
#[derive(Debug)]
pub struct FailoverSelector {
    /// Logical cluster name, used in errors and logs
    name: String,
    endpoints: EndpointSet,
    cooldown: Duration,
}

impl FailoverSelector {
    #[must_use]
    pub fn new(name: impl Into<String>, endpoints: EndpointSet) -> Self {
        Self {
            name: name.into(),
            endpoints,
            cooldown: DEFAULT_COOLDOWN,
        }
    }

    #[must_use]
    pub const fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn endpoints(&self) -> &EndpointSet {
        &self.endpoints
    }

    /// Run `operation` against the first endpoint able to serve it
    pub async fn call<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn(Arc<dyn ConnectClient>) -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let mut last_failure: Option<ClientError> = None;

        for endpoint in self.endpoints.iter() {
            if !self.endpoints.is_eligible(endpoint) {
                trace!(connect = %self.name, endpoint = %endpoint.address(), "Skipping suspected endpoint");
                continue;
            }

            match operation(endpoint.client()).await {
                Ok(value) => {
                    if self.endpoints.recover(endpoint) {
                        info!(connect = %self.name, endpoint = %endpoint.address(), "Endpoint recovered");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_endpoint_failure() => {
                    if self.endpoints.suspect(endpoint, self.cooldown) {
                        warn!(
                            connect = %self.name,
                            endpoint = %endpoint.address(),
                            cooldown_ms = u64::try_from(self.cooldown.as_millis()).unwrap_or(u64::MAX),
                            error = %e,
                            "Endpoint unreachable, suspected"
                        );
                    } else {
                        debug!(connect = %self.name, endpoint = %endpoint.address(), error = %e, "Endpoint still unreachable");
                    }
                    last_failure = Some(e);
                }
                Err(e) => {
                    // The endpoint answered, so it is reachable
                    if self.endpoints.recover(endpoint) {
                        info!(connect = %self.name, endpoint = %endpoint.address(), "Endpoint recovered");
                    }
                    return Err(e.into());
                }
            }
        }

        warn!(
            connect = %self.name,
            endpoints = self.endpoints.len(),
            last_error = last_failure.as_ref().map(ToString::to_string),
            "No reachable endpoint"
        );
        Err(Error::NoReachableEndpoint(self.name.clone()))
    }

    /// [`Self::call`] for operations returning a sequence
    pub async fn call_list<T, F, Fut>(&self, operation: F) -> Result<Vec<T>>
    where
        F: Fn(Arc<dyn ConnectClient>) -> Fut,
        Fut: Future<Output = ClientResult<Vec<T>>>,
    {
        self.call(operation).await
    }

    /// Current health of every endpoint, in priority order
    pub fn endpoint_states(&self) -> Vec<EndpointState> {
        self.endpoints.states()
    }

    /// Number of endpoints not currently skipped
    pub fn reachable_count(&self) -> usize {
        self.endpoints.eligible_count()
    }
}
