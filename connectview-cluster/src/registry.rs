//! Registry of logical connect clusters per physical cluster
//!
//! Built once from configuration and immutable afterwards. Each logical
//! cluster owns the failover selector over its endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use connectview_core::models::{ConnectCacheKey, ConnectStats, ConnectSummary};
use connectview_core::resilience::timeout::TimeoutConfig;
use connectview_core::{Config, Error, Result};

use crate::client::http::build_http_client;
use crate::client::HttpConnectClient;
use crate::discovery::{Endpoint, EndpointSet, FailoverSelector};

/// One connect cluster reachable through several endpoints
#[derive(Debug)]
pub struct LogicalCluster {
    key: ConnectCacheKey,
    display_name: String,
    selector: FailoverSelector,
}

impl LogicalCluster {
    pub fn new(key: ConnectCacheKey, display_name: impl Into<String>, selector: FailoverSelector) -> Self {
        Self {
            key,
            display_name: display_name.into(),
            selector,
        }
    }

    pub const fn key(&self) -> &ConnectCacheKey {
        &self.key
    }

    /// Connect cluster name
    pub fn name(&self) -> &str {
        &self.key.connect
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn addresses(&self) -> Vec<String> {
        self.selector.endpoints().addresses()
    }

    pub const fn selector(&self) -> &FailoverSelector {
        &self.selector
    }

    #[must_use]
    pub fn summary(&self, stats: Option<ConnectStats>) -> ConnectSummary {
        ConnectSummary {
            name: self.key.connect.clone(),
            display_name: self.display_name.clone(),
            addresses: self.addresses(),
            stats,
        }
    }
}

/// Physical cluster name to its logical connect clusters, in configured order
#[derive(Debug, Default)]
pub struct ConnectRegistry {
    clusters: HashMap<String, Vec<Arc<LogicalCluster>>>,
}

impl ConnectRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build HTTP-backed logical clusters for every configured connect
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_http_client(TimeoutConfig::from(&config.http))?;
        let mut registry = Self::new();

        for cluster in &config.clusters {
            registry.add_cluster(&cluster.name);

            for connect in &cluster.kafka_connect {
                let endpoints = connect
                    .addresses
                    .iter()
                    .map(|address| {
                        let http = HttpConnectClient::from_config(
                            address,
                            client.clone(),
                            &config.http,
                            connect.username.as_deref(),
                            connect.password.as_deref(),
                        )?;
                        Ok(Endpoint::new(address.clone(), Arc::new(http)))
                    })
                    .collect::<Result<Vec<_>>>()?;

                let selector = FailoverSelector::new(&connect.name, EndpointSet::new(endpoints))
                    .with_cooldown(config.failover.cooldown());

                registry.register(LogicalCluster::new(
                    ConnectCacheKey::new(&cluster.name, &connect.name),
                    connect.display_name(),
                    selector,
                ));
            }
        }

        info!(
            clusters = registry.clusters.len(),
            connects = registry.clusters.values().map(Vec::len).sum::<usize>(),
            "Connect registry built"
        );
        Ok(registry)
    }

    /// Declare a physical cluster, possibly without any connect
    pub fn add_cluster(&mut self, cluster: &str) {
        self.clusters.entry(cluster.to_string()).or_default();
    }

    /// Add a logical cluster under the physical cluster named by its key
    pub fn register(&mut self, connect: LogicalCluster) {
        self.clusters
            .entry(connect.key.cluster.clone())
            .or_default()
            .push(Arc::new(connect));
    }

    /// Logical clusters of a physical cluster
    pub fn connects(&self, cluster: &str) -> Result<&[Arc<LogicalCluster>]> {
        self.clusters
            .get(cluster)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::NotFound(format!("Cluster {cluster} not found")))
    }

    /// Resolve one logical cluster
    pub fn connect(&self, cluster: &str, connect: &str) -> Result<Arc<LogicalCluster>> {
        self.clusters
            .get(cluster)
            .and_then(|connects| connects.iter().find(|c| c.name() == connect))
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Connect {connect} not found for cluster {cluster}")))
    }
}
