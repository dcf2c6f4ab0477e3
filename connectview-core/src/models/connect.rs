use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::connector::ConnectorRecord;

/// Identity of one logical connect cluster: the physical cluster it belongs
/// to plus the connect cluster name. Also the aggregation cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectCacheKey {
    pub cluster: String,
    pub connect: String,
}

impl ConnectCacheKey {
    pub fn new(cluster: impl Into<String>, connect: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            connect: connect.into(),
        }
    }
}

impl Display for ConnectCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.cluster, self.connect)
    }
}

/// Aggregated counters for one logical cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectStats {
    pub connectors_count: usize,
    pub failed_connectors_count: usize,
    pub tasks_count: usize,
    pub failed_tasks_count: usize,
}

impl ConnectStats {
    #[must_use]
    pub fn from_records(records: &[ConnectorRecord]) -> Self {
        records.iter().fold(Self::default(), |mut stats, record| {
            stats.connectors_count += 1;
            if record.status.state.is_failed() {
                stats.failed_connectors_count += 1;
            }
            stats.tasks_count += record.tasks.len();
            stats.failed_tasks_count += record.failed_tasks_count();
            stats
        })
    }
}

/// A logical connect cluster as listed upward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectSummary {
    pub name: String,
    pub display_name: String,
    pub addresses: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ConnectStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorPlugin {
    pub class: String,
    #[serde(rename = "type")]
    pub plugin_type: Option<String>,
    pub version: Option<String>,
}

/// Result of validating a plugin configuration on the remote side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfigValidation {
    pub name: String,
    pub error_count: u32,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub configs: Vec<serde_json::Value>,
}
