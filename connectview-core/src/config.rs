use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub cache: CacheConfig,
    pub failover: FailoverConfig,
    pub http: HttpConfig,
    pub fanout: FanoutConfig,
    pub sanitizer: SanitizerConfig,
    pub clusters: Vec<ClusterConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

/// Aggregation cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_seconds: u64,
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 30,
            max_capacity: 1_000,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Endpoint failover settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FailoverConfig {
    /// How long a failing endpoint is skipped before it is tried again
    pub cooldown_ms: u64,
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self { cooldown_ms: 5_000 }
    }
}

impl FailoverConfig {
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// HTTP client settings for the remote connect API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_seconds: u64,
    pub request_timeout_seconds: u64,
    pub max_response_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: 10,
            request_timeout_seconds: 30,
            max_response_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FanoutConfig {
    /// Maximum number of concurrent remote calls per fan-out
    pub concurrency: usize,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self { concurrency: 64 }
    }
}

/// Secret redaction applied to connector configs before they leave the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    pub enabled: bool,
    /// Extra key patterns on top of the built-in ones
    pub patterns: Vec<String>,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            patterns: Vec::new(),
        }
    }
}

/// A physical cluster and the connect clusters attached to it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub name: String,
    #[serde(default)]
    pub kafka_connect: Vec<ConnectClusterConfig>,
}

/// One logical connect cluster reachable through redundant endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectClusterConfig {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Endpoints in priority order
    #[serde(default)]
    pub addresses: Vec<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl ConnectClusterConfig {
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // Override with environment variables (CONNECTVIEW_CACHE__TTL_SECONDS, etc.)
        builder = builder.add_source(
            Environment::with_prefix("CONNECTVIEW")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only (for Docker/K8s)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// Find a physical cluster by name
    #[must_use]
    pub fn cluster(&self, name: &str) -> Option<&ClusterConfig> {
        self.clusters.iter().find(|c| c.name == name)
    }

    /// Check the configuration, collecting every problem found
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.cache.enabled && self.cache.ttl_seconds == 0 {
            errors.push("cache.ttl_seconds must be > 0 when the cache is enabled".to_string());
        }
        if self.fanout.concurrency == 0 {
            errors.push("fanout.concurrency must be > 0".to_string());
        }
        if self.http.request_timeout_seconds == 0 {
            errors.push("http.request_timeout_seconds must be > 0".to_string());
        }

        let mut cluster_names = std::collections::HashSet::new();
        for cluster in &self.clusters {
            if cluster.name.trim().is_empty() {
                errors.push("cluster name must not be empty".to_string());
            }
            if !cluster_names.insert(cluster.name.as_str()) {
                errors.push(format!("duplicate cluster name '{}'", cluster.name));
            }

            let mut connect_names = std::collections::HashSet::new();
            for connect in &cluster.kafka_connect {
                if connect.name.trim().is_empty() {
                    errors.push(format!("cluster '{}': connect name must not be empty", cluster.name));
                }
                if !connect_names.insert(connect.name.as_str()) {
                    errors.push(format!(
                        "cluster '{}': duplicate connect name '{}'",
                        cluster.name, connect.name
                    ));
                }
                if connect.addresses.is_empty() {
                    errors.push(format!(
                        "cluster '{}': connect '{}' has no addresses",
                        cluster.name, connect.name
                    ));
                }
                for address in &connect.addresses {
                    match url::Url::parse(address) {
                        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                        Ok(url) => errors.push(format!(
                            "cluster '{}': connect '{}' address '{}' has unsupported scheme '{}'",
                            cluster.name,
                            connect.name,
                            address,
                            url.scheme()
                        )),
                        Err(e) => errors.push(format!(
                            "cluster '{}': connect '{}' address '{}' is invalid: {e}",
                            cluster.name, connect.name, address
                        )),
                    }
                }
                if connect.password.is_some() && connect.username.is_none() {
                    errors.push(format!(
                        "cluster '{}': connect '{}' has a password but no username",
                        cluster.name, connect.name
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
