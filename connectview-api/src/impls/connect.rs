//! Connect API Implementation
//!
//! Unified implementation of every connect operation exposed upward.
//! Command-line and server front ends are thin wrappers around it.

use std::sync::Arc;

use futures::FutureExt;
use tracing::warn;

use connectview_cluster::{ConnectRegistry, LogicalCluster};
use connectview_core::cache::ConnectorsCache;
use connectview_core::fanout::join_all_bounded;
use connectview_core::models::{
    ActionRequest, ConnectStats, ConnectSummary, ConnectorAction, ConnectorConfig, ConnectorDetail,
    ConnectorPlugin, ConnectorQuery, ConnectorRecord, NewConnector, PluginConfigValidation,
    TaskRecord,
};
use connectview_core::{Config, ConfigSanitizer, Result};

use crate::service::{search, ActionDispatcher, AggregationPipeline};

/// Connect API implementation
#[derive(Clone)]
pub struct ConnectApiImpl {
    registry: Arc<ConnectRegistry>,
    cache: Arc<ConnectorsCache>,
    pipeline: Arc<AggregationPipeline>,
    dispatcher: Arc<ActionDispatcher>,
}

impl ConnectApiImpl {
    pub fn new(
        registry: Arc<ConnectRegistry>,
        cache: Arc<ConnectorsCache>,
        pipeline: Arc<AggregationPipeline>,
    ) -> Self {
        Self {
            registry,
            cache,
            dispatcher: Arc::new(ActionDispatcher::new(pipeline.clone())),
            pipeline,
        }
    }

    /// Wire registry, cache and pipeline from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let sanitizer = Arc::new(ConfigSanitizer::new(&config.sanitizer)?);
        let registry = Arc::new(ConnectRegistry::from_config(config)?);
        let cache = Arc::new(ConnectorsCache::new(&config.cache));
        let pipeline = Arc::new(AggregationPipeline::new(sanitizer, config.fanout.concurrency));
        Ok(Self::new(registry, cache, pipeline))
    }

    pub fn registry(&self) -> &ConnectRegistry {
        &self.registry
    }

    fn connect(&self, cluster: &str, connect: &str) -> Result<Arc<LogicalCluster>> {
        self.registry.connect(cluster, connect)
    }

    /// Bulk records of one logical cluster, served from the cache
    async fn cached_connectors(&self, connect: &LogicalCluster) -> Result<Arc<Vec<ConnectorRecord>>> {
        let pipeline = &self.pipeline;
        self.cache
            .get(connect.key().clone(), |_| async move {
                Ok(Arc::new(pipeline.fetch_bulk(connect).await))
            })
            .await
    }

    async fn invalidate(&self, connect: &LogicalCluster) {
        self.cache.invalidate(connect.key()).await;
    }

    // === Connect clusters ===

    pub async fn get_connects(&self, cluster: &str, with_stats: bool) -> Result<Vec<ConnectSummary>> {
        let connects = self.registry.connects(cluster)?;
        if !with_stats {
            return Ok(connects.iter().map(|c| c.summary(None)).collect());
        }

        let summaries: Vec<_> = connects
            .iter()
            .cloned()
            .map(|connect| {
                async move {
                    let stats = match self.cached_connectors(&connect).await {
                        Ok(records) => Some(ConnectStats::from_records(&records)),
                        Err(e) => {
                            warn!(connect = %connect.key(), error = %e, "Failed to compute connect stats");
                            None
                        }
                    };
                    connect.summary(stats)
                }
                .boxed()
            })
            .collect();
        Ok(join_all_bounded(summaries, self.pipeline.concurrency()).await)
    }

    // === Connectors ===

    pub async fn get_connector_names(&self, cluster: &str, connect: &str) -> Result<Vec<String>> {
        let connect = self.connect(cluster, connect)?;
        connect
            .selector()
            .call_list(|c| async move { c.list_connectors().await })
            .await
    }

    pub async fn create_connector(
        &self,
        cluster: &str,
        connect: &str,
        connector: NewConnector,
    ) -> Result<ConnectorDetail> {
        let connect = self.connect(cluster, connect)?;
        let detail = self.dispatcher.create(&connect, &connector).await?;
        self.invalidate(&connect).await;
        Ok(detail)
    }

    pub async fn get_connector(&self, cluster: &str, connect: &str, name: &str) -> Result<ConnectorDetail> {
        let connect = self.connect(cluster, connect)?;
        self.pipeline.fetch_detail(&connect, name).await
    }

    /// Sanitized configuration of one connector
    pub async fn get_connector_config(
        &self,
        cluster: &str,
        connect: &str,
        name: &str,
    ) -> Result<ConnectorConfig> {
        let connect = self.connect(cluster, connect)?;
        self.pipeline.fetch_config(&connect, name).await
    }

    pub async fn set_connector_config(
        &self,
        cluster: &str,
        connect: &str,
        name: &str,
        config: ConnectorConfig,
    ) -> Result<ConnectorDetail> {
        let connect = self.connect(cluster, connect)?;
        let config = &config;
        connect
            .selector()
            .call(|c| async move { c.set_connector_config(name, config).await })
            .await?;
        self.invalidate(&connect).await;
        self.pipeline.fetch_detail(&connect, name).await
    }

    pub async fn delete_connector(&self, cluster: &str, connect: &str, name: &str) -> Result<()> {
        let connect = self.connect(cluster, connect)?;
        connect
            .selector()
            .call(|c| async move { c.delete_connector(name).await })
            .await?;
        self.invalidate(&connect).await;
        Ok(())
    }

    /// Apply a lifecycle action; the target connect is named by the request
    ///
    /// The cached aggregate is dropped whether or not the action succeeded.
    pub async fn update_connector_state(&self, cluster: &str, request: &ActionRequest) -> Result<()> {
        let connect = self.connect(cluster, &request.connect)?;
        let result = self.dispatcher.dispatch(&connect, request).await;
        self.invalidate(&connect).await;
        result
    }

    // === Tasks ===

    pub async fn get_connector_tasks(
        &self,
        cluster: &str,
        connect: &str,
        name: &str,
    ) -> Result<Vec<TaskRecord>> {
        let connect = self.connect(cluster, connect)?;
        self.pipeline.fetch_tasks(&connect, name).await
    }

    pub async fn restart_connector_task(
        &self,
        cluster: &str,
        connect: &str,
        name: &str,
        task: u32,
    ) -> Result<()> {
        let request = ActionRequest::new(connect, name, ConnectorAction::Restart).with_task(task);
        self.update_connector_state(cluster, &request).await
    }

    // === Plugins ===

    pub async fn get_connector_plugins(&self, cluster: &str, connect: &str) -> Result<Vec<ConnectorPlugin>> {
        let connect = self.connect(cluster, connect)?;
        connect
            .selector()
            .call_list(|c| async move { c.list_plugins().await })
            .await
    }

    pub async fn validate_connector_plugin_config(
        &self,
        cluster: &str,
        connect: &str,
        plugin: &str,
        config: ConnectorConfig,
    ) -> Result<PluginConfigValidation> {
        let connect = self.connect(cluster, connect)?;
        let config = &config;
        connect
            .selector()
            .call(|c| async move { c.validate_plugin_config(plugin, config).await })
            .await
    }

    // === Offsets ===

    pub async fn reset_connector_offsets(&self, cluster: &str, connect: &str, name: &str) -> Result<()> {
        let connect = self.connect(cluster, connect)?;
        self.dispatcher.reset_offsets(&connect, name).await
    }

    // === Connector table ===

    /// Full records of every connector of every connect of `cluster`,
    /// filtered and ordered by `query`
    pub async fn get_all_connectors(
        &self,
        cluster: &str,
        query: &ConnectorQuery,
    ) -> Result<Vec<ConnectorRecord>> {
        let connects = self.registry.connects(cluster)?;
        let fetches: Vec<_> = connects
            .iter()
            .cloned()
            .map(|connect| async move { self.pipeline.fetch_full(&connect).await }.boxed())
            .collect();
        let records = join_all_bounded(fetches, self.pipeline.concurrency())
            .await
            .into_iter()
            .flatten()
            .collect();
        Ok(search::apply(records, query))
    }
}
