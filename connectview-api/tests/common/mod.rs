//! In-memory connect cluster for API tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use connectview_api::service::AggregationPipeline;
use connectview_api::ConnectApiImpl;
use connectview_cluster::client::{
    ConnectorInfo, ConnectorStateInfo, ConnectorStatusInfo, ConnectorTopics,
    ConnectorTopicsResponse, TaskId, TaskInfo, TaskStatusInfo,
};
use connectview_cluster::discovery::{Endpoint, EndpointSet};
use connectview_cluster::{
    ClientError, ClientResult, ConnectClient, ConnectRegistry, FailoverSelector, LogicalCluster,
};
use connectview_core::cache::ConnectorsCache;
use connectview_core::config::CacheConfig;
use connectview_core::models::{
    ConnectCacheKey, ConnectorConfig, ConnectorPlugin, ConnectorState, NewConnector,
    PluginConfigValidation, TaskState,
};
use connectview_core::ConfigSanitizer;

pub const CLUSTER: &str = "local";

/// One connector held by the fake, with knobs for remote misbehavior
#[derive(Debug, Clone)]
pub struct FakeConnector {
    pub name: String,
    pub connector_type: &'static str,
    pub config: ConnectorConfig,
    /// `None` answers the status call with 404
    pub state: Option<ConnectorState>,
    pub tasks: Vec<TaskState>,
    pub task_list_missing: bool,
    pub missing_task_status: Vec<u32>,
    /// Tasks whose status call fails with 409
    pub failing_task_status: Vec<u32>,
    /// `None` fails the topics call
    pub topics: Option<Vec<String>>,
    pub metadata_fails: bool,
    pub failing_task_restarts: Vec<u32>,
    /// Status the offsets reset answers with when it fails
    pub offsets_error: Option<u16>,
}

impl FakeConnector {
    pub fn new(name: &str, state: ConnectorState) -> Self {
        let mut config = ConnectorConfig::new();
        config.insert("connector.class".to_string(), "FileStreamSink".to_string());
        config.insert("name".to_string(), name.to_string());
        Self {
            name: name.to_string(),
            connector_type: "sink",
            config,
            state: Some(state),
            tasks: Vec::new(),
            task_list_missing: false,
            missing_task_status: Vec::new(),
            failing_task_status: Vec::new(),
            topics: Some(Vec::new()),
            metadata_fails: false,
            failing_task_restarts: Vec::new(),
            offsets_error: None,
        }
    }

    pub fn source(mut self) -> Self {
        self.connector_type = "source";
        self
    }

    pub fn with_tasks(mut self, tasks: &[TaskState]) -> Self {
        self.tasks = tasks.to_vec();
        self
    }

    pub fn with_topics(mut self, topics: &[&str]) -> Self {
        self.topics = Some(topics.iter().map(ToString::to_string).collect());
        self
    }

    pub fn with_config(mut self, key: &str, value: &str) -> Self {
        self.config.insert(key.to_string(), value.to_string());
        self
    }

    pub fn failing_topics(mut self) -> Self {
        self.topics = None;
        self
    }

    pub fn without_status(mut self) -> Self {
        self.state = None;
        self
    }

    pub fn failing_status_of(mut self, task: u32) -> Self {
        self.failing_task_status.push(task);
        self
    }

    pub fn failing_restart_of(mut self, task: u32) -> Self {
        self.failing_task_restarts.push(task);
        self
    }

    fn task_ids(&self) -> Vec<TaskId> {
        (0..self.tasks.len() as u32)
            .map(|task| TaskId {
                connector: self.name.clone(),
                task,
            })
            .collect()
    }

    fn task_status(&self, task: u32) -> TaskStatusInfo {
        let state = self.tasks[task as usize];
        TaskStatusInfo {
            id: task,
            state,
            worker_id: Some("worker-1:8083".to_string()),
            trace: state.is_failed().then(|| "java.lang.RuntimeException".to_string()),
        }
    }
}

/// Fake connect endpoint recording every call it receives
#[derive(Default)]
pub struct FakeConnectClient {
    connectors: Mutex<Vec<FakeConnector>>,
    calls: Mutex<Vec<String>>,
    list_fails: Mutex<bool>,
    list_delay: Mutex<Duration>,
}

impl FakeConnectClient {
    pub fn new(connectors: Vec<FakeConnector>) -> Arc<Self> {
        Arc::new(Self {
            connectors: Mutex::new(connectors),
            ..Default::default()
        })
    }

    pub fn set_list_fails(&self, fails: bool) {
        *self.list_fails.lock() = fails;
    }

    pub fn set_list_delay(&self, delay: Duration) {
        *self.list_delay.lock() = delay;
    }

    pub fn update(&self, name: &str, f: impl FnOnce(&mut FakeConnector)) {
        if let Some(connector) = self.connectors.lock().iter_mut().find(|c| c.name == name) {
            f(connector);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Number of recorded calls starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }

    fn with_connector<T>(
        &self,
        name: &str,
        f: impl FnOnce(&FakeConnector) -> ClientResult<T>,
    ) -> ClientResult<T> {
        let connectors = self.connectors.lock();
        match connectors.iter().find(|c| c.name == name) {
            Some(connector) => f(connector),
            None => Err(ClientError::http(404, format!("Connector {name} not found"))),
        }
    }
}

#[async_trait]
impl ConnectClient for FakeConnectClient {
    async fn list_connectors(&self) -> ClientResult<Vec<String>> {
        self.record("list_connectors".to_string());
        let delay = *self.list_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if *self.list_fails.lock() {
            return Err(ClientError::http(409, "Cannot complete request momentarily due to rebalance"));
        }
        Ok(self.connectors.lock().iter().map(|c| c.name.clone()).collect())
    }

    async fn get_connector(&self, name: &str) -> ClientResult<ConnectorInfo> {
        self.record(format!("get_connector {name}"));
        self.with_connector(name, |c| {
            if c.metadata_fails {
                return Err(ClientError::http(409, "rebalance in progress"));
            }
            Ok(ConnectorInfo {
                name: c.name.clone(),
                config: c.config.clone(),
                tasks: c.task_ids(),
                connector_type: Some(c.connector_type.to_string()),
            })
        })
    }

    async fn create_connector(&self, connector: &NewConnector) -> ClientResult<ConnectorInfo> {
        self.record(format!("create_connector {}", connector.name));
        let mut created = FakeConnector::new(&connector.name, ConnectorState::Running);
        created.config = connector.config.clone();
        self.connectors.lock().push(created);
        Ok(ConnectorInfo {
            name: connector.name.clone(),
            config: connector.config.clone(),
            tasks: Vec::new(),
            connector_type: Some("sink".to_string()),
        })
    }

    async fn delete_connector(&self, name: &str) -> ClientResult<()> {
        self.record(format!("delete_connector {name}"));
        self.with_connector(name, |_| Ok(()))?;
        self.connectors.lock().retain(|c| c.name != name);
        Ok(())
    }

    async fn get_connector_config(&self, name: &str) -> ClientResult<ConnectorConfig> {
        self.record(format!("get_connector_config {name}"));
        self.with_connector(name, |c| Ok(c.config.clone()))
    }

    async fn set_connector_config(
        &self,
        name: &str,
        config: &ConnectorConfig,
    ) -> ClientResult<ConnectorInfo> {
        self.record(format!("set_connector_config {name}"));
        self.update(name, |c| c.config = config.clone());
        self.with_connector(name, |c| {
            Ok(ConnectorInfo {
                name: c.name.clone(),
                config: c.config.clone(),
                tasks: c.task_ids(),
                connector_type: Some(c.connector_type.to_string()),
            })
        })
    }

    async fn get_connector_status(&self, name: &str) -> ClientResult<ConnectorStatusInfo> {
        self.record(format!("get_connector_status {name}"));
        self.with_connector(name, |c| {
            let state = c
                .state
                .ok_or_else(|| ClientError::http(404, format!("No status found for connector {name}")))?;
            Ok(ConnectorStatusInfo {
                name: c.name.clone(),
                connector: ConnectorStateInfo {
                    state,
                    worker_id: Some("worker-1:8083".to_string()),
                    trace: None,
                },
                tasks: (0..c.tasks.len() as u32).map(|t| c.task_status(t)).collect(),
                connector_type: Some(c.connector_type.to_string()),
            })
        })
    }

    async fn get_connector_tasks(&self, name: &str) -> ClientResult<Vec<TaskInfo>> {
        self.record(format!("get_connector_tasks {name}"));
        self.with_connector(name, |c| {
            if c.task_list_missing {
                return Err(ClientError::http(404, format!("Connector {name} not found")));
            }
            Ok(c.task_ids()
                .into_iter()
                .map(|id| TaskInfo {
                    id,
                    config: ConnectorConfig::new(),
                })
                .collect())
        })
    }

    async fn get_task_status(&self, name: &str, task: u32) -> ClientResult<TaskStatusInfo> {
        self.record(format!("get_task_status {name} {task}"));
        self.with_connector(name, |c| {
            if c.missing_task_status.contains(&task) || task as usize >= c.tasks.len() {
                return Err(ClientError::http(404, format!("No status found for task {name}-{task}")));
            }
            if c.failing_task_status.contains(&task) {
                return Err(ClientError::http(409, "rebalance in progress"));
            }
            Ok(c.task_status(task))
        })
    }

    async fn restart_connector(
        &self,
        name: &str,
        include_tasks: bool,
        only_failed: bool,
    ) -> ClientResult<()> {
        self.record(format!("restart_connector {name} {include_tasks} {only_failed}"));
        self.with_connector(name, |_| Ok(()))
    }

    async fn restart_task(&self, name: &str, task: u32) -> ClientResult<()> {
        self.record(format!("restart_task {name} {task}"));
        let mut connectors = self.connectors.lock();
        let connector = connectors
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| ClientError::http(404, format!("Connector {name} not found")))?;
        if connector.failing_task_restarts.contains(&task) {
            return Err(ClientError::http(409, format!("Cannot restart task {task} during rebalance")));
        }
        if let Some(state) = connector.tasks.get_mut(task as usize) {
            *state = TaskState::Running;
        }
        Ok(())
    }

    async fn pause_connector(&self, name: &str) -> ClientResult<()> {
        self.record(format!("pause_connector {name}"));
        self.with_connector(name, |_| Ok(()))
    }

    async fn stop_connector(&self, name: &str) -> ClientResult<()> {
        self.record(format!("stop_connector {name}"));
        self.with_connector(name, |_| Ok(()))
    }

    async fn resume_connector(&self, name: &str) -> ClientResult<()> {
        self.record(format!("resume_connector {name}"));
        self.with_connector(name, |_| Ok(()))
    }

    async fn list_plugins(&self) -> ClientResult<Vec<ConnectorPlugin>> {
        self.record("list_plugins".to_string());
        Ok(vec![ConnectorPlugin {
            class: "org.apache.kafka.connect.file.FileStreamSinkConnector".to_string(),
            plugin_type: Some("sink".to_string()),
            version: Some("3.7.0".to_string()),
        }])
    }

    async fn validate_plugin_config(
        &self,
        plugin: &str,
        config: &ConnectorConfig,
    ) -> ClientResult<PluginConfigValidation> {
        self.record(format!("validate_plugin_config {plugin}"));
        Ok(PluginConfigValidation {
            name: plugin.to_string(),
            error_count: u32::from(!config.contains_key("topics")),
            groups: vec!["Common".to_string()],
            configs: Vec::new(),
        })
    }

    async fn reset_connector_offsets(&self, name: &str) -> ClientResult<()> {
        self.record(format!("reset_connector_offsets {name}"));
        self.with_connector(name, |c| match c.offsets_error {
            Some(status) => Err(ClientError::http(status, "offsets cannot be modified")),
            None => Ok(()),
        })
    }

    async fn get_connector_topics(&self, name: &str) -> ClientResult<ConnectorTopicsResponse> {
        self.record(format!("get_connector_topics {name}"));
        self.with_connector(name, |c| match &c.topics {
            Some(topics) => Ok(HashMap::from([(
                name.to_string(),
                ConnectorTopics { topics: topics.clone() },
            )])),
            None => Err(ClientError::http(403, "Topic tracking is disabled")),
        })
    }
}

pub fn logical_cluster(connect: &str, client: Arc<FakeConnectClient>) -> LogicalCluster {
    let endpoints = EndpointSet::new(vec![Endpoint::new(format!("http://{connect}:8083"), client)]);
    LogicalCluster::new(
        ConnectCacheKey::new(CLUSTER, connect),
        format!("{connect} display"),
        FailoverSelector::new(connect, endpoints),
    )
}

/// API over the given connects of the `local` cluster, with the default sanitizer
pub fn api(connects: Vec<(&str, Arc<FakeConnectClient>)>, cache: &CacheConfig) -> ConnectApiImpl {
    let mut registry = ConnectRegistry::new();
    registry.add_cluster(CLUSTER);
    for (name, client) in connects {
        registry.register(logical_cluster(name, client));
    }

    let pipeline = AggregationPipeline::new(Arc::new(ConfigSanitizer::default()), 8);
    ConnectApiImpl::new(
        Arc::new(registry),
        Arc::new(ConnectorsCache::new(cache)),
        Arc::new(pipeline),
    )
}

pub fn cache_enabled() -> CacheConfig {
    CacheConfig {
        enabled: true,
        ttl_seconds: 60,
        max_capacity: 100,
    }
}
