//! Remote connect REST API client
//!
//! [`ConnectClient`] is the seam between the resilience layer and the wire:
//! the failover selector only ever sees `Arc<dyn ConnectClient>`, so tests can
//! swap in mocks or in-memory fakes for the reqwest-backed [`HttpConnectClient`].

pub mod error;
pub mod http;
pub mod types;

use async_trait::async_trait;

use connectview_core::models::{
    ConnectorConfig, ConnectorPlugin, NewConnector, PluginConfigValidation,
};

pub use error::ClientError;
pub use http::HttpConnectClient;
pub use types::{
    ConnectorInfo, ConnectorStateInfo, ConnectorStatusInfo, ConnectorTopics,
    ConnectorTopicsResponse, TaskId, TaskInfo, TaskStatusInfo,
};

/// Result type of a single remote call
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Operations of one connect endpoint
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectClient: Send + Sync {
    async fn list_connectors(&self) -> ClientResult<Vec<String>>;

    async fn get_connector(&self, name: &str) -> ClientResult<ConnectorInfo>;

    async fn create_connector(&self, connector: &NewConnector) -> ClientResult<ConnectorInfo>;

    async fn delete_connector(&self, name: &str) -> ClientResult<()>;

    async fn get_connector_config(&self, name: &str) -> ClientResult<ConnectorConfig>;

    async fn set_connector_config(
        &self,
        name: &str,
        config: &ConnectorConfig,
    ) -> ClientResult<ConnectorInfo>;

    async fn get_connector_status(&self, name: &str) -> ClientResult<ConnectorStatusInfo>;

    async fn get_connector_tasks(&self, name: &str) -> ClientResult<Vec<TaskInfo>>;

    async fn get_task_status(&self, name: &str, task: u32) -> ClientResult<TaskStatusInfo>;

    async fn restart_connector(
        &self,
        name: &str,
        include_tasks: bool,
        only_failed: bool,
    ) -> ClientResult<()>;

    async fn restart_task(&self, name: &str, task: u32) -> ClientResult<()>;

    async fn pause_connector(&self, name: &str) -> ClientResult<()>;

    async fn stop_connector(&self, name: &str) -> ClientResult<()>;

    async fn resume_connector(&self, name: &str) -> ClientResult<()>;

    async fn list_plugins(&self) -> ClientResult<Vec<ConnectorPlugin>>;

    async fn validate_plugin_config(
        &self,
        plugin: &str,
        config: &ConnectorConfig,
    ) -> ClientResult<PluginConfigValidation>;

    async fn reset_connector_offsets(&self, name: &str) -> ClientResult<()>;

    async fn get_connector_topics(&self, name: &str) -> ClientResult<ConnectorTopicsResponse>;
}
