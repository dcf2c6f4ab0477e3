//! Kafka Connect HTTP client
//!
//! Pure REST client for one connect endpoint; failover across endpoints is
//! layered on top by the selector.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use connectview_core::config::HttpConfig;
use connectview_core::models::{
    ConnectorConfig, ConnectorPlugin, NewConnector, PluginConfigValidation,
};
use connectview_core::resilience::timeout::TimeoutConfig;

use super::error::{check_response, json_with_limit, ClientError};
use super::types::{
    ConnectorInfo, ConnectorStatusInfo, ConnectorTopicsResponse, TaskInfo, TaskStatusInfo,
};
use super::{ClientResult, ConnectClient};

/// Default upper bound for a response body (10 MiB)
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024;

/// Build the HTTP client shared by every endpoint of a registry
///
/// Redirects are disabled: a connect worker answers directly or forwards the
/// request to the leader itself.
pub fn build_http_client(timeouts: TimeoutConfig) -> ClientResult<Client> {
    Client::builder()
        .connect_timeout(timeouts.connect)
        .timeout(timeouts.request)
        .pool_max_idle_per_host(10)
        .redirect(reqwest::redirect::Policy::none())
        .user_agent(concat!("connectview/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ClientError::InvalidConfig(format!("failed to build HTTP client: {e}")))
}

#[derive(Debug, Clone)]
struct BasicAuth {
    username: String,
    password: Option<String>,
}

/// REST client bound to one endpoint address
#[derive(Debug, Clone)]
pub struct HttpConnectClient {
    base_url: Url,
    auth: Option<BasicAuth>,
    client: Client,
    max_response_bytes: usize,
}

impl HttpConnectClient {
    /// Create a client for `address`, reusing `client`'s connection pool
    pub fn new(address: &str, client: Client) -> ClientResult<Self> {
        let base_url = Url::parse(address)
            .map_err(|e| ClientError::InvalidConfig(format!("invalid address {address}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidConfig(format!(
                "address {address} cannot be used as a base URL"
            )));
        }

        Ok(Self {
            base_url,
            auth: None,
            client,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        })
    }

    /// Create a client from the `http` configuration section
    pub fn from_config(
        address: &str,
        client: Client,
        config: &HttpConfig,
        username: Option<&str>,
        password: Option<&str>,
    ) -> ClientResult<Self> {
        let mut http = Self::new(address, client)?.with_max_response_bytes(config.max_response_bytes);
        if let Some(username) = username {
            http = http.with_basic_auth(username, password.map(ToString::to_string));
        }
        Ok(http)
    }

    #[must_use]
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.auth = Some(BasicAuth {
            username: username.into(),
            password,
        });
        self
    }

    #[must_use]
    pub const fn with_max_response_bytes(mut self, max: usize) -> Self {
        self.max_response_bytes = max;
        self
    }

    #[must_use]
    pub fn address(&self) -> &str {
        self.base_url.as_str()
    }

    /// Append percent-encoded path segments to the base URL
    fn url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                ClientError::InvalidConfig(format!("{} cannot be a base URL", self.base_url))
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(method = %method, url = %url, "Connect API request");
        let request = self.client.request(method, url);
        match &self.auth {
            Some(auth) => request.basic_auth(&auth.username, auth.password.as_ref()),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> ClientResult<Response> {
        let response = request.send().await?;
        check_response(response, self.max_response_bytes).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ClientResult<T> {
        let response = self.execute(self.request(Method::GET, url)).await?;
        json_with_limit(response, self.max_response_bytes).await
    }

    async fn send_json<B, T>(&self, method: Method, url: Url, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.execute(self.request(method, url).json(body)).await?;
        json_with_limit(response, self.max_response_bytes).await
    }

    /// Send a request whose response body is irrelevant
    async fn send_empty(&self, request: RequestBuilder) -> ClientResult<()> {
        self.execute(request).await?;
        Ok(())
    }
}

#[async_trait]
impl ConnectClient for HttpConnectClient {
    async fn list_connectors(&self) -> ClientResult<Vec<String>> {
        self.get_json(self.url(&["connectors"])?).await
    }

    async fn get_connector(&self, name: &str) -> ClientResult<ConnectorInfo> {
        self.get_json(self.url(&["connectors", name])?).await
    }

    async fn create_connector(&self, connector: &NewConnector) -> ClientResult<ConnectorInfo> {
        self.send_json(Method::POST, self.url(&["connectors"])?, connector)
            .await
    }

    async fn delete_connector(&self, name: &str) -> ClientResult<()> {
        let url = self.url(&["connectors", name])?;
        self.send_empty(self.request(Method::DELETE, url)).await
    }

    async fn get_connector_config(&self, name: &str) -> ClientResult<ConnectorConfig> {
        self.get_json(self.url(&["connectors", name, "config"])?)
            .await
    }

    async fn set_connector_config(
        &self,
        name: &str,
        config: &ConnectorConfig,
    ) -> ClientResult<ConnectorInfo> {
        let url = self.url(&["connectors", name, "config"])?;
        self.send_json(Method::PUT, url, config).await
    }

    async fn get_connector_status(&self, name: &str) -> ClientResult<ConnectorStatusInfo> {
        self.get_json(self.url(&["connectors", name, "status"])?)
            .await
    }

    async fn get_connector_tasks(&self, name: &str) -> ClientResult<Vec<TaskInfo>> {
        self.get_json(self.url(&["connectors", name, "tasks"])?)
            .await
    }

    async fn get_task_status(&self, name: &str, task: u32) -> ClientResult<TaskStatusInfo> {
        let task = task.to_string();
        self.get_json(self.url(&["connectors", name, "tasks", &task, "status"])?)
            .await
    }

    async fn restart_connector(
        &self,
        name: &str,
        include_tasks: bool,
        only_failed: bool,
    ) -> ClientResult<()> {
        let url = self.url(&["connectors", name, "restart"])?;
        let request = self
            .request(Method::POST, url)
            .query(&[("includeTasks", include_tasks), ("onlyFailed", only_failed)]);
        self.send_empty(request).await
    }

    async fn restart_task(&self, name: &str, task: u32) -> ClientResult<()> {
        let task = task.to_string();
        let url = self.url(&["connectors", name, "tasks", &task, "restart"])?;
        self.send_empty(self.request(Method::POST, url)).await
    }

    async fn pause_connector(&self, name: &str) -> ClientResult<()> {
        let url = self.url(&["connectors", name, "pause"])?;
        self.send_empty(self.request(Method::PUT, url)).await
    }

    async fn stop_connector(&self, name: &str) -> ClientResult<()> {
        let url = self.url(&["connectors", name, "stop"])?;
        self.send_empty(self.request(Method::PUT, url)).await
    }

    async fn resume_connector(&self, name: &str) -> ClientResult<()> {
        let url = self.url(&["connectors", name, "resume"])?;
        self.send_empty(self.request(Method::PUT, url)).await
    }

    async fn list_plugins(&self) -> ClientResult<Vec<ConnectorPlugin>> {
        self.get_json(self.url(&["connector-plugins"])?).await
    }

    async fn validate_plugin_config(
        &self,
        plugin: &str,
        config: &ConnectorConfig,
    ) -> ClientResult<PluginConfigValidation> {
        let url = self.url(&["connector-plugins", plugin, "config", "validate"])?;
        self.send_json(Method::PUT, url, config).await
    }

    async fn reset_connector_offsets(&self, name: &str) -> ClientResult<()> {
        let url = self.url(&["connectors", name, "offsets"])?;
        self.send_empty(self.request(Method::DELETE, url)).await
    }

    async fn get_connector_topics(&self, name: &str) -> ClientResult<ConnectorTopicsResponse> {
        self.get_json(self.url(&["connectors", name, "topics"])?)
            .await
    }
}
