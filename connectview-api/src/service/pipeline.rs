//! Connector record aggregation
//!
//! Turns one listing plus several per-connector calls into complete
//! [`ConnectorRecord`]s. Two shapes exist: the bulk fetch used for cluster
//! statistics (metadata, status and tasks) and the full fetch used for the
//! connector table (adds sanitized config and topics).
//!
//! Failures are isolated per item. A connector whose metadata or status
//! cannot be read is left out of the batch, and so is a task whose status
//! cannot be read. A failed config, task list or topic read degrades to an
//! empty value on that record only.

use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, warn};

use connectview_cluster::client::TaskInfo;
use connectview_cluster::LogicalCluster;
use connectview_core::fanout::{join_all_bounded, join_partial};
use connectview_core::models::{
    ConnectorConfig, ConnectorDetail, ConnectorRecord, ConnectorStatus, ConnectorType, TaskRecord,
};
use connectview_core::{ConfigSanitizer, Error, Result};

/// Which parts of a record to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchShape {
    /// Metadata, status and tasks; `config` and `topics` stay `None`
    Bulk,
    /// Everything, including sanitized config and topics
    Full,
}

pub struct AggregationPipeline {
    sanitizer: Arc<ConfigSanitizer>,
    concurrency: usize,
}

impl AggregationPipeline {
    pub fn new(sanitizer: Arc<ConfigSanitizer>, concurrency: usize) -> Self {
        Self {
            sanitizer,
            concurrency: concurrency.max(1),
        }
    }

    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn sanitizer(&self) -> &ConfigSanitizer {
        &self.sanitizer
    }

    /// Records of every connector, without config and topics
    pub async fn fetch_bulk(&self, connect: &LogicalCluster) -> Vec<ConnectorRecord> {
        self.fetch_all(connect, FetchShape::Bulk).await
    }

    /// Records of every connector, with sanitized config and topics
    pub async fn fetch_full(&self, connect: &LogicalCluster) -> Vec<ConnectorRecord> {
        self.fetch_all(connect, FetchShape::Full).await
    }

    async fn fetch_all(&self, connect: &LogicalCluster, shape: FetchShape) -> Vec<ConnectorRecord> {
        let names = match connect
            .selector()
            .call_list(|c| async move { c.list_connectors().await })
            .await
        {
            Ok(names) => names,
            Err(e) => {
                warn!(connect = %connect.key(), error = %e, "Failed to list connectors, treating as empty");
                return Vec::new();
            }
        };

        let fetches: Vec<_> = names
            .into_iter()
            .map(move |name| {
                async move {
                    let record = self.fetch_record(connect, &name, shape).await;
                    record.map_err(|e| (name, e))
                }
                .boxed()
            })
            .collect();

        join_partial(fetches, self.concurrency, |(name, e)| {
            warn!(
                connect = %connect.key(),
                connector = %name,
                error = %e,
                "Failed to fetch connector, omitting it"
            );
        })
        .await
    }

    /// Assemble one record; fails only if metadata or status cannot be read
    pub async fn fetch_record(
        &self,
        connect: &LogicalCluster,
        name: &str,
        shape: FetchShape,
    ) -> Result<ConnectorRecord> {
        let (detail, tasks, config, topics) = match shape {
            FetchShape::Bulk => {
                let (detail, tasks) =
                    tokio::join!(self.fetch_detail(connect, name), self.fetch_tasks(connect, name));
                (detail, tasks, None, None)
            }
            FetchShape::Full => {
                let (detail, tasks, config, topics) = tokio::join!(
                    self.fetch_detail(connect, name),
                    self.fetch_tasks(connect, name),
                    self.fetch_config(connect, name),
                    self.fetch_topics(connect, name),
                );
                let config = config.unwrap_or_else(|e| {
                    warn!(connect = %connect.key(), connector = %name, error = %e, "Failed to fetch connector config");
                    ConnectorConfig::new()
                });
                (detail, tasks, Some(config), Some(topics))
            }
        };

        let detail = detail?;
        let tasks = tasks.unwrap_or_else(|e| {
            warn!(connect = %connect.key(), connector = %name, error = %e, "Failed to fetch connector tasks");
            Vec::new()
        });

        Ok(ConnectorRecord::assemble(detail, connect.display_name(), config, tasks, topics))
    }

    /// Metadata and status of one connector
    ///
    /// A missing status (404) means the connector is not assigned to a
    /// worker yet and is reported as `UNASSIGNED`.
    pub async fn fetch_detail(&self, connect: &LogicalCluster, name: &str) -> Result<ConnectorDetail> {
        let selector = connect.selector();
        let (info, status) = tokio::join!(
            selector.call(|c| async move { c.get_connector(name).await }),
            selector.call(|c| async move { c.get_connector_status(name).await }),
        );
        let info = info?;

        let (status, status_type) = match status {
            Ok(status) => {
                let any_task_failed = status.tasks.iter().any(|t| t.state.is_failed());
                (
                    ConnectorStatus::new(
                        status.connector.state,
                        status.connector.worker_id,
                        status.connector.trace,
                        any_task_failed,
                    ),
                    status.connector_type,
                )
            }
            Err(Error::NotFound(_)) => {
                debug!(connect = %connect.key(), connector = %name, "No status yet, reporting unassigned");
                (ConnectorStatus::unassigned(), None)
            }
            Err(e) => return Err(e),
        };

        let connector_type =
            ConnectorType::from_remote(info.connector_type.as_deref().or(status_type.as_deref()));

        Ok(ConnectorDetail {
            tasks: info.task_ids(),
            config: self.sanitizer.sanitize(info.config),
            name: info.name,
            connect: connect.name().to_string(),
            connector_type,
            status,
        })
    }

    /// Task records of one connector
    ///
    /// A missing task list (404) is an empty list. A task whose status
    /// cannot be read is left out; its siblings are kept. Only a failure to
    /// list the tasks fails the whole call.
    pub async fn fetch_tasks(&self, connect: &LogicalCluster, name: &str) -> Result<Vec<TaskRecord>> {
        let selector = connect.selector();
        let tasks: Vec<TaskInfo> = match selector
            .call_list(|c| async move { c.get_connector_tasks(name).await })
            .await
        {
            Ok(tasks) => tasks,
            Err(Error::NotFound(_)) => {
                debug!(connect = %connect.key(), connector = %name, "Task list not found, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let ids: Vec<u32> = tasks.iter().map(|task| task.id.task).collect();
        let statuses: Vec<_> = ids
            .into_iter()
            .map(move |id| {
                async move {
                    let status = selector
                        .call(|c| async move { c.get_task_status(name, id).await })
                        .await;
                    (id, status)
                }
                .boxed()
            })
            .collect();

        let mut records = Vec::with_capacity(statuses.len());
        for (id, status) in join_all_bounded(statuses, self.concurrency).await {
            match status {
                Ok(status) => records.push(TaskRecord::from(status)),
                Err(Error::NotFound(_)) => {
                    debug!(connect = %connect.key(), connector = %name, task = id, "Task status not found, omitting task");
                }
                Err(e) => {
                    warn!(connect = %connect.key(), connector = %name, task = id, error = %e, "Failed to fetch task status, omitting task");
                }
            }
        }
        Ok(records)
    }

    /// Sanitized configuration of one connector
    pub async fn fetch_config(&self, connect: &LogicalCluster, name: &str) -> Result<ConnectorConfig> {
        let config = connect
            .selector()
            .call(|c| async move { c.get_connector_config(name).await })
            .await?;
        Ok(self.sanitizer.sanitize(config))
    }

    /// Topics used by one connector; any failure yields an empty list
    pub async fn fetch_topics(&self, connect: &LogicalCluster, name: &str) -> Vec<String> {
        match connect
            .selector()
            .call(|c| async move { c.get_connector_topics(name).await })
            .await
        {
            Ok(mut topics) => topics.remove(name).map(|t| t.topics).unwrap_or_default(),
            Err(e) => {
                debug!(connect = %connect.key(), connector = %name, error = %e, "Failed to fetch topics");
                Vec::new()
            }
        }
    }
}
