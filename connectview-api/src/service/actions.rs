//! Connector lifecycle actions
//!
//! A request is first turned into a plan of primitive remote calls by the
//! pure [`plan`] function, then executed. Task-level restarts fan out one
//! call per task and succeed only if every call succeeded.

use std::sync::Arc;

use tracing::{info, warn};

use connectview_cluster::LogicalCluster;
use connectview_core::fanout::join_collect;
use connectview_core::models::{
    ActionRequest, ConnectorAction, ConnectorDetail, NewConnector, TaskRecord,
};
use connectview_core::{Error, Result, TaskRestartFailure};

use super::pipeline::AggregationPipeline;

/// One remote call an action decomposes into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveCall {
    RestartConnector,
    RestartTask(u32),
    Pause,
    Stop,
    Resume,
}

/// Whether planning `request` needs the connector's current tasks
#[must_use]
pub const fn needs_task_snapshot(request: &ActionRequest) -> bool {
    request.task_id.is_none()
        && matches!(
            request.action,
            ConnectorAction::RestartAllTasks | ConnectorAction::RestartFailedTasks
        )
}

/// Decompose `request` into primitive calls
///
/// A task id is only meaningful with `RESTART`, where it restricts the
/// restart to that task.
pub fn plan(request: &ActionRequest, tasks: &[TaskRecord]) -> Result<Vec<PrimitiveCall>> {
    let calls = match (request.action, request.task_id) {
        (ConnectorAction::Restart, Some(task)) => vec![PrimitiveCall::RestartTask(task)],
        (action, Some(task)) => {
            return Err(Error::Validation(format!(
                "Malformed action: {action} does not apply to task {task}"
            )));
        }
        (ConnectorAction::Restart, None) => vec![PrimitiveCall::RestartConnector],
        (ConnectorAction::RestartAllTasks, None) => tasks
            .iter()
            .map(|t| PrimitiveCall::RestartTask(t.id))
            .collect(),
        (ConnectorAction::RestartFailedTasks, None) => tasks
            .iter()
            .filter(|t| t.state.is_failed())
            .map(|t| PrimitiveCall::RestartTask(t.id))
            .collect(),
        (ConnectorAction::Pause, None) => vec![PrimitiveCall::Pause],
        (ConnectorAction::Stop, None) => vec![PrimitiveCall::Stop],
        (ConnectorAction::Resume, None) => vec![PrimitiveCall::Resume],
    };
    Ok(calls)
}

pub struct ActionDispatcher {
    pipeline: Arc<AggregationPipeline>,
}

impl ActionDispatcher {
    pub const fn new(pipeline: Arc<AggregationPipeline>) -> Self {
        Self { pipeline }
    }

    /// Apply a lifecycle action to one connector
    pub async fn dispatch(&self, connect: &LogicalCluster, request: &ActionRequest) -> Result<()> {
        let tasks = if needs_task_snapshot(request) {
            self.pipeline.fetch_tasks(connect, &request.connector).await?
        } else {
            Vec::new()
        };
        let calls = plan(request, &tasks)?;

        info!(
            connect = %connect.key(),
            connector = %request.connector,
            action = %request.action,
            calls = calls.len(),
            "Dispatching connector action"
        );

        if needs_task_snapshot(request) {
            return self.restart_tasks(connect, &request.connector, &calls).await;
        }

        for call in calls {
            execute(connect, &request.connector, call).await?;
        }
        Ok(())
    }

    /// Restart tasks concurrently, collecting every failure
    async fn restart_tasks(
        &self,
        connect: &LogicalCluster,
        connector: &str,
        calls: &[PrimitiveCall],
    ) -> Result<()> {
        let tasks: Vec<u32> = calls
            .iter()
            .filter_map(|call| match call {
                PrimitiveCall::RestartTask(task) => Some(*task),
                _ => None,
            })
            .collect();
        let restarts = tasks.into_iter().map(|task| async move {
            execute(connect, connector, PrimitiveCall::RestartTask(task))
                .await
                .map_err(|e| TaskRestartFailure {
                    task,
                    reason: e.to_string(),
                })
        });

        match join_collect(restarts, self.pipeline.concurrency()).await {
            Ok(_) => Ok(()),
            Err(failures) => {
                warn!(
                    connect = %connect.key(),
                    connector = %connector,
                    failed = failures.len(),
                    "Some task restarts failed"
                );
                Err(Error::TaskRestartFailed {
                    connector: connector.to_string(),
                    failures,
                })
            }
        }
    }

    /// Create a connector unless the name is already taken
    pub async fn create(&self, connect: &LogicalCluster, connector: &NewConnector) -> Result<ConnectorDetail> {
        let selector = connect.selector();
        let existing = selector
            .call_list(|c| async move { c.list_connectors().await })
            .await?;
        if existing.iter().any(|name| name == &connector.name) {
            return Err(Error::Validation(format!(
                "Connector with name {} already exists",
                connector.name
            )));
        }

        selector
            .call(|c| async move { c.create_connector(connector).await })
            .await?;
        info!(connect = %connect.key(), connector = %connector.name, "Connector created");

        self.pipeline.fetch_detail(connect, &connector.name).await
    }

    /// Reset the committed offsets of a stopped connector
    pub async fn reset_offsets(&self, connect: &LogicalCluster, connector: &str) -> Result<()> {
        let result = connect
            .selector()
            .call(|c| async move { c.reset_connector_offsets(connector).await })
            .await;

        match result {
            Ok(()) => {
                info!(connect = %connect.key(), connector = %connector, "Connector offsets reset");
                Ok(())
            }
            Err(e) if e.is_not_found() => Err(Error::NotFound(format!(
                "Connector {connector} not found in {}",
                connect.name()
            ))),
            Err(e) if e.is_bad_request() => Err(Error::ActionRejected(format!(
                "Failed to reset offsets of connector {connector} of {}. Make sure it is STOPPED first.",
                connect.name()
            ))),
            Err(e) => Err(e),
        }
    }
}

async fn execute(connect: &LogicalCluster, connector: &str, call: PrimitiveCall) -> Result<()> {
    let selector = connect.selector();
    match call {
        PrimitiveCall::RestartConnector => {
            selector
                .call(|c| async move { c.restart_connector(connector, false, false).await })
                .await
        }
        PrimitiveCall::RestartTask(task) => {
            selector
                .call(|c| async move { c.restart_task(connector, task).await })
                .await
        }
        PrimitiveCall::Pause => {
            selector
                .call(|c| async move { c.pause_connector(connector).await })
                .await
        }
        PrimitiveCall::Stop => {
            selector
                .call(|c| async move { c.stop_connector(connector).await })
                .await
        }
        PrimitiveCall::Resume => {
            selector
                .call(|c| async move { c.resume_connector(connector).await })
                .await
        }
    }
}
