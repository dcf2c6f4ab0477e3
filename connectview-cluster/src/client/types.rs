//! Wire types of the Kafka Connect REST API

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use connectview_core::models::{ConnectorConfig, ConnectorState, TaskRecord, TaskState};

/// `{connector, task}` pair identifying one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskId {
    pub connector: String,
    pub task: u32,
}

/// Response of `GET /connectors/{name}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorInfo {
    pub name: String,
    #[serde(default)]
    pub config: ConnectorConfig,
    #[serde(default)]
    pub tasks: Vec<TaskId>,
    #[serde(rename = "type", default)]
    pub connector_type: Option<String>,
}

impl ConnectorInfo {
    pub fn task_ids(&self) -> Vec<u32> {
        self.tasks.iter().map(|t| t.task).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorStateInfo {
    pub state: ConnectorState,
    #[serde(default)]
    pub worker_id: Option<String>,
    #[serde(default)]
    pub trace: Option<String>,
}

/// Response of `GET /connectors/{name}/tasks/{id}/status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatusInfo {
    pub id: u32,
    pub state: TaskState,
    #[serde(default)]
    pub worker_id: Option<String>,
    #[serde(default)]
    pub trace: Option<String>,
}

impl From<TaskStatusInfo> for TaskRecord {
    fn from(info: TaskStatusInfo) -> Self {
        Self {
            id: info.id,
            worker_id: info.worker_id,
            state: info.state,
            trace: info.trace,
        }
    }
}

/// Response of `GET /connectors/{name}/status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorStatusInfo {
    pub name: String,
    pub connector: ConnectorStateInfo,
    #[serde(default)]
    pub tasks: Vec<TaskStatusInfo>,
    #[serde(rename = "type", default)]
    pub connector_type: Option<String>,
}

/// One element of `GET /connectors/{name}/tasks`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub id: TaskId,
    #[serde(default)]
    pub config: ConnectorConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorTopics {
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Response of `GET /connectors/{name}/topics`, keyed by connector name
pub type ConnectorTopicsResponse = HashMap<String, ConnectorTopics>;
