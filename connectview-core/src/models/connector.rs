use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Connector configuration as exchanged with the remote API.
pub type ConnectorConfig = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum ConnectorType {
    Source,
    Sink,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ConnectorType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "SOURCE",
            Self::Sink => "SINK",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parse the lowercase type string reported by the remote API.
    #[must_use]
    pub fn from_remote(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("source") => Self::Source,
            Some("sink") => Self::Sink,
            _ => Self::Unknown,
        }
    }
}

impl Display for ConnectorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connector state. Declaration order is the order used when sorting by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectorState {
    Running,
    Failed,
    Paused,
    Unassigned,
    TaskFailed,
    Restarting,
    Stopped,
}

impl ConnectorState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Failed => "FAILED",
            Self::Paused => "PAUSED",
            Self::Unassigned => "UNASSIGNED",
            Self::TaskFailed => "TASK_FAILED",
            Self::Restarting => "RESTARTING",
            Self::Stopped => "STOPPED",
        }
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed | Self::TaskFailed)
    }
}

impl Display for ConnectorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Running,
    Failed,
    Paused,
    Restarting,
    Unassigned,
}

impl TaskState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Failed => "FAILED",
            Self::Paused => "PAUSED",
            Self::Restarting => "RESTARTING",
            Self::Unassigned => "UNASSIGNED",
        }
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connector status as presented upward.
///
/// `state` is the effective state: `TaskFailed` whenever a task has failed,
/// otherwise the remote-reported `connector_state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorStatus {
    pub state: ConnectorState,
    pub connector_state: ConnectorState,
    pub worker_id: Option<String>,
    pub trace: Option<String>,
}

impl ConnectorStatus {
    #[must_use]
    pub fn new(
        connector_state: ConnectorState,
        worker_id: Option<String>,
        trace: Option<String>,
        any_task_failed: bool,
    ) -> Self {
        Self {
            state: connector_state,
            connector_state,
            worker_id,
            trace,
        }
        .with_task_failures(any_task_failed)
    }

    /// Status used when the remote has not assigned the connector yet.
    #[must_use]
    pub fn unassigned() -> Self {
        Self::new(ConnectorState::Unassigned, None, None, false)
    }

    /// Recompute the effective state from the task snapshot.
    #[must_use]
    pub fn with_task_failures(mut self, any_task_failed: bool) -> Self {
        self.state = if any_task_failed {
            ConnectorState::TaskFailed
        } else {
            self.connector_state
        };
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Task index within its connector.
    pub id: u32,
    pub worker_id: Option<String>,
    pub state: TaskState,
    pub trace: Option<String>,
}

/// Single-connector view returned by detail and mutation endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorDetail {
    pub name: String,
    pub connect: String,
    #[serde(rename = "type")]
    pub connector_type: ConnectorType,
    /// Task indexes declared by the connector metadata.
    pub tasks: Vec<u32>,
    pub config: ConnectorConfig,
    pub status: ConnectorStatus,
}

/// Aggregated connector record built by one pipeline run.
///
/// `config` and `topics` are `None` in the cheap form used for cluster
/// summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorRecord {
    pub name: String,
    pub connect: String,
    pub connect_display_name: String,
    #[serde(rename = "type")]
    pub connector_type: ConnectorType,
    pub tasks_count: usize,
    pub config: Option<ConnectorConfig>,
    pub status: ConnectorStatus,
    pub tasks: Vec<TaskRecord>,
    pub topics: Option<Vec<String>>,
}

impl ConnectorRecord {
    /// Assemble a record, deriving the effective state from `tasks`.
    #[must_use]
    pub fn assemble(
        detail: ConnectorDetail,
        connect_display_name: impl Into<String>,
        config: Option<ConnectorConfig>,
        tasks: Vec<TaskRecord>,
        topics: Option<Vec<String>>,
    ) -> Self {
        let any_failed = tasks.iter().any(|t| t.state.is_failed());
        Self {
            tasks_count: detail.tasks.len(),
            status: detail.status.with_task_failures(any_failed),
            name: detail.name,
            connect: detail.connect,
            connect_display_name: connect_display_name.into(),
            connector_type: detail.connector_type,
            config,
            tasks,
            topics,
        }
    }

    pub fn failed_tasks_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.state.is_failed()).count()
    }
}

/// Request body for creating a connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewConnector {
    pub name: String,
    pub config: ConnectorConfig,
}
