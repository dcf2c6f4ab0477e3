use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::Error;

/// Coarse lifecycle command applied to a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectorAction {
    Restart,
    RestartAllTasks,
    RestartFailedTasks,
    Pause,
    Stop,
    Resume,
}

impl ConnectorAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Restart => "RESTART",
            Self::RestartAllTasks => "RESTART_ALL_TASKS",
            Self::RestartFailedTasks => "RESTART_FAILED_TASKS",
            Self::Pause => "PAUSE",
            Self::Stop => "STOP",
            Self::Resume => "RESUME",
        }
    }
}

impl Display for ConnectorAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectorAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "RESTART" => Ok(Self::Restart),
            "RESTART_ALL_TASKS" => Ok(Self::RestartAllTasks),
            "RESTART_FAILED_TASKS" => Ok(Self::RestartFailedTasks),
            "PAUSE" => Ok(Self::Pause),
            "STOP" => Ok(Self::Stop),
            "RESUME" => Ok(Self::Resume),
            other => Err(Error::Validation(format!("Unknown connector action: {other}"))),
        }
    }
}

/// A lifecycle action addressed to one connector (optionally one task).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub connect: String,
    pub connector: String,
    pub action: ConnectorAction,
    pub task_id: Option<u32>,
}

impl ActionRequest {
    pub fn new(
        connect: impl Into<String>,
        connector: impl Into<String>,
        action: ConnectorAction,
    ) -> Self {
        Self {
            connect: connect.into(),
            connector: connector.into(),
            action,
            task_id: None,
        }
    }

    #[must_use]
    pub const fn with_task(mut self, task_id: u32) -> Self {
        self.task_id = Some(task_id);
        self
    }
}
