use thiserror::Error;

/// One failed task restart inside a fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRestartFailure {
    pub task: u32,
    pub reason: String,
}

impl std::fmt::Display for TaskRestartFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task {}: {}", self.task, self.reason)
    }
}

/// Errors surfaced to callers of the connect layer.
///
/// `Clone` is required because a single-flight population shares its
/// outcome with every waiter of the same key.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("No reachable endpoint for connect cluster {0}")]
    NoReachableEndpoint(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Action rejected: {0}")]
    ActionRejected(String),

    #[error(
        "Failed to restart {} task(s) of connector {connector}: {}",
        failures.len(),
        join_failures(failures)
    )]
    TaskRestartFailed {
        connector: String,
        failures: Vec<TaskRestartFailure>,
    },

    #[error("Remote error (status {status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn join_failures(failures: &[TaskRestartFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Whether this error came from a remote 404 or an unknown cluster.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the remote rejected the request as malformed (HTTP 400).
    #[must_use]
    pub const fn is_bad_request(&self) -> bool {
        matches!(self, Self::Remote { status: 400, .. })
    }

    /// HTTP status an upward-facing layer should answer with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::ActionRejected(_) => 409,
            Self::Remote { status, .. } => *status,
            Self::NoReachableEndpoint(_) | Self::Transport(_) => 503,
            Self::TaskRestartFailed { .. } => 502,
            Self::Configuration(_) | Self::Internal(_) => 500,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_restart_failed_message() {
        let err = Error::TaskRestartFailed {
            connector: "sink-1".to_string(),
            failures: vec![
                TaskRestartFailure { task: 1, reason: "boom".to_string() },
                TaskRestartFailure { task: 2, reason: "gone".to_string() },
            ],
        };

        let msg = err.to_string();
        assert!(msg.contains("2 task(s)"));
        assert!(msg.contains("sink-1"));
        assert!(msg.contains("task 1: boom; task 2: gone"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::NotFound("x".into()).status_code(), 404);
        assert_eq!(Error::Validation("x".into()).status_code(), 400);
        assert_eq!(Error::NoReachableEndpoint("c".into()).status_code(), 503);
        assert_eq!(
            Error::Remote { status: 422, message: "bad".into() }.status_code(),
            422
        );
    }

    #[test]
    fn test_bad_request_classification() {
        assert!(Error::Remote { status: 400, message: String::new() }.is_bad_request());
        assert!(!Error::Remote { status: 409, message: String::new() }.is_bad_request());
        assert!(Error::NotFound("c".into()).is_not_found());
    }
}
