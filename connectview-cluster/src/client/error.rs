//! Connect client error types
//!
//! Classifies every failed call into endpoint failures, which make the
//! failover selector try the next address, and application failures, which
//! are returned to the caller as-is.

use thiserror::Error;

/// Error type for a single call against one connect endpoint.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("HTTP error {status}: {message}")]
    Http {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Response too large ({size} bytes, max {max})")]
    ResponseTooLarge { size: u64, max: usize },
}

impl ClientError {
    /// Shorthand for a remote answer with the given status.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status: reqwest::StatusCode::from_u16(status)
                .unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            message: message.into(),
        }
    }

    /// Whether the endpoint itself is considered unhealthy after this error.
    ///
    /// Transport failures and 5xx answers count; 4xx answers and malformed
    /// bodies are the caller's problem and say nothing about the endpoint.
    #[must_use]
    pub fn is_endpoint_failure(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Http { status, .. } => status.is_server_error(),
            Self::Parse(_) | Self::InvalidConfig(_) | Self::ResponseTooLarge { .. } => false,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(status.as_u16()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Error body returned by the connect REST API
#[derive(Debug, serde::Deserialize)]
struct RemoteErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Read a response body with size limit and deserialize as JSON.
///
/// Checks the `Content-Length` hint first, then enforces the limit on the
/// actual body bytes before deserializing.
pub async fn json_with_limit<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    max: usize,
) -> Result<T, ClientError> {
    let bytes = bytes_with_limit(response, max).await?;
    serde_json::from_slice(&bytes).map_err(Into::into)
}

async fn bytes_with_limit(
    response: reqwest::Response,
    max: usize,
) -> Result<Vec<u8>, ClientError> {
    if let Some(cl) = response.content_length() {
        if cl > max as u64 {
            return Err(ClientError::ResponseTooLarge { size: cl, max });
        }
    }
    let bytes = response.bytes().await?;
    if bytes.len() > max {
        return Err(ClientError::ResponseTooLarge {
            size: bytes.len() as u64,
            max,
        });
    }
    Ok(bytes.to_vec())
}

/// Check HTTP response status before processing body.
///
/// Non-success answers become [`ClientError::Http`] carrying the remote
/// `message` field when the body has one.
pub async fn check_response(
    response: reqwest::Response,
    max: usize,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return Ok(response);
    }

    let url = response.url().to_string();
    let message = match bytes_with_limit(response, max).await {
        Ok(body) => serde_json::from_slice::<RemoteErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| String::from_utf8_lossy(&body).trim().to_string()),
        Err(_) => String::new(),
    };
    let message = if message.is_empty() {
        format!("request to {url} failed")
    } else {
        message
    };

    Err(ClientError::Http { status, message })
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_builder() {
            Self::InvalidConfig(err.to_string())
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<ClientError> for connectview_core::Error {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http { status, message } if status == reqwest::StatusCode::NOT_FOUND => {
                Self::NotFound(message)
            }
            ClientError::Http { status, message } => Self::Remote {
                status: status.as_u16(),
                message,
            },
            ClientError::Network(msg) | ClientError::Timeout(msg) => Self::Transport(msg),
            ClientError::InvalidConfig(msg) => Self::Configuration(msg),
            err @ (ClientError::Parse(_) | ClientError::ResponseTooLarge { .. }) => {
                Self::Internal(err.to_string())
            }
        }
    }
}
