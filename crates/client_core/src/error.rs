use shared::error::ErrorEnvelope;
use thiserror::Error;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response shape: {0}")]
    InvalidResponseShape(String),
    #[error("{message}")]
    Application {
        status: Option<u16>,
        message: String,
    },
    #[error("not signed in")]
    NotAuthenticated,
}

impl ClientError {
    pub fn application(message: impl Into<String>) -> Self {
        Self::Application {
            status: None,
            message: message.into(),
        }
    }

    pub fn invalid_shape(detail: impl Into<String>) -> Self {
        Self::InvalidResponseShape(detail.into())
    }

    /// Builds the error for a non-2xx response, preferring the text the server
    /// put in its error body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let server_message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| ErrorEnvelope::from_json(&value))
            .and_then(|envelope| envelope.server_message().map(str::to_string));

        Self::Application {
            status: Some(status),
            message: server_message
                .unwrap_or_else(|| format!("request failed with status {status}")),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::InvalidResponseShape(_) => "invalid_response_shape",
            Self::Application { .. } => "application",
            Self::NotAuthenticated => "not_authenticated",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Application { status, .. } => *status,
            _ => None,
        }
    }

    /// Text to show the user: the server's own message for application
    /// errors, `fallback` for everything else.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            Self::Application { message, .. } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponseShape(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Application {
                status: Some(status.as_u16()),
                message: format!("request failed with status {}", status.as_u16()),
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
