//! Error types for the submission client.

use thiserror::Error;

/// Errors raised while talking to the authority.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response: connection failure, timeout,
    /// or an unreachable authority.
    #[error("transport error calling {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// The authority refused the request (HTTP 4xx).
    #[error("authority rejected {endpoint} (HTTP {status}, error code {code}){}", fmt_context(.context))]
    Server {
        endpoint: String,
        status: u16,
        code: i64,
        context: Vec<String>,
    },

    /// The authority answered with a body this client cannot read.
    #[error("invalid response from {endpoint}: {message}")]
    InvalidResponse { endpoint: String, message: String },

    /// A failure reply the authority did not decide on: a 5xx, or a gateway
    /// answering in its place. The request may still have been processed.
    #[error("upstream failure calling {endpoint} (HTTP {status}): {message}")]
    Upstream {
        endpoint: String,
        status: u16,
        message: String,
    },
}

impl ClientError {
    pub(crate) fn transport(endpoint: &str, message: impl ToString) -> Self {
        Self::Transport {
            endpoint: endpoint.to_string(),
            message: message.to_string(),
        }
    }

    /// Whether repeating the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Upstream { .. })
    }
}

fn fmt_context(context: &[String]) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!(": {}", context.join(", "))
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
