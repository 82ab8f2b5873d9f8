use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by the score client.
///
/// A 4xx or 5xx reply is not one of these: it comes back as an ordinary
/// response whose status the caller inspects.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The response body was not valid JSON
    #[error("Malformed response body (status {status}): {source}")]
    MalformedBody {
        /// Status of the response that carried the body
        status: StatusCode,
        /// Underlying parse failure
        source: serde_json::Error,
    },

    /// The body was valid JSON but not the shape expected for its status
    #[error("Unexpected response body (status {status}): {source}")]
    UnexpectedBody {
        /// Status of the response that carried the body
        status: StatusCode,
        /// Underlying decode failure
        source: serde_json::Error,
    },

    /// The user id cannot be addressed as a single path segment
    #[error("Invalid user id: {0:?}")]
    InvalidUserId(String),

    /// The request payload could not be encoded as JSON
    #[error("Failed to serialize request: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The request never produced a complete response
    #[error("Network error: {0}")]
    Transport(#[from] reqwest_middleware::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.into())
    }
}

impl ClientError {
    /// Status of the response involved, when one was received
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::MalformedBody { status, .. } | Self::UnexpectedBody { status, .. } => {
                Some(*status)
            }
            Self::InvalidUserId(_) | Self::Serialize(_) | Self::Transport(_) => None,
        }
    }
}
