//! Errors surfaced to applications calling a generated client.

use thiserror::Error;

/// Error produced by an [`HttpPipeline`](crate::HttpPipeline) implementation.
pub type PipelineError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by generated service methods
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Error returned by generated service methods
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The response status code is not one of the declared expected codes
    #[error("Unexpected response code: {status} (expected one of {expected:?})")]
    UnexpectedStatus { status: u16, expected: Vec<u16> },

    /// The transport pipeline failed; the underlying error is passed through unchanged
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A request body could not be produced from a parameter value
    #[error("Request body error: {0}")]
    Body(String),

    /// A response body could not be turned into the declared return type
    #[error("Response decode error: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Create an unexpected status error for the given actual and expected codes
    pub fn unexpected_status(status: u16, expected: &[u16]) -> Self {
        Self::UnexpectedStatus {
            status,
            expected: expected.to_vec(),
        }
    }

    /// Create a new body error
    pub fn body<S: Into<String>>(msg: S) -> Self {
        Self::Body(msg.into())
    }

    /// Create a new decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Status code carried by the error, if it came from status validation
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
