use thiserror::Error;

/// Failure taxonomy for every service-backed operation.
///
/// `Validation` and `Precondition` are produced locally, before any request is
/// built. `Remote` carries the server's `detail` message for a non-2xx reply.
/// `Network` covers requests that never completed, plus malformed response
/// bodies (no caller distinguishes the two).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Precondition(String),

    #[error("server error ({status}): {detail}")]
    Remote { status: u16, detail: String },

    #[error("network error: {0}")]
    Network(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        ApiError::Precondition(message.into())
    }

    pub fn remote(status: u16, detail: impl Into<String>) -> Self {
        ApiError::Remote {
            status,
            detail: detail.into(),
        }
    }

    pub fn network(err: impl ToString) -> Self {
        ApiError::Network(err.to_string())
    }

    /// True when the failure was caught locally and no request was issued.
    pub fn is_local(&self) -> bool {
        matches!(self, ApiError::Validation(_) | ApiError::Precondition(_))
    }
}
