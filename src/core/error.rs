//! Error types for admission control.

use std::time::Duration;

use thiserror::Error;

/// Errors produced by the admission controller and its collaborators.
///
/// Only [`AdmissionError::Config`] is ever returned as an `Err`; every other
/// variant is carried inside a fail-closed
/// [`AdmissionDecision`](crate::core::AdmissionDecision).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// Invalid configuration (for example a zero or non-numeric ceiling).
    #[error("config error: {0}")]
    Config(String),
    /// The backend query failed.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    /// The backend query did not finish within the configured bound.
    #[error("backend timed out after {0:?}")]
    BackendTimeout(Duration),
    /// The backend answered, but the count cannot be trusted.
    #[error("backend inconsistent: {0}")]
    BackendInconsistent(String),
}

impl AdmissionError {
    /// Whether the error came from the backend rather than configuration.
    pub const fn is_backend(&self) -> bool {
        !matches!(self, Self::Config(_))
    }
}

/// Failure reported by an execution backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Transport or service failure.
    #[error("request failed: {0}")]
    Request(String),
    /// The backend rejected the request (throttling, permissions, bad token).
    #[error("rejected: {0}")]
    Rejected(String),
    /// The backend returned a malformed response.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<BackendError> for AdmissionError {
    fn from(err: BackendError) -> Self {
        Self::BackendUnavailable(err.to_string())
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
