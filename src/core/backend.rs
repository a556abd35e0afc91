//! Execution backend abstractions.
//!
//! The controller never talks to a workflow engine directly; it is handed an
//! [`ExecutionBackend`] at construction. Listing is paged because real engines
//! cap single-page results, and a single-page count silently undercounts.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ActiveCount, AdmissionError, BackendError};

/// Identifier of an execution started on the backend.
pub type ExecutionId = String;

/// Lifecycle state of an execution as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Accepted by the engine but not yet running.
    Pending,
    /// Waiting on a timer or trigger.
    Scheduled,
    /// Currently executing.
    Running,
    /// Finished successfully.
    Succeeded,
    /// Finished with an error, timed out, or aborted.
    Failed,
}

impl ExecutionStatus {
    /// Whether the status describes work that has not finished.
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Pending | Self::Scheduled | Self::Running)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Scheduled => "scheduled",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

impl FromStr for ExecutionStatus {
    type Err = AdmissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "scheduled" => Ok(Self::Scheduled),
            "running" => Ok(Self::Running),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            other => Err(AdmissionError::Config(format!("unknown execution status `{other}`"))),
        }
    }
}

/// One request for a page of executions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Statuses to include.
    pub statuses: Vec<ExecutionStatus>,
    /// Maximum number of entries the backend should return.
    pub page_size: u32,
    /// Continuation token from the previous page.
    pub next_token: Option<String>,
}

/// One page of a backend listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPage {
    /// Executions on this page matching the query.
    pub count: ActiveCount,
    /// Token for the next page; `None` when the listing is exhausted.
    pub next_token: Option<String>,
    /// The backend capped the result without offering a continuation token.
    pub truncated: bool,
}

impl ExecutionPage {
    /// Final page of a listing.
    pub const fn last(count: ActiveCount) -> Self {
        Self {
            count,
            next_token: None,
            truncated: false,
        }
    }

    /// A page with more to follow.
    pub fn more(count: ActiveCount, next_token: impl Into<String>) -> Self {
        Self {
            count,
            next_token: Some(next_token.into()),
            truncated: false,
        }
    }

    /// A capped page with no way to continue.
    pub const fn truncated(count: ActiveCount) -> Self {
        Self {
            count,
            next_token: None,
            truncated: true,
        }
    }
}

/// Source of active-execution counts.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Return one page of executions matching `query`.
    async fn list_executions(&self, query: &ListQuery) -> Result<ExecutionPage, BackendError>;
}

/// Backend capable of starting executions.
#[async_trait]
pub trait ExecutionLauncher: Send + Sync {
    /// Start a named execution with a JSON input, returning its identifier.
    async fn start_execution(
        &self,
        name: &str,
        input: serde_json::Value,
    ) -> Result<ExecutionId, BackendError>;
}

#[async_trait]
impl<T: ExecutionBackend + ?Sized> ExecutionBackend for Arc<T> {
    async fn list_executions(&self, query: &ListQuery) -> Result<ExecutionPage, BackendError> {
        (**self).list_executions(query).await
    }
}

#[async_trait]
impl<T: ExecutionLauncher + ?Sized> ExecutionLauncher for Arc<T> {
    async fn start_execution(
        &self,
        name: &str,
        input: serde_json::Value,
    ) -> Result<ExecutionId, BackendError> {
        (**self).start_execution(name, input).await
    }
}
