//! In-memory execution backend.
//!
//! Behaves like a workflow engine's listing API: results are capped per page
//! and continued with opaque tokens. It can also emulate an engine that caps
//! a single page without offering a token, inject failures, and add latency.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::{
    ActiveCount, BackendError, ExecutionBackend, ExecutionId, ExecutionLauncher, ExecutionPage,
    ExecutionStatus, ListQuery,
};

/// Page cap applied by default, matching common workflow engines.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 1000;

/// How the backend handles listings larger than one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingMode {
    /// Return continuation tokens until the listing is exhausted.
    Paginated,
    /// Return only the first page and flag it as truncated.
    SinglePage,
}

/// Execution record held by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Execution identifier.
    pub id: ExecutionId,
    /// Name given at start.
    pub name: String,
    /// Current status.
    pub status: ExecutionStatus,
    /// Input given at start.
    pub input: serde_json::Value,
}

struct State {
    executions: Vec<Execution>,
    max_page_size: u32,
    paging: PagingMode,
    list_failure: Option<BackendError>,
    launch_failure: Option<BackendError>,
    latency: Option<Duration>,
    list_calls: u64,
}

/// In-memory backend for development and testing.
pub struct InMemoryBackend {
    state: Mutex<State>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    /// Create an empty, paginated backend.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                executions: Vec::new(),
                max_page_size: DEFAULT_MAX_PAGE_SIZE,
                paging: PagingMode::Paginated,
                list_failure: None,
                launch_failure: None,
                latency: None,
                list_calls: 0,
            }),
        }
    }

    /// Cap every page at `max_page_size` entries regardless of the request.
    #[must_use]
    pub fn with_max_page_size(self, max_page_size: u32) -> Self {
        self.state.lock().max_page_size = max_page_size.max(1);
        self
    }

    /// Select the paging behaviour.
    #[must_use]
    pub fn with_paging(self, paging: PagingMode) -> Self {
        self.state.lock().paging = paging;
        self
    }

    /// Add an execution in `status` and return its identifier.
    pub fn insert(&self, name: impl Into<String>, status: ExecutionStatus) -> ExecutionId {
        let id = uuid::Uuid::new_v4().to_string();
        self.state.lock().executions.push(Execution {
            id: id.clone(),
            name: name.into(),
            status,
            input: serde_json::Value::Null,
        });
        id
    }

    /// Add `n` executions in `status`.
    pub fn fill(&self, n: usize, status: ExecutionStatus) -> Vec<ExecutionId> {
        (0..n).map(|i| self.insert(format!("fill-{i}"), status)).collect()
    }

    /// Move an execution to `status`. Returns `false` if it does not exist.
    pub fn set_status(&self, id: &str, status: ExecutionStatus) -> bool {
        let mut state = self.state.lock();
        match state.executions.iter_mut().find(|e| e.id == id) {
            Some(execution) => {
                execution.status = status;
                true
            }
            None => false,
        }
    }

    /// Mark an execution as succeeded.
    pub fn complete(&self, id: &str) -> bool {
        self.set_status(id, ExecutionStatus::Succeeded)
    }

    /// Make every listing fail with `failure`, or clear it with `None`.
    pub fn fail_listing(&self, failure: Option<BackendError>) {
        self.state.lock().list_failure = failure;
    }

    /// Make every launch fail with `failure`, or clear it with `None`.
    pub fn fail_launches(&self, failure: Option<BackendError>) {
        self.state.lock().launch_failure = failure;
    }

    /// Delay every listing call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.state.lock().latency = latency;
    }

    /// Number of listing calls served so far.
    pub fn list_calls(&self) -> u64 {
        self.state.lock().list_calls
    }

    /// Number of executions currently in `status`.
    pub fn count(&self, status: ExecutionStatus) -> usize {
        self.state
            .lock()
            .executions
            .iter()
            .filter(|e| e.status == status)
            .count()
    }

    /// Snapshot of one execution.
    pub fn get(&self, id: &str) -> Option<Execution> {
        self.state.lock().executions.iter().find(|e| e.id == id).cloned()
    }

    fn page(&self, query: &ListQuery) -> Result<ExecutionPage, BackendError> {
        let mut state = self.state.lock();
        state.list_calls += 1;
        if let Some(failure) = &state.list_failure {
            return Err(failure.clone());
        }

        let offset = match &query.next_token {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| BackendError::Rejected(format!("invalid pagination token `{token}`")))?,
        };
        let page_size = query.page_size.min(state.max_page_size).max(1) as usize;
        let matching = state
            .executions
            .iter()
            .filter(|e| query.statuses.contains(&e.status))
            .count();

        let remaining = matching.saturating_sub(offset);
        let on_page = remaining.min(page_size);
        let count = ActiveCount::try_from(on_page)
            .map_err(|_| BackendError::Malformed("page count overflow".into()))?;
        let more = remaining > on_page;

        Ok(match (more, state.paging) {
            (false, _) => ExecutionPage::last(count),
            (true, PagingMode::Paginated) => ExecutionPage::more(count, (offset + on_page).to_string()),
            (true, PagingMode::SinglePage) => ExecutionPage::truncated(count),
        })
    }
}

#[async_trait]
impl ExecutionBackend for InMemoryBackend {
    async fn list_executions(&self, query: &ListQuery) -> Result<ExecutionPage, BackendError> {
        let latency = self.state.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.page(query)
    }
}

#[async_trait]
impl ExecutionLauncher for InMemoryBackend {
    async fn start_execution(
        &self,
        name: &str,
        input: serde_json::Value,
    ) -> Result<ExecutionId, BackendError> {
        let mut state = self.state.lock();
        if let Some(failure) = &state.launch_failure {
            return Err(failure.clone());
        }
        let id = uuid::Uuid::new_v4().to_string();
        state.executions.push(Execution {
            id: id.clone(),
            name: name.to_string(),
            status: ExecutionStatus::Running,
            input,
        });
        Ok(id)
    }
}
