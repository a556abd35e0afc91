//! Capacity-gated admission controller.
//!
//! [`AdmissionController::try_admit`] asks the backend how much work is live,
//! compares that against the ceiling, and returns an [`AdmissionDecision`].
//! It never waits for capacity and never retries; on any doubt it denies.
//!
//! # Consistency
//!
//! Admission is best-effort. The count is stale the moment it is read, and the
//! controller is not transactionally coupled to the backend, so two callers
//! that observe the same count may both be admitted. Exact enforcement needs a
//! backend with atomic reserve-and-increment semantics.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::{
    ActiveCount, AdmissionDecision, AdmissionError, AuditSink, Ceiling, ExecutionBackend,
    ExecutionStatus, ListQuery, build_audit_event,
};
use crate::util::clock::now_ms;

/// Default bound on one admission query, all pages included.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);
/// Default page size requested from the backend.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;
/// Default maximum number of pages followed per query.
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// Limits governing how the controller counts active work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerLimits {
    /// Bound on the whole backend query.
    pub query_timeout: Duration,
    /// Entries requested per page.
    pub page_size: u32,
    /// Pages followed before the listing is declared inconsistent.
    pub max_pages: u32,
    /// Statuses that count toward the ceiling.
    pub count_statuses: Vec<ExecutionStatus>,
}

impl Default for ControllerLimits {
    fn default() -> Self {
        Self {
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            count_statuses: vec![ExecutionStatus::Running],
        }
    }
}

impl ControllerLimits {
    /// Validate limit values.
    pub fn validate(&self) -> Result<(), AdmissionError> {
        if self.query_timeout.is_zero() {
            return Err(AdmissionError::Config("query_timeout must be greater than 0".into()));
        }
        if self.page_size == 0 {
            return Err(AdmissionError::Config("page_size must be greater than 0".into()));
        }
        if self.max_pages == 0 {
            return Err(AdmissionError::Config("max_pages must be greater than 0".into()));
        }
        if self.count_statuses.is_empty() {
            return Err(AdmissionError::Config("count_statuses must not be empty".into()));
        }
        if let Some(status) = self.count_statuses.iter().find(|s| !s.is_live()) {
            return Err(AdmissionError::Config(format!(
                "count_statuses may only contain live statuses, got `{status}`"
            )));
        }
        Ok(())
    }
}

/// Shared, refreshable ceiling.
///
/// Each decision reads it exactly once, so a refresh never changes the
/// ceiling halfway through a decision.
#[derive(Debug, Clone)]
pub struct CeilingHandle(Arc<AtomicU32>);

impl CeilingHandle {
    /// Create a handle holding a validated ceiling.
    pub fn new(ceiling: Ceiling) -> Result<Self, AdmissionError> {
        validate_ceiling(ceiling)?;
        Ok(Self(Arc::new(AtomicU32::new(ceiling))))
    }

    /// Current ceiling.
    pub fn get(&self) -> Ceiling {
        self.0.load(Ordering::Acquire)
    }

    /// Replace the ceiling. Zero is rejected and the old value kept.
    pub fn set(&self, ceiling: Ceiling) -> Result<Ceiling, AdmissionError> {
        validate_ceiling(ceiling)?;
        Ok(self.0.swap(ceiling, Ordering::AcqRel))
    }
}

/// Reject non-positive ceilings.
pub fn validate_ceiling(ceiling: Ceiling) -> Result<(), AdmissionError> {
    if ceiling == 0 {
        return Err(AdmissionError::Config("ceiling must be a positive integer".into()));
    }
    Ok(())
}

/// Live count gathered by one query.
struct Tally {
    active: ActiveCount,
    /// False when paging stopped before the listing ran out.
    exhausted: bool,
}

/// Admission controller bound to one ceiling and one backend.
#[derive(Clone)]
pub struct AdmissionController<B> {
    name: String,
    ceiling: CeilingHandle,
    limits: ControllerLimits,
    backend: B,
    audit: Option<Arc<dyn AuditSink>>,
}

impl<B> AdmissionController<B>
where
    B: ExecutionBackend,
{
    /// Bind a controller to `ceiling` and `backend` with default limits.
    pub fn configure(ceiling: Ceiling, backend: B) -> Result<Self, AdmissionError> {
        Self::with_limits(ceiling, backend, ControllerLimits::default())
    }

    /// Bind a controller with explicit counting limits.
    pub fn with_limits(
        ceiling: Ceiling,
        backend: B,
        limits: ControllerLimits,
    ) -> Result<Self, AdmissionError> {
        limits.validate()?;
        Ok(Self {
            name: "default".into(),
            ceiling: CeilingHandle::new(ceiling)?,
            limits,
            backend,
            audit: None,
        })
    }

    /// Name the controller for logs and audit events.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Controller name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ceiling currently in force.
    pub fn ceiling(&self) -> Ceiling {
        self.ceiling.get()
    }

    /// Handle for refreshing the ceiling from outside.
    pub fn ceiling_handle(&self) -> CeilingHandle {
        self.ceiling.clone()
    }

    /// Counting limits.
    pub const fn limits(&self) -> &ControllerLimits {
        &self.limits
    }

    /// Single-shot admission check.
    ///
    /// Always returns a decision. Backend errors, timeouts, and untrustworthy
    /// listings produce `admitted == false` with the cause in
    /// [`AdmissionDecision::error`].
    pub async fn try_admit(&self) -> AdmissionDecision {
        let ceiling = self.ceiling.get();
        let counted = tokio::time::timeout(self.limits.query_timeout, self.count_active(ceiling)).await;
        let now = now_ms();

        let decision = match counted {
            Ok(Ok(Tally { active, exhausted: true })) => {
                AdmissionDecision::from_observation(ceiling, active, now)
            }
            Ok(Ok(Tally { active, exhausted: false })) => {
                AdmissionDecision::from_lower_bound(ceiling, active, now)
            }
            Ok(Err(err)) => AdmissionDecision::fail_closed(ceiling, err, now),
            Err(_) => AdmissionDecision::fail_closed(
                ceiling,
                AdmissionError::BackendTimeout(self.limits.query_timeout),
                now,
            ),
        };

        self.observe(&decision);
        decision
    }

    /// Count live executions, following pagination until exhausted.
    ///
    /// Stops early once the running total reaches `ceiling`: later pages can
    /// only raise it, so the deny is already certain. The tally is then marked
    /// as not exhausted and its count is a lower bound.
    async fn count_active(&self, ceiling: Ceiling) -> Result<Tally, AdmissionError> {
        let mut total: ActiveCount = 0;
        let mut next_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        for page_no in 1..=self.limits.max_pages {
            let query = ListQuery {
                statuses: self.limits.count_statuses.clone(),
                page_size: self.limits.page_size,
                next_token: next_token.take(),
            };
            let page = self.backend.list_executions(&query).await?;
            total = total.saturating_add(page.count);
            tracing::trace!("page {} counted {} (running total {})", page_no, page.count, total);

            if total >= ceiling {
                let exhausted = page.next_token.is_none() && !page.truncated;
                return Ok(Tally { active: total, exhausted });
            }
            if page.truncated {
                return Err(AdmissionError::BackendInconsistent(format!(
                    "page {page_no} was capped at {} entries without a continuation token",
                    page.count
                )));
            }
            match page.next_token {
                None => return Ok(Tally { active: total, exhausted: true }),
                Some(token) => {
                    if !seen_tokens.insert(token.clone()) {
                        return Err(AdmissionError::BackendInconsistent(format!(
                            "continuation token repeated on page {page_no}"
                        )));
                    }
                    next_token = Some(token);
                }
            }
        }

        Err(AdmissionError::BackendInconsistent(format!(
            "listing not exhausted after {} pages",
            self.limits.max_pages
        )))
    }

    fn observe(&self, decision: &AdmissionDecision) {
        match decision.error() {
            Some(err) => tracing::warn!(
                controller = %self.name,
                ceiling = decision.ceiling(),
                "admission failed closed: {}",
                err
            ),
            None => tracing::info!(
                controller = %self.name,
                "admission {}: active {}{}/{}",
                if decision.admitted() { "granted" } else { "denied" },
                if decision.is_lower_bound() { ">=" } else { "" },
                decision.observed_active().unwrap_or_default(),
                decision.ceiling()
            ),
        }

        if let Some(audit) = &self.audit {
            audit.record(build_audit_event(self.name.as_str(), decision));
        }
    }
}
