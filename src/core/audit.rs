//! Audit trail of admission decisions.
//!
//! Sinks receive one event per decision so operators can tell "denied because
//! full" apart from "denied because the backend was unreachable" after the fact.

use std::collections::VecDeque;

use parking_lot::Mutex;

use super::{ActiveCount, AdmissionDecision, Ceiling, DecisionOutcome};
use crate::util::clock::now_ms;

/// Action recorded for a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    /// Work was admitted.
    Admit,
    /// Work was denied at capacity.
    Deny,
    /// Work was denied because the count could not be trusted.
    FailClosed,
}

impl AuditAction {
    /// Stable label used in logs and persisted trails.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admit => "admit",
            Self::Deny => "deny",
            Self::FailClosed => "fail_closed",
        }
    }
}

/// Audit event structure.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Name of the controller that made the decision.
    pub controller: String,
    /// Action taken.
    pub action: AuditAction,
    /// Ceiling in force.
    pub ceiling: Ceiling,
    /// Observed active count, if one was obtained.
    pub observed_active: Option<ActiveCount>,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Additional context (error text on fail-closed).
    pub detail: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: Mutex<VecDeque<AuditEvent>>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events)),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Build an audit event for a decision made by `controller`.
pub fn build_audit_event(controller: impl Into<String>, decision: &AdmissionDecision) -> AuditEvent {
    let (action, detail) = match decision.outcome() {
        DecisionOutcome::Admitted => (AuditAction::Admit, None),
        DecisionOutcome::AtCapacity if decision.is_lower_bound() => {
            (AuditAction::Deny, Some("partial count, paging stopped at ceiling".to_string()))
        }
        DecisionOutcome::AtCapacity => (AuditAction::Deny, None),
        DecisionOutcome::FailedClosed(err) => (AuditAction::FailClosed, Some(err.to_string())),
    };
    AuditEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        controller: controller.into(),
        action,
        ceiling: decision.ceiling(),
        observed_active: decision.observed_active(),
        created_at_ms: now_ms(),
        detail,
    }
}
