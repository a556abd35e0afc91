//! Core admission abstractions and capacity accounting.

pub mod audit;
pub mod backend;
pub mod controller;
pub mod decision;
pub mod dispatcher;
pub mod error;
pub mod refresh;

pub use audit::{AuditAction, AuditEvent, AuditSink, InMemoryAuditSink, build_audit_event};
pub use backend::{
    ExecutionBackend, ExecutionId, ExecutionLauncher, ExecutionPage, ExecutionStatus, ListQuery,
};
pub use controller::{
    AdmissionController, CeilingHandle, ControllerLimits, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE,
    DEFAULT_QUERY_TIMEOUT, validate_ceiling,
};
pub use decision::{ActiveCount, AdmissionDecision, Ceiling, DecisionOutcome};
pub use dispatcher::{DispatchError, DispatchOutcome, GatedDispatcher};
pub use error::{AdmissionError, AppResult, BackendError};
pub use refresh::{CeilingRefresher, CeilingSource, EnvCeilingSource, Spawn, refresh_once};
