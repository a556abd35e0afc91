//! Caller-facing request/response models.
//!
//! These shapes are what an HTTP handler or a workflow task would return to
//! its caller; no transport is bundled.

use serde::{Deserialize, Serialize};

use crate::core::{
    ActiveCount, AdmissionController, AdmissionDecision, Ceiling, DecisionOutcome, ExecutionBackend,
};

/// Serializable view of an [`AdmissionDecision`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    /// Whether one more unit of work may start.
    pub admitted: bool,
    /// Ceiling in force.
    pub ceiling: Ceiling,
    /// Active count observed, absent when no trustworthy count was obtained.
    pub observed_active: Option<ActiveCount>,
    /// True when counting stopped at the ceiling, so `observed_active` is a
    /// lower bound on the real load.
    #[serde(default)]
    pub observed_active_is_lower_bound: bool,
    /// Milliseconds since the Unix epoch at observation time.
    pub timestamp_ms: u128,
    /// Why the request was denied because of the backend, if it was.
    pub error: Option<String>,
}

impl From<&AdmissionDecision> for AdmissionResponse {
    fn from(decision: &AdmissionDecision) -> Self {
        Self {
            admitted: decision.admitted(),
            ceiling: decision.ceiling(),
            observed_active: decision.observed_active(),
            observed_active_is_lower_bound: decision.is_lower_bound(),
            timestamp_ms: decision.timestamp_ms(),
            error: match decision.outcome() {
                DecisionOutcome::FailedClosed(err) => Some(err.to_string()),
                DecisionOutcome::Admitted | DecisionOutcome::AtCapacity => None,
            },
        }
    }
}

/// Controller snapshot for listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerSnapshot {
    /// Controller name.
    pub name: String,
    /// Ceiling currently in force.
    pub ceiling: Ceiling,
    /// Page size requested from the backend.
    pub page_size: u32,
    /// Pages followed per query.
    pub max_pages: u32,
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
}

/// Run one admission check and shape it for the caller.
pub async fn check_capacity<B: ExecutionBackend>(controller: &AdmissionController<B>) -> AdmissionResponse {
    let decision = controller.try_admit().await;
    AdmissionResponse::from(&decision)
}

/// Describe a controller.
pub fn snapshot<B: ExecutionBackend>(controller: &AdmissionController<B>) -> ControllerSnapshot {
    ControllerSnapshot {
        name: controller.name().to_string(),
        ceiling: controller.ceiling(),
        page_size: controller.limits().page_size,
        max_pages: controller.limits().max_pages,
    }
}

/// Return a health payload.
pub const fn health() -> Health {
    Health { ok: true }
}
