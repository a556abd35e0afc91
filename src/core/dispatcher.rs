//! Admit-then-start dispatch.

use thiserror::Error;

use super::{
    AdmissionController, AdmissionDecision, BackendError, ExecutionBackend, ExecutionId,
    ExecutionLauncher,
};

/// Result of a dispatch attempt that reached a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Admitted and started.
    Started {
        /// Identifier returned by the launcher.
        execution_id: ExecutionId,
        /// Decision that let it through.
        decision: AdmissionDecision,
    },
    /// Denied; nothing was started.
    Rejected(AdmissionDecision),
}

impl DispatchOutcome {
    /// Decision behind the outcome.
    pub const fn decision(&self) -> &AdmissionDecision {
        match self {
            Self::Started { decision, .. } | Self::Rejected(decision) => decision,
        }
    }
}

/// Admission succeeded but the execution could not be started.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Launcher failure after admission.
    #[error("launch failed after admission: {source}")]
    Launch {
        /// Launcher error.
        source: BackendError,
        /// Decision that admitted the work.
        decision: AdmissionDecision,
    },
}

/// Starts executions only when the controller admits them.
///
/// Inherits the controller's best-effort semantics: concurrent dispatchers
/// observing the same count can overshoot the ceiling.
pub struct GatedDispatcher<B, L> {
    controller: AdmissionController<B>,
    launcher: L,
}

impl<B, L> GatedDispatcher<B, L>
where
    B: ExecutionBackend,
    L: ExecutionLauncher,
{
    /// Pair a controller with a launcher.
    pub const fn new(controller: AdmissionController<B>, launcher: L) -> Self {
        Self { controller, launcher }
    }

    /// Underlying controller.
    pub const fn controller(&self) -> &AdmissionController<B> {
        &self.controller
    }

    /// Check capacity, then start `name` with `input` if admitted.
    pub async fn dispatch(
        &self,
        name: &str,
        input: serde_json::Value,
    ) -> Result<DispatchOutcome, DispatchError> {
        let decision = self.controller.try_admit().await;
        if !decision.admitted() {
            tracing::debug!("dispatch of {} rejected", name);
            return Ok(DispatchOutcome::Rejected(decision));
        }

        match self.launcher.start_execution(name, input).await {
            Ok(execution_id) => {
                tracing::info!("dispatched {} as {}", name, execution_id);
                Ok(DispatchOutcome::Started {
                    execution_id,
                    decision,
                })
            }
            Err(source) => {
                tracing::error!("failed to start {} after admission: {}", name, source);
                Err(DispatchError::Launch { source, decision })
            }
        }
    }
}
