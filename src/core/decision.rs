//! Admission decisions.

use super::AdmissionError;

/// Maximum number of concurrently admitted units of work.
pub type Ceiling = u32;

/// Snapshot of currently running units of work as reported by the backend.
pub type ActiveCount = u32;

/// Why a decision came out the way it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// Observed active count was strictly below the ceiling.
    Admitted,
    /// Observed active count reached the ceiling.
    AtCapacity,
    /// No trustworthy count could be obtained; denied without knowing the load.
    FailedClosed(AdmissionError),
}

/// Result of a single admission check.
///
/// Decisions are values: they are never mutated after construction and are
/// not persisted. `observed_active` is `None` when the backend could not
/// produce a trustworthy count. When counting stopped early because the
/// ceiling was already reached, the count is a lower bound on the real load
/// and [`AdmissionDecision::is_lower_bound`] says so.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionDecision {
    admitted: bool,
    ceiling: Ceiling,
    observed_active: Option<ActiveCount>,
    lower_bound: bool,
    timestamp_ms: u128,
    outcome: DecisionOutcome,
}

impl AdmissionDecision {
    /// Decide from an observed count. Admits iff `observed_active < ceiling`.
    pub fn from_observation(ceiling: Ceiling, observed_active: ActiveCount, timestamp_ms: u128) -> Self {
        let admitted = observed_active < ceiling;
        Self {
            admitted,
            ceiling,
            observed_active: Some(observed_active),
            lower_bound: false,
            timestamp_ms,
            outcome: if admitted {
                DecisionOutcome::Admitted
            } else {
                DecisionOutcome::AtCapacity
            },
        }
    }

    /// Deny from a partial count that already reached the ceiling.
    ///
    /// `observed_at_least` is what was counted before paging stopped; the
    /// backend may hold more. A partial count below the ceiling proves
    /// nothing, so it fails closed instead of admitting.
    pub fn from_lower_bound(ceiling: Ceiling, observed_at_least: ActiveCount, timestamp_ms: u128) -> Self {
        if observed_at_least < ceiling {
            return Self::fail_closed(
                ceiling,
                AdmissionError::BackendInconsistent(format!(
                    "partial count {observed_at_least} is below ceiling {ceiling}"
                )),
                timestamp_ms,
            );
        }
        Self {
            admitted: false,
            ceiling,
            observed_active: Some(observed_at_least),
            lower_bound: true,
            timestamp_ms,
            outcome: DecisionOutcome::AtCapacity,
        }
    }

    /// Deny because the count could not be trusted.
    pub fn fail_closed(ceiling: Ceiling, error: AdmissionError, timestamp_ms: u128) -> Self {
        Self {
            admitted: false,
            ceiling,
            observed_active: None,
            lower_bound: false,
            timestamp_ms,
            outcome: DecisionOutcome::FailedClosed(error),
        }
    }

    /// Whether one more unit of work may be launched.
    pub const fn admitted(&self) -> bool {
        self.admitted
    }

    /// Ceiling in force when the decision was made.
    pub const fn ceiling(&self) -> Ceiling {
        self.ceiling
    }

    /// Active count the decision was based on, if one was obtained.
    pub const fn observed_active(&self) -> Option<ActiveCount> {
        self.observed_active
    }

    /// True when `observed_active` is a partial count and the real load may be higher.
    pub const fn is_lower_bound(&self) -> bool {
        self.lower_bound
    }

    /// Milliseconds since the Unix epoch at observation time.
    pub const fn timestamp_ms(&self) -> u128 {
        self.timestamp_ms
    }

    /// Outcome classification.
    pub const fn outcome(&self) -> &DecisionOutcome {
        &self.outcome
    }

    /// Error that forced a fail-closed denial, if any.
    pub fn error(&self) -> Option<&AdmissionError> {
        match &self.outcome {
            DecisionOutcome::FailedClosed(err) => Some(err),
            _ => None,
        }
    }

    /// True when the denial reflects real load rather than a backend problem.
    pub fn is_valid(&self) -> bool {
        self.error().is_none()
    }

    /// Compare everything except the timestamp.
    pub fn same_verdict(&self, other: &Self) -> bool {
        self.admitted == other.admitted
            && self.ceiling == other.ceiling
            && self.observed_active == other.observed_active
            && self.lower_bound == other.lower_bound
            && self.outcome == other.outcome
    }
}
