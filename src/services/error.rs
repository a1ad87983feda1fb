//! Error types for scheduling operations.

use chrono::NaiveDate;

use crate::db::repository::RepositoryError;
use crate::models::maintenance::CheckType;
use crate::services::conflicts::ConflictKind;

/// Result type for scheduling operations.
pub type SchedulingResult<T> = Result<T, SchedulingError>;

/// Error taxonomy of the scheduling service layer.
///
/// Best-effort failures (the optimizer) never surface here; they are logged
/// and swallowed at their source.
#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    /// Malformed input, unknown or foreign route/aircraft, oversized batch.
    /// Rejected before any window is computed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The candidate window overlaps an existing commitment. The operation
    /// is not applied; the descriptor names the blocking flight or check.
    #[error("Scheduling conflict: {0}")]
    Conflict(ConflictKind),

    /// A blocking maintenance pattern has no legal reschedule slot before
    /// its deadline. Blocks the flight entirely, with no workaround; the
    /// pattern is left unchanged.
    #[error("No free slot for {check} before its deadline {deadline}")]
    MaintenanceDeadlineViolation { check: CheckType, deadline: NaiveDate },

    /// Storage failure underneath an otherwise valid operation.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SchedulingError {
    pub fn validation(message: impl Into<String>) -> Self {
        SchedulingError::Validation(message.into())
    }

    /// True for admission failures a client can act on (conflict or
    /// deadline violation), as opposed to bad input or storage trouble.
    pub fn is_scheduling_conflict(&self) -> bool {
        matches!(
            self,
            SchedulingError::Conflict(_) | SchedulingError::MaintenanceDeadlineViolation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_violation_message() {
        let err = SchedulingError::MaintenanceDeadlineViolation {
            check: CheckType::Daily,
            deadline: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("daily check"));
        assert!(msg.contains("2026-03-04"));
        assert!(err.is_scheduling_conflict());
    }

    #[test]
    fn test_validation_is_not_conflict() {
        assert!(!SchedulingError::validation("batch too large").is_scheduling_conflict());
    }
}
