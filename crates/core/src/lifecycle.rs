//! Lifecycle phase and failure classification.
//!
//! [`LifecyclePhase`] is the controller-side view of a job session,
//! distinct from the wire [`JobStatus`](crate::job::JobStatus):
//! `TimedOut` exists only client-side, and `Idle`/`Submitting` precede
//! any server state.

use serde::{Deserialize, Serialize};

/// Phase of one job session as seen by the presentation layer.
///
/// Transitions: `Idle -> Submitting -> Processing -> (Done | Failed |
/// TimedOut)`.  `Idle` is re-entered only by a new submission or by
/// the silent job-not-found reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    /// No active session.
    Idle,
    /// Creation request in flight.
    Submitting,
    /// Job accepted; status/result polling is running.
    Processing,
    /// Terminal: result available (or the job finished without items).
    Done,
    /// Terminal: submission or generation failed.
    Failed,
    /// The overall deadline elapsed before a terminal status.  Not an
    /// error: the job id is retained for a later manual re-check.
    TimedOut,
}

impl LifecyclePhase {
    /// Whether the session is still spending network/timer resources.
    pub fn is_active(self) -> bool {
        matches!(self, LifecyclePhase::Submitting | LifecyclePhase::Processing)
    }
}

/// Structured failure classification surfaced to the presentation
/// layer.  Replaces the error-message string matching the service's
/// web client used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The account balance does not cover the preset price.
    InsufficientFunds,
    /// No platform credential was available for the request.
    AuthContextMissing,
    /// The job id is unknown to the service.  The controller recovers
    /// from this silently; it is surfaced only from non-polling calls.
    JobNotFound,
    /// The overall deadline elapsed.  Advisory, see
    /// [`LifecyclePhase::TimedOut`].
    Timeout,
    /// Anything else: transport failures, 5xx responses, decode errors.
    Generic,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            FailureKind::InsufficientFunds => "insufficient funds",
            FailureKind::AuthContextMissing => "auth context missing",
            FailureKind::JobNotFound => "job not found",
            FailureKind::Timeout => "timed out",
            FailureKind::Generic => "generation failed",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_phases() {
        assert!(LifecyclePhase::Submitting.is_active());
        assert!(LifecyclePhase::Processing.is_active());
        assert!(!LifecyclePhase::Idle.is_active());
        assert!(!LifecyclePhase::Done.is_active());
        assert!(!LifecyclePhase::Failed.is_active());
        assert!(!LifecyclePhase::TimedOut.is_active());
    }

    #[test]
    fn failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::InsufficientFunds).unwrap();
        assert_eq!(json, "\"insufficient_funds\"");
    }
}
