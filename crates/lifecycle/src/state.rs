//! The state snapshot published to presentation layers.

use minigen_core::{FailureKind, JobResultPayload, JobStatus, LifecyclePhase};

/// Everything a front end needs to render one job session.
///
/// Published through a `watch` channel: subscribers always see the
/// latest snapshot, and intermediate states may be skipped under load.
#[derive(Debug, Clone)]
pub struct LifecycleState {
    pub phase: LifecyclePhase,
    /// Id of the tracked job.  Survives a timeout so the user can
    /// re-check later; cleared only on the silent not-found reset.
    pub job_id: Option<String>,
    /// Last status observed from the service.
    pub status: Option<JobStatus>,
    /// Completion fraction in `[0, 1]` from the last status response,
    /// when the service reported one.
    pub progress: Option<f64>,
    /// Result payload, once one has been observed (possibly restored
    /// from the session store at startup).
    pub result: Option<JobResultPayload>,
    /// Classified failure, set only in the `Failed` phase.
    pub failure: Option<FailureKind>,
    /// Display message accompanying a failure, when the service sent
    /// one.  Never used for classification.
    pub error: Option<String>,
    /// Seconds since submission, driven by the 1 Hz ticker.
    pub elapsed_secs: u64,
    /// Advisory completion estimate from the preset.
    pub eta_secs: Option<u64>,
    /// Set when the overall deadline elapsed (phase `TimedOut`).
    pub timed_out: bool,
}

impl LifecycleState {
    /// The initial, empty state.
    pub fn idle() -> Self {
        Self {
            phase: LifecyclePhase::Idle,
            job_id: None,
            status: None,
            progress: None,
            result: None,
            failure: None,
            error: None,
            elapsed_secs: 0,
            eta_secs: None,
            timed_out: false,
        }
    }

    /// Remaining-time estimate: `max(eta - elapsed, 0)`.  Advisory
    /// only; `None` when the preset carried no ETA.
    pub fn remaining_secs(&self) -> Option<u64> {
        self.eta_secs.map(|eta| eta.saturating_sub(self.elapsed_secs))
    }
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::idle()
    }
}
