//! The polling session: status loop, result loop, ticker.
//!
//! One session per submitted job.  A single task drives the status
//! loop, awaiting each fetch before scheduling the next tick, so two
//! status fetches for the same job are never in flight concurrently.
//! A sibling task drives the 1 Hz elapsed counter.  Both stop when the
//! session's [`CancellationToken`] fires; the poll task cancels that
//! token itself on every exit path, so reaching a terminal state tears
//! the whole session down.

use std::sync::Arc;

use minigen_client::JobApi;
use minigen_core::{FailureKind, JobResultPayload, JobStatus, LifecyclePhase};
use minigen_store::SessionStore;
use tokio::sync::watch;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::state::LifecycleState;

/// Everything one polling session needs.
pub(crate) struct PollSession {
    pub api: Arc<dyn JobApi>,
    pub store: Arc<SessionStore>,
    pub state: Arc<watch::Sender<LifecycleState>>,
    pub job_id: String,
    pub interval: Duration,
    /// Overall deadline, measured from submission.
    pub deadline: Instant,
    pub cancel: CancellationToken,
}

/// How the status loop ended.
enum PollOutcome {
    /// Terminal status observed; result still needs fetching.
    NeedsResult(JobStatus),
    /// Session is fully resolved (done/failed/idle/timed-out).
    Settled,
    /// Cancelled externally.
    Cancelled,
}

impl PollSession {
    /// Drive the session to completion.
    pub async fn run(self) {
        let outcome = self.status_loop().await;
        if let PollOutcome::NeedsResult(terminal) = outcome {
            self.result_loop(terminal).await;
        }
        // Stop the ticker (and any future session work) regardless of
        // how the loops ended.
        self.cancel.cancel();
    }

    // ---- status loop ----

    async fn status_loop(&self) -> PollOutcome {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return PollOutcome::Cancelled,
                _ = tokio::time::sleep_until(self.deadline) => {
                    self.mark_timed_out();
                    return PollOutcome::Settled;
                }
                _ = ticker.tick() => {}
            }

            // Strictly sequential: the next tick cannot fire until this
            // fetch resolves.
            match self.api.job_status(&self.job_id).await {
                Ok(response) => {
                    let status = response.status;
                    let embedded = response.result.clone();

                    if let Some(result) = &embedded {
                        self.persist_result(result);
                    }
                    self.state.send_modify(|s| {
                        s.status = Some(status);
                        s.progress = response.progress;
                        if embedded.is_some() {
                            s.result = embedded.clone();
                        }
                    });

                    if !status.is_terminal() {
                        continue;
                    }

                    tracing::debug!(job_id = %self.job_id, ?status, "Job reached terminal status");

                    if embedded.is_some() {
                        // Result came with the status response; no
                        // separate result fetch.
                        self.settle(status, response.error);
                        return PollOutcome::Settled;
                    }
                    if status == JobStatus::Failed {
                        if let Some(message) = response.error {
                            self.fail(FailureKind::Generic, Some(message));
                            return PollOutcome::Settled;
                        }
                    }
                    return PollOutcome::NeedsResult(status);
                }
                Err(e) if e.is_not_found() => {
                    self.reset_to_idle();
                    return PollOutcome::Settled;
                }
                Err(e) => {
                    // Transient: the next tick retries, bounded by the
                    // overall deadline.
                    tracing::warn!(job_id = %self.job_id, error = %e, "Status fetch failed, will retry");
                }
            }

            if Instant::now() >= self.deadline {
                self.mark_timed_out();
                return PollOutcome::Settled;
            }
        }
    }

    // ---- result loop ----

    async fn result_loop(&self, terminal: JobStatus) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = tokio::time::sleep_until(self.deadline) => {
                    self.mark_timed_out();
                    return;
                }
                _ = ticker.tick() => {}
            }

            match self.api.job_result(&self.job_id).await {
                Ok(response) => {
                    if let Some(result) = response.result {
                        self.persist_result(&result);
                        self.state.send_modify(|s| s.result = Some(result));
                        self.settle(terminal, response.error);
                        return;
                    }
                    if let Some(message) = response.error {
                        self.fail(FailureKind::Generic, Some(message));
                        return;
                    }
                    // Result not materialized yet; keep polling.
                }
                Err(e) if e.is_not_found() => {
                    self.reset_to_idle();
                    return;
                }
                Err(e) => {
                    tracing::warn!(job_id = %self.job_id, error = %e, "Result fetch failed, will retry");
                }
            }

            if Instant::now() >= self.deadline {
                self.mark_timed_out();
                return;
            }
        }
    }

    // ---- state transitions ----

    /// Enter the terminal phase matching the observed status.
    fn settle(&self, status: JobStatus, error: Option<String>) {
        if status == JobStatus::Failed {
            self.fail(FailureKind::Generic, error);
        } else {
            self.state.send_modify(|s| {
                s.phase = LifecyclePhase::Done;
                s.status = Some(status);
                s.failure = None;
                s.error = None;
            });
        }
    }

    fn fail(&self, failure: FailureKind, error: Option<String>) {
        self.state.send_modify(|s| {
            s.phase = LifecyclePhase::Failed;
            s.failure = Some(failure);
            s.error = error.clone();
        });
    }

    /// The job disappeared server-side.  Deliberate recovery rule:
    /// drop the cached id/result and return to idle without surfacing
    /// an error.
    fn reset_to_idle(&self) {
        tracing::info!(job_id = %self.job_id, "Job unknown to service, resetting to idle");
        if let Err(e) = self.store.clear_last_job() {
            tracing::warn!(error = %e, "Failed to clear cached job");
        }
        self.state.send_modify(|s| *s = LifecycleState::idle());
    }

    /// Deadline elapsed before a terminal status.  The job id is kept
    /// so the user can re-check manually later.
    fn mark_timed_out(&self) {
        tracing::info!(job_id = %self.job_id, "Polling deadline elapsed");
        self.state.send_modify(|s| {
            s.phase = LifecyclePhase::TimedOut;
            s.timed_out = true;
        });
    }

    fn persist_result(&self, result: &JobResultPayload) {
        if let Err(e) = self.store.set_last_job_result(result) {
            tracing::warn!(error = %e, "Failed to persist job result");
        }
    }
}

/// 1 Hz elapsed-seconds counter, independent of the poll cadence so
/// the readout stays smooth.  Derives from the submission instant, not
/// from poll responses.
pub(crate) async fn run_elapsed_ticker(
    state: Arc<watch::Sender<LifecycleState>>,
    started: Instant,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {
                state.send_modify(|s| {
                    s.elapsed_secs = started.elapsed().as_secs();
                });
            }
        }
    }
}
