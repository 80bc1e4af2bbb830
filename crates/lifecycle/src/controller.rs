//! The job lifecycle controller.
//!
//! One controller per app session.  It owns at most one polling
//! session at a time (the per-job exclusivity invariant): a new
//! submission or resume cancels the previous session before spawning
//! tasks, so no orphaned timer keeps mutating state.

use std::collections::BTreeMap;
use std::sync::Arc;

use minigen_client::JobApi;
use minigen_core::{CoreError, FieldValue, JobStatus, LifecyclePhase, Preset};
use minigen_store::SessionStore;
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::PollConfig;
use crate::poll::{run_elapsed_ticker, PollSession};
use crate::state::LifecycleState;

/// Handles of the currently running session's tasks.
struct ActiveSession {
    cancel: CancellationToken,
    poll_task: tokio::task::JoinHandle<()>,
    ticker_task: tokio::task::JoinHandle<()>,
}

/// Orchestrates submit -> poll status -> fetch result for one job at a
/// time and exposes the current [`LifecycleState`] for rendering.
pub struct JobLifecycleController {
    api: Arc<dyn JobApi>,
    store: Arc<SessionStore>,
    config: PollConfig,
    state: Arc<watch::Sender<LifecycleState>>,
    session: Mutex<Option<ActiveSession>>,
    /// Master token; cancelled on shutdown.  Sessions run under child
    /// tokens.
    cancel: CancellationToken,
}

impl JobLifecycleController {
    /// Create a controller.  The initial state is idle, seeded with
    /// the cached job id and result from the store (best-effort
    /// display data, never authoritative).
    pub fn new(api: Arc<dyn JobApi>, store: Arc<SessionStore>, config: PollConfig) -> Self {
        let mut initial = LifecycleState::idle();
        initial.job_id = store.last_job_id();
        initial.result = store.last_job_result();

        let (state_tx, _) = watch::channel(initial);

        Self {
            api,
            store,
            config,
            state: Arc::new(state_tx),
            session: Mutex::new(None),
            cancel: CancellationToken::new(),
        }
    }

    /// Subscribe to state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Current state snapshot.
    pub fn current(&self) -> LifecycleState {
        self.state.borrow().clone()
    }

    /// Submit a job built from `preset` and the filled `values`.
    ///
    /// Returns `Err` only for client-side validation failures (missing
    /// required field); every service-side failure is surfaced through
    /// the state as a classified `Failed` phase.  On success the job
    /// id is persisted before the first poll tick fires.
    pub async fn submit(
        &self,
        preset: &Preset,
        values: &BTreeMap<String, FieldValue>,
    ) -> Result<(), CoreError> {
        let request = preset.build_request(values)?;
        let config = self.config.for_preset(preset);

        self.stop_session().await;

        // A fresh session must never show the previous job's data.
        let eta_secs = config.eta.map(|eta| eta.as_secs());
        self.state.send_modify(|s| {
            *s = LifecycleState::idle();
            s.phase = LifecyclePhase::Submitting;
            s.eta_secs = eta_secs;
        });

        let started = Instant::now();

        tracing::info!(
            preset_id = %preset.id,
            job_type = %preset.job_type,
            network_id = %preset.network_id,
            "Submitting generation job",
        );

        let detail = match self.api.create_job(&request).await {
            Ok(detail) => detail,
            Err(e) => {
                let failure = e.classify();
                tracing::warn!(error = %e, ?failure, "Job submission failed");
                self.state.send_modify(|s| {
                    s.phase = LifecyclePhase::Failed;
                    s.failure = Some(failure);
                    s.error = Some(e.to_string());
                });
                return Ok(());
            }
        };

        if let Err(e) = self.store.set_last_job_id(&detail.id) {
            tracing::warn!(error = %e, "Failed to persist job id");
        }

        let status = detail.status;
        self.state.send_modify(|s| {
            s.phase = LifecyclePhase::Processing;
            s.job_id = Some(detail.id.clone());
            s.status = Some(status);
        });

        tracing::info!(job_id = %detail.id, "Job accepted, starting poll session");
        self.spawn_session(detail.id, config, started).await;
        Ok(())
    }

    /// Re-attach to the stored job id and poll it to completion.
    ///
    /// Used at startup (the web client's status page did the same on
    /// mount) and for a manual re-check after a timeout.  A no-op when
    /// nothing is stored.
    pub async fn resume(&self) {
        let Some(job_id) = self.store.last_job_id() else {
            tracing::debug!("No stored job id, nothing to resume");
            return;
        };

        self.stop_session().await;

        let eta_secs = self.config.eta.map(|eta| eta.as_secs());
        self.state.send_modify(|s| {
            *s = LifecycleState::idle();
            s.phase = LifecyclePhase::Processing;
            s.job_id = Some(job_id.clone());
            s.status = Some(JobStatus::Unknown);
            s.eta_secs = eta_secs;
        });

        tracing::info!(job_id = %job_id, "Resuming poll session for stored job");
        self.spawn_session(job_id, self.config, Instant::now()).await;
    }

    /// Tear down any active session without touching the state.  The
    /// stored job id survives, so [`resume`](Self::resume) still works.
    pub async fn stop(&self) {
        self.stop_session().await;
    }

    /// Cancel everything; the controller is unusable afterwards.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.stop_session().await;
    }

    // ---- private helpers ----

    async fn spawn_session(&self, job_id: String, config: PollConfig, started: Instant) {
        let cancel = self.cancel.child_token();

        let session = PollSession {
            api: Arc::clone(&self.api),
            store: Arc::clone(&self.store),
            state: Arc::clone(&self.state),
            job_id,
            interval: config.interval,
            deadline: started + config.timeout,
            cancel: cancel.clone(),
        };
        let poll_task = tokio::spawn(session.run());

        let ticker_task = tokio::spawn(run_elapsed_ticker(
            Arc::clone(&self.state),
            started,
            cancel.clone(),
        ));

        let mut slot = self.session.lock().await;
        *slot = Some(ActiveSession {
            cancel,
            poll_task,
            ticker_task,
        });
    }

    /// Cancel the active session's token and wait for its tasks to
    /// exit, so no task mutates state after this returns.
    async fn stop_session(&self) {
        let session = self.session.lock().await.take();
        if let Some(session) = session {
            session.cancel.cancel();
            let _ = session.poll_task.await;
            let _ = session.ticker_task.await;
        }
    }
}
