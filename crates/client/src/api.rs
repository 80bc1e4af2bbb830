//! The `JobApi` seam and its wire response types.
//!
//! The lifecycle controller and the CLI talk to the service only
//! through [`JobApi`], so tests can substitute a scripted fake and the
//! HTTP plumbing stays in one place.

use async_trait::async_trait;
use minigen_core::{JobCreateRequest, JobDetail, JobResultPayload, JobStatus, JobSummary, Preset};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Response of `GET /jobs/{id}`.
///
/// Newer service versions embed the result payload once the job is
/// terminal; older ones require a separate result fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResultPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Completion fraction in `[0, 1]`, when the service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

/// Response of `GET /jobs/{id}/result`.
///
/// The service answers `202` with `{status}` while the job is still
/// running and `409` with `{status: "failed", error}` after a failure;
/// both decode into this type rather than erroring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResultResponse {
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResultPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of `GET /jobs?mine=true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobList {
    pub items: Vec<JobSummary>,
    pub total: u64,
}

/// Response of `GET /presets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetList {
    pub items: Vec<Preset>,
}

/// Response of `GET /credits/balance` and `POST /billing/topup`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CreditBalance {
    pub balance: i64,
}

/// One credit ledger transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub delta: i64,
    pub reason: String,
}

/// Response of `GET /credits/ledger`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerList {
    pub items: Vec<LedgerEntry>,
    pub total: u64,
}

/// Response of the `POST /auth/*` token exchanges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokenResponse {
    pub access_token: String,
}

/// Consumed REST surface of the generation service.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// `POST /jobs` -- submit a generation job.
    async fn create_job(&self, request: &JobCreateRequest) -> Result<JobDetail, ApiError>;

    /// `GET /jobs/{id}` -- current status, with the result embedded
    /// when the service version supports it.
    async fn job_status(&self, id: &str) -> Result<JobStatusResponse, ApiError>;

    /// `GET /jobs/{id}/result` -- fetch the result of a terminal job.
    async fn job_result(&self, id: &str) -> Result<JobResultResponse, ApiError>;

    /// `POST /jobs/{id}/cancel` -- cancel a queued or running job.
    async fn cancel_job(&self, id: &str) -> Result<JobDetail, ApiError>;

    /// `GET /jobs?mine=true` -- paginated history listing.
    async fn list_jobs(&self, limit: u32, offset: u32) -> Result<JobList, ApiError>;

    /// `GET /presets` -- available job templates.
    async fn list_presets(&self) -> Result<PresetList, ApiError>;

    /// `GET /credits/balance`.
    async fn balance(&self) -> Result<CreditBalance, ApiError>;

    /// `GET /credits/ledger` -- paginated transaction history.
    async fn list_ledger(&self, limit: u32, offset: u32) -> Result<LedgerList, ApiError>;

    /// `POST /billing/topup` -- mock top-up; returns the new balance.
    async fn topup(&self, amount: i64) -> Result<CreditBalance, ApiError>;
}
