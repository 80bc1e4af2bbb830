//! Job wire model: status, summaries, details, and result payloads.
//!
//! The generation service has shipped several status vocabularies over
//! time (`started`/`running` for an executing job, `done`/`succeeded`
//! for a finished one).  [`JobStatus`] folds all of them into five
//! canonical values so the rest of the workspace never sees the raw
//! strings.

use serde::{Deserialize, Serialize};

use crate::types::{JobId, Timestamp};

/// Canonical job status.
///
/// Deserialization accepts every vocabulary the service has used;
/// anything unrecognized becomes [`JobStatus::Unknown`] instead of
/// failing the poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted by the service, not yet picked up by a worker.
    Queued,
    /// A worker is executing the job.
    #[serde(alias = "started", alias = "running")]
    Processing,
    /// Terminal: the job produced a result.
    #[serde(alias = "done", alias = "succeeded")]
    Finished,
    /// Terminal: the job ended with an error.
    #[serde(alias = "error", alias = "canceled", alias = "cancelled")]
    Failed,
    /// Status string the client does not recognize.
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Whether this status is terminal (no further polling required).
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Failed)
    }
}

/// One row in the job history listing (`GET /jobs?mine=true`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    /// Job category: `text`, `image`, `video`, or `audio`.
    pub kind: String,
    pub status: JobStatus,
    pub created_at: Timestamp,
}

/// Full job record as returned by `POST /jobs` and `GET /jobs/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDetail {
    pub id: JobId,
    pub kind: String,
    pub status: JobStatus,
    pub created_at: Timestamp,
    /// Echo of the submission payload (`network_id` + user params).
    #[serde(default)]
    pub params: serde_json::Value,
    /// Present once the job is terminal on newer service versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResultPayload>,
    /// Failure message when `status` is `failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Output media kind of a finished job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Image,
    Video,
    Audio,
    Text,
}

/// One produced artifact: either a file reference or inline text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultItem {
    /// `file` or `text`.
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Item kind constant for file references.
pub const ITEM_KIND_FILE: &str = "file";
/// Item kind constant for inline text.
pub const ITEM_KIND_TEXT: &str = "text";

/// Result payload of a finished job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResultPayload {
    #[serde(rename = "type")]
    pub kind: ResultKind,
    pub items: Vec<ResultItem>,
    /// Raw provider response, kept for debugging displays only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

impl JobResultPayload {
    /// First file item carrying a URL, if any.
    pub fn first_file(&self) -> Option<&ResultItem> {
        self.items
            .iter()
            .find(|item| item.kind == ITEM_KIND_FILE && item.url.is_some())
    }

    /// First text item carrying content, if any.
    pub fn first_text(&self) -> Option<&ResultItem> {
        self.items
            .iter()
            .find(|item| item.kind == ITEM_KIND_TEXT && item.text.is_some())
    }
}
