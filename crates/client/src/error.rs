//! API error type and failure classification.
//!
//! The service reports domain rejections as machine-readable codes in
//! the JSON error body (`insufficient_funds`, `job_not_found`, ...).
//! [`ApiError`] carries that code as data and classifies it into a
//! [`FailureKind`] -- no display-string matching anywhere.

use minigen_core::FailureKind;
use serde::Deserialize;

/// Errors from the REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("API error ({status}): {}", code.as_deref().unwrap_or("<no code>"))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Machine-readable error code from the response body, if the
        /// body carried one.
        code: Option<String>,
    },

    /// No credential was available; the request was never issued.
    #[error("No auth credential available")]
    MissingCredentials,
}

/// Error body shapes the service emits: FastAPI-style `{"detail": ..}`
/// or `{"error": .., "code": ..}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiError {
    /// Build a status error, extracting the machine-readable code from
    /// the raw response body when possible.
    pub fn from_status(status: u16, body: &str) -> Self {
        let code = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.code.or(parsed.detail).or(parsed.error));
        ApiError::Status { status, code }
    }

    /// HTTP status code, when this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the service reported the resource as unknown.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Classify into the structured failure taxonomy the presentation
    /// layer renders.
    pub fn classify(&self) -> FailureKind {
        match self {
            ApiError::MissingCredentials => FailureKind::AuthContextMissing,
            ApiError::Status { status: 401, .. } => FailureKind::AuthContextMissing,
            ApiError::Status { status: 404, .. } => FailureKind::JobNotFound,
            ApiError::Status { status: 402, .. } => FailureKind::InsufficientFunds,
            ApiError::Status { code: Some(code), .. } if code == "insufficient_funds" => {
                FailureKind::InsufficientFunds
            }
            _ => FailureKind::Generic,
        }
    }
}
