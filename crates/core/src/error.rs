//! Domain-level error type shared across the workspace.

/// Errors produced by core validation and payload construction.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Input failed a validation rule (missing required field, bad
    /// enum value, malformed number, ...).
    #[error("Validation error: {0}")]
    Validation(String),
}
