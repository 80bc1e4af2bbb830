//! Fixed storage keys.
//!
//! These mirror the keys the service's web client used in browser
//! localStorage, so a reader familiar with one can find the other.

/// Id of the most recently submitted job.
pub const LAST_JOB_ID: &str = "last_job_id";
/// JSON-serialized result of the most recent job.
pub const LAST_JOB_RESULT: &str = "last_job_result";
/// Bearer token from the auth exchange.
pub const AUTH_TOKEN: &str = "auth_token";
/// Dev bypass flag ("true" when set).
pub const DEV_MODE: &str = "dev_mode";
