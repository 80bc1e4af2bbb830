//! `minigen-core` -- shared domain types for the minigen client.
//!
//! Everything that crosses a crate boundary lives here: the job and
//! result wire model, presets and form field values, the lifecycle
//! phase/failure classification, and the core error type.

pub mod error;
pub mod job;
pub mod lifecycle;
pub mod preset;
pub mod types;

pub use error::CoreError;
pub use job::{JobDetail, JobResultPayload, JobStatus, JobSummary, ResultItem, ResultKind};
pub use lifecycle::{FailureKind, LifecyclePhase};
pub use preset::{FieldValue, JobCreateRequest, Preset, PresetField};
