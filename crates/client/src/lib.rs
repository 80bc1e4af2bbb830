//! `minigen-client` -- REST client for the generation service.
//!
//! [`api::JobApi`] is the seam the lifecycle controller polls through;
//! [`http::HttpApi`] is its [`reqwest`]-backed implementation.  Auth
//! credentials (bearer token exchanged from Telegram init data, VK
//! launch params, or the dev bypass) live in [`auth::AuthContext`].

pub mod api;
pub mod auth;
pub mod error;
pub mod http;

pub use api::{
    AuthTokenResponse, CreditBalance, JobApi, JobList, JobResultResponse, JobStatusResponse,
    LedgerEntry, LedgerList, PresetList,
};
pub use auth::{AuthContext, Platform};
pub use error::ApiError;
pub use http::HttpApi;
