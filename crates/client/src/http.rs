//! `reqwest`-backed implementation of [`JobApi`].
//!
//! One [`HttpApi`] per session.  The bearer token lives behind a lock
//! so the auth exchange can install it after construction; everything
//! else is immutable configuration.

use std::sync::RwLock;

use async_trait::async_trait;
use minigen_core::{JobCreateRequest, JobDetail};

use crate::api::{
    AuthTokenResponse, CreditBalance, JobApi, JobList, JobResultResponse, JobStatusResponse,
    LedgerList, PresetList,
};
use crate::auth::{AuthContext, Platform};
use crate::error::ApiError;

/// HTTP client for the generation service.
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    auth: RwLock<AuthContext>,
}

impl HttpApi {
    /// Create a client for the service at `base_url` (e.g.
    /// `https://host/api/v1`, no trailing slash).
    pub fn new(base_url: impl Into<String>, auth: AuthContext) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            auth: RwLock::new(auth),
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (connection pooling across several API instances).
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        auth: AuthContext,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            auth: RwLock::new(auth),
        }
    }

    /// Base URL of the service.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current bearer token, if one is installed.
    pub fn token(&self) -> Option<String> {
        self.auth
            .read()
            .expect("auth lock poisoned")
            .token()
            .map(str::to_string)
    }

    /// Install a bearer token (restored from the session store or
    /// returned by [`login`](Self::login)).
    pub fn set_token(&self, token: &str) {
        self.auth.write().expect("auth lock poisoned").set_token(token);
    }

    /// Exchange the platform credential for a bearer token and install
    /// it.  Which exchange runs depends on the [`AuthContext`]:
    /// Telegram init data, VK launch params, or the dev bypass for
    /// plain web.  A no-op if a token is already installed.
    pub async fn login(&self) -> Result<String, ApiError> {
        let (platform, init_data, existing) = {
            let auth = self.auth.read().expect("auth lock poisoned");
            (
                auth.platform(),
                auth.init_data().map(str::to_string),
                auth.token().map(str::to_string),
            )
        };

        if let Some(token) = existing {
            return Ok(token);
        }

        let response = match platform {
            Platform::Telegram => {
                let init_data = init_data.ok_or(ApiError::MissingCredentials)?;
                self.exchange("/auth/telegram", &serde_json::json!({ "initData": init_data }))
                    .await?
            }
            Platform::Vk => {
                let launch_params = init_data.ok_or(ApiError::MissingCredentials)?;
                self.exchange("/auth/vk", &serde_json::json!({ "launchParams": launch_params }))
                    .await?
            }
            Platform::Web => self.exchange("/auth/dev", &serde_json::json!({})).await?,
        };

        self.set_token(&response.access_token);
        tracing::info!(platform = ?platform, "Authenticated with generation service");
        Ok(response.access_token)
    }

    // ---- private helpers ----

    async fn exchange(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<AuthTokenResponse, ApiError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Bearer token for an authenticated request, or
    /// [`ApiError::MissingCredentials`] without touching the network.
    fn bearer(&self) -> Result<String, ApiError> {
        self.token().ok_or(ApiError::MissingCredentials)
    }

    fn get(&self, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        Ok(self
            .client
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(self.bearer()?))
    }

    fn post(&self, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        Ok(self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(self.bearer()?))
    }

    /// Ensure the response has a success status code, or build an
    /// [`ApiError::Status`] carrying the decoded error code.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl JobApi for HttpApi {
    async fn create_job(&self, request: &JobCreateRequest) -> Result<JobDetail, ApiError> {
        let response = self.post("/jobs")?.json(request).send().await?;
        Self::parse_response(response).await
    }

    async fn job_status(&self, id: &str) -> Result<JobStatusResponse, ApiError> {
        let response = self.get(&format!("/jobs/{id}"))?.send().await?;
        Self::parse_response(response).await
    }

    async fn job_result(&self, id: &str) -> Result<JobResultResponse, ApiError> {
        let response = self.get(&format!("/jobs/{id}/result"))?.send().await?;
        let status = response.status();

        // 202 (still running) is a success status; 409 (failed) carries
        // the same body shape.  Decode both instead of erroring.
        if status.is_success() || status.as_u16() == 409 {
            let body = response.text().await?;
            if let Ok(parsed) = serde_json::from_str::<JobResultResponse>(&body) {
                return Ok(parsed);
            }
            return Err(ApiError::from_status(status.as_u16(), &body));
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status.as_u16(), &body))
    }

    async fn cancel_job(&self, id: &str) -> Result<JobDetail, ApiError> {
        let response = self.post(&format!("/jobs/{id}/cancel"))?.send().await?;
        Self::parse_response(response).await
    }

    async fn list_jobs(&self, limit: u32, offset: u32) -> Result<JobList, ApiError> {
        let response = self
            .get(&format!("/jobs?mine=true&limit={limit}&offset={offset}"))?
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn list_presets(&self) -> Result<PresetList, ApiError> {
        let response = self.get("/presets")?.send().await?;
        Self::parse_response(response).await
    }

    async fn balance(&self) -> Result<CreditBalance, ApiError> {
        let response = self.get("/credits/balance")?.send().await?;
        Self::parse_response(response).await
    }

    async fn list_ledger(&self, limit: u32, offset: u32) -> Result<LedgerList, ApiError> {
        let response = self
            .get(&format!("/credits/ledger?limit={limit}&offset={offset}"))?
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn topup(&self, amount: i64) -> Result<CreditBalance, ApiError> {
        let response = self
            .post("/billing/topup")?
            .json(&serde_json::json!({ "amount": amount }))
            .send()
            .await?;
        Self::parse_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn authenticated_call_without_token_never_hits_network() {
        // Unroutable base URL: if the guard failed we would see a
        // transport error instead of MissingCredentials.
        let api = HttpApi::new("http://invalid.localdomain", AuthContext::web());
        let result = api.job_status("job-1").await;
        assert_matches!(result, Err(ApiError::MissingCredentials));
    }

    #[tokio::test]
    async fn login_is_noop_when_token_already_installed() {
        let api = HttpApi::new(
            "http://invalid.localdomain",
            AuthContext::web().with_token("tok"),
        );
        assert_eq!(api.login().await.unwrap(), "tok");

        let bare = HttpApi::new("http://invalid.localdomain", AuthContext::web());
        bare.set_token("later");
        assert_eq!(bare.login().await.unwrap(), "later");
    }

    #[test]
    fn result_response_decodes_pending_and_failed_bodies() {
        let pending: JobResultResponse =
            serde_json::from_str(r#"{"status":"started"}"#).unwrap();
        assert_eq!(pending.status, minigen_core::JobStatus::Processing);
        assert!(pending.result.is_none());

        let failed: JobResultResponse =
            serde_json::from_str(r#"{"status":"failed","error":"boom"}"#).unwrap();
        assert_eq!(failed.status, minigen_core::JobStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }
}
