//! Platform auth context.
//!
//! The service authenticates every call with a bearer token minted by
//! one of three exchanges: Telegram init data, VK launch params, or
//! the dev bypass.  The client treats all of them as opaque inputs --
//! verifying them is the server's job.

/// Platform the client is embedded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Telegram,
    Vk,
    /// Standalone web / dev runs.
    Web,
}

/// Credential material for one session.
///
/// Created at startup and handed to [`HttpApi`](crate::http::HttpApi);
/// there is no global mutable token cache.
#[derive(Debug, Clone)]
pub struct AuthContext {
    platform: Platform,
    /// Signed platform payload to exchange for a token, if present.
    init_data: Option<String>,
    /// Bearer token, once an exchange has happened (or was restored
    /// from the session store).
    token: Option<String>,
}

impl AuthContext {
    /// Context for a Telegram mini-app launch.
    pub fn telegram(init_data: impl Into<String>) -> Self {
        Self {
            platform: Platform::Telegram,
            init_data: Some(init_data.into()),
            token: None,
        }
    }

    /// Context for a VK mini-app launch.
    pub fn vk(launch_params: impl Into<String>) -> Self {
        Self {
            platform: Platform::Vk,
            init_data: Some(launch_params.into()),
            token: None,
        }
    }

    /// Plain web context; relies on a restored token or the dev
    /// bypass exchange.
    pub fn web() -> Self {
        Self {
            platform: Platform::Web,
            init_data: None,
            token: None,
        }
    }

    /// Attach an already-known bearer token (e.g. restored from the
    /// session store).
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Signed platform payload, if the launch provided one.
    pub fn init_data(&self) -> Option<&str> {
        self.init_data.as_deref()
    }

    /// Current bearer token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Replace the bearer token after a successful exchange.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Whether any credential exists to authenticate a request with.
    pub fn has_credentials(&self) -> bool {
        self.token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_restores_credentials() {
        let ctx = AuthContext::web();
        assert!(!ctx.has_credentials());

        let ctx = ctx.with_token("tok");
        assert!(ctx.has_credentials());
        assert_eq!(ctx.token(), Some("tok"));
    }

    #[test]
    fn telegram_context_carries_init_data_but_no_token() {
        let ctx = AuthContext::telegram("query_id=abc");
        assert_eq!(ctx.platform(), Platform::Telegram);
        assert_eq!(ctx.init_data(), Some("query_id=abc"));
        assert!(!ctx.has_credentials());
    }
}
