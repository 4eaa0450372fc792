//! Connection settings for the Access API.
//!
//! Credentials are always injected by the caller (the CLI reads them from flags or
//! environment variables); nothing is compiled in.

use std::fmt;
use std::time::Duration;

use crate::error::{AccessError, AccessResult};

pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

#[derive(Clone)]
pub struct AccessConfig {
    pub account_id: String,
    api_token: String,
    pub api_base_url: String,
    /// Per-request timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl AccessConfig {
    /// Build a configuration for the given account and API token.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Config`] when either value is blank.
    pub fn new(account_id: impl Into<String>, api_token: impl Into<String>) -> AccessResult<Self> {
        let account_id = account_id.into().trim().to_string();
        let api_token = api_token.into().trim().to_string();

        if account_id.is_empty() {
            return Err(AccessError::config("account id must not be empty"));
        }
        if api_token.is_empty() {
            return Err(AccessError::config("API token must not be empty"));
        }

        Ok(Self {
            account_id,
            api_token,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: None,
        })
    }

    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    /// Account-scoped Access root, e.g. `.../accounts/{id}/access`.
    pub fn access_base_url(&self) -> String {
        format!("{}/accounts/{}/access", self.api_base_url, self.account_id)
    }
}

impl fmt::Debug for AccessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessConfig")
            .field("account_id", &self.account_id)
            .field("api_token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
