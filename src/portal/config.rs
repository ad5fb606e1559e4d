//! Client configuration: where the portal API lives and how long a request may
//! take. Values come from CLI flags or their environment fallbacks. Nothing
//! here is secret.

use super::errors::AuthError;
use std::time::Duration;
use url::Url;

/// Default request timeout applied to every HTTP call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: Url,
    pub timeout: Duration,
}

impl AppConfig {
    /// Validates the API base URL. Only `http` and `https` with a host are accepted.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` when the URL cannot be used as an API base.
    pub fn new(api_base_url: &str, timeout: Duration) -> Result<Self, AuthError> {
        let url = Url::parse(api_base_url.trim())
            .map_err(|err| AuthError::Config(format!("invalid API URL {api_base_url}: {err}")))?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(AuthError::Config(format!(
                    "unsupported scheme {scheme} in API URL"
                )))
            }
        }

        if url.host().is_none() {
            return Err(AuthError::Config(
                "invalid API URL: no host specified".to_string(),
            ));
        }

        if timeout.is_zero() {
            return Err(AuthError::Config("timeout must be positive".to_string()));
        }

        Ok(Self {
            api_base_url: url,
            timeout,
        })
    }

    /// Joins an endpoint path onto the base URL, keeping any base path prefix.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.api_base_url.as_str().trim_end_matches('/');
        format!("{}/{}", base, path.trim().trim_start_matches('/'))
    }
}
