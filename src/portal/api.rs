//! HTTP helpers for the portal's JSON API. Every request goes through one
//! cookie-carrying client so the server-side session cookie set at login is
//! sent back on later calls. Request and response bodies are never logged.

use super::{config::AppConfig, errors::AuthError};
use crate::APP_USER_AGENT;
use reqwest::{Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

/// Maximum number of error body characters surfaced to the UI.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    config: AppConfig,
}

impl ApiClient {
    /// Builds a client with a cookie jar, the configured timeout and the
    /// crate user agent.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if the TLS backend cannot be initialized.
    pub fn new(config: AppConfig) -> Result<Self, AuthError> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .cookie_store(true)
            .timeout(config.timeout)
            .build()
            .map_err(|err| AuthError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { http, config })
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Fetches JSON with the session cookie.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AuthError> {
        let response = self.send(Method::GET, path, None::<&()>).await?;
        handle_json_response(response).await
    }

    /// Posts JSON and parses a JSON response.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AuthError> {
        let response = self.send(Method::POST, path, Some(body)).await?;
        handle_json_response(response).await
    }

    /// Posts an empty body and ignores whatever the server returns on success.
    pub async fn post_empty(&self, path: &str) -> Result<(), AuthError> {
        let response = self.send(Method::POST, path, None::<&()>).await?;
        handle_empty_response(response).await
    }

    /// Posts JSON; an empty success body yields `T::default()`.
    pub async fn post_json_or_default<B: Serialize, T: DeserializeOwned + Default>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AuthError> {
        let response = self.send(Method::POST, path, Some(body)).await?;
        handle_json_or_default(response).await
    }

    /// Patches JSON; an empty success body yields `T::default()`.
    pub async fn patch_json_or_default<B: Serialize, T: DeserializeOwned + Default>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AuthError> {
        let response = self.send(Method::PATCH, path, Some(body)).await?;
        handle_json_or_default(response).await
    }

    #[instrument(skip(self, body))]
    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, AuthError> {
        let url = self.config.endpoint(path);
        let mut request = self.http.request(method, &url);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(map_request_error)?;

        debug!("{} -> {}", url, response.status());

        Ok(response)
    }
}

/// Maps transport failures into `Timeout` or `Network`.
fn map_request_error(err: reqwest::Error) -> AuthError {
    if err.is_timeout() {
        AuthError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        AuthError::Config(format!("Failed to build request: {err}"))
    } else {
        AuthError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Parses JSON responses and surfaces HTTP errors with sanitized bodies.
async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, AuthError> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| AuthError::Parse(format!("Failed to decode response: {err}")))
    } else {
        Err(http_error(response).await)
    }
}

/// Like `handle_json_response`, but a 2xx with no body (204 or empty 200)
/// is an acknowledgement, not a decoding failure.
async fn handle_json_or_default<T: DeserializeOwned + Default>(
    response: Response,
) -> Result<T, AuthError> {
    if !response.status().is_success() {
        return Err(http_error(response).await);
    }

    let body = response.text().await.map_err(map_request_error)?;
    decode_or_default(&body)
}

fn decode_or_default<T: DeserializeOwned + Default>(body: &str) -> Result<T, AuthError> {
    if body.trim().is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(body)
        .map_err(|err| AuthError::Parse(format!("Failed to decode response: {err}")))
}

/// Handles responses whose body carries nothing the caller needs.
async fn handle_empty_response(response: Response) -> Result<(), AuthError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(http_error(response).await)
    }
}

async fn http_error(response: Response) -> AuthError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    AuthError::Http {
        status,
        message: error_message(&body),
    }
}

/// Picks the server's `message` (or `error`) member when the body is JSON,
/// otherwise the raw body, trimmed and truncated.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ["message", "error"]
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str).map(str::to_owned))
    });

    sanitize_body(from_json.as_deref().unwrap_or(body))
}

/// Sanitizes HTTP error bodies for user-facing messages by trimming and truncating.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
