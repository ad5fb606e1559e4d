//! Session store: the single owner of "who is signed in". Views and the
//! navigator hold clones of the same store and observe it through a watch
//! channel; only the methods here replace the snapshot.
//!
//! Session-mutating calls (`login_as`, `logout`, `check_session`) are queued
//! behind one fair async mutex, so their completions cannot race each other.
//! Password-reset calls never touch the session and run freely.

use super::{
    api::ApiClient,
    errors::AuthError,
    role::Role,
    session::{Identity, Operation, Session, SessionCheck, Snapshot},
};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};

/// HTTP statuses the confirm endpoint uses for a wrong or expired code.
const INVALID_CODE_STATUSES: [u16; 4] = [400, 401, 410, 422];

/// Login form input. The password is never logged.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        Self {
            email: email.into(),
            password,
        }
    }
}

/// Server acknowledgement for password-reset calls.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ResetNotice {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Deserialize)]
struct SessionResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    role: Option<String>,
}

#[derive(Serialize)]
struct ResetRequest<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct ResetConfirmRequest<'a> {
    email: &'a str,
    otp_code: &'a str,
    #[serde(rename = "newPassword")]
    new_password: &'a str,
}

#[derive(Clone, Debug)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    api: ApiClient,
    state: watch::Sender<Snapshot>,
    mutation: Mutex<()>,
}

impl SessionStore {
    /// Creates a store that has not checked the session yet.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self::from_snapshot(api, Snapshot::default())
    }

    /// Creates a settled store around a known session, skipping the start-up
    /// check. `None` yields a settled anonymous store.
    #[must_use]
    pub fn with_session(api: ApiClient, session: Option<Session>) -> Self {
        let snapshot = session.map_or_else(Snapshot::anonymous, Snapshot::signed_in);
        Self::from_snapshot(api, snapshot)
    }

    fn from_snapshot(api: ApiClient, snapshot: Snapshot) -> Self {
        let (state, _) = watch::channel(snapshot);
        Self {
            inner: Arc::new(Inner {
                api,
                state,
                mutation: Mutex::new(()),
            }),
        }
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.inner.state.borrow().session.clone()
    }

    /// Receiver that wakes on every snapshot replacement.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.state.subscribe()
    }

    /// Signs in against the role-specific endpoint. On success the returned
    /// identity replaces whatever session was active; on failure nothing
    /// changes and the error is returned for display.
    #[instrument(skip(self, credentials))]
    pub async fn login_as(
        &self,
        role: Role,
        credentials: &Credentials,
    ) -> Result<Session, AuthError> {
        let email = credentials.email.trim();
        let password = credentials.password.expose_secret();
        if email.is_empty() || password.trim().is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required.".to_string(),
            ));
        }

        let _in_flight = InFlight::enter(&self.inner.state, Operation::Login);
        let _serial = self.inner.mutation.lock().await;

        let request = LoginRequest { email, password };
        let response: LoginResponse = self
            .inner
            .api
            .post_json(&format!("/auth/login/{role}"), &request)
            .await
            .inspect_err(|err| warn!("login as {role} failed: {err}"))?;

        let identity = response
            .data
            .filter(|data| !data.is_null())
            .map(Identity::new)
            .ok_or_else(|| {
                AuthError::Parse("Login response did not include an identity.".to_string())
            })?;

        let session = Session::new(role, identity);
        self.replace(Some(session.clone()));

        info!("signed in as {role}");

        Ok(session)
    }

    /// Asks the backend for the cookie session. Any failure, including an
    /// unknown role, clears the local session.
    #[instrument(skip(self))]
    pub async fn check_session(&self) -> SessionCheck {
        let _in_flight = InFlight::enter(&self.inner.state, Operation::CheckSession);
        let _serial = self.inner.mutation.lock().await;

        let check = match self
            .inner
            .api
            .get_json::<SessionResponse>("/auth/session")
            .await
        {
            Ok(response) => classify_session(response),
            Err(err) => {
                debug!("session check failed, treating as signed out: {err}");
                SessionCheck::Unauthenticated
            }
        };

        self.replace(check.clone().into_session());

        check
    }

    /// Ends the server session. The local session is cleared only when the
    /// call itself succeeds; a failed call leaves it as it was.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AuthError> {
        let _in_flight = InFlight::enter(&self.inner.state, Operation::Logout);
        let _serial = self.inner.mutation.lock().await;

        self.inner
            .api
            .post_empty("/auth/logout")
            .await
            .inspect_err(|err| warn!("logout failed: {err}"))?;

        self.replace(None);

        info!("signed out");

        Ok(())
    }

    /// Sends a one-time code to `email`. Does not touch the session.
    #[instrument(skip(self, email))]
    pub async fn request_password_reset(&self, email: &str) -> Result<ResetNotice, AuthError> {
        let email = email.trim();
        validate_email(email)?;

        let _in_flight = InFlight::enter(&self.inner.state, Operation::RequestReset);

        self.inner
            .api
            .post_json_or_default("/auth/password-reset/request", &ResetRequest { email })
            .await
    }

    /// Replaces the password using the one-time code. A rejected code comes
    /// back as `AuthError::InvalidCode`. Does not touch the session.
    #[instrument(skip(self, email, code, new_password))]
    pub async fn confirm_password_reset(
        &self,
        email: &str,
        code: &str,
        new_password: &SecretString,
    ) -> Result<ResetNotice, AuthError> {
        let email = email.trim();
        let code = code.trim();
        validate_email(email)?;
        if code.is_empty() {
            return Err(AuthError::Validation("The reset code is required.".to_string()));
        }
        if new_password.expose_secret().trim().is_empty() {
            return Err(AuthError::Validation("A new password is required.".to_string()));
        }

        let _in_flight = InFlight::enter(&self.inner.state, Operation::ConfirmReset);

        let request = ResetConfirmRequest {
            email,
            otp_code: code,
            new_password: new_password.expose_secret(),
        };

        self.inner
            .api
            .patch_json_or_default("/auth/password-reset/confirm", &request)
            .await
            .map_err(|err| match err {
                AuthError::Http { status, message } if INVALID_CODE_STATUSES.contains(&status) => {
                    AuthError::InvalidCode(message)
                }
                other => other,
            })
    }

    /// Swaps the session in one step and marks the store as settled.
    fn replace(&self, session: Option<Session>) {
        self.inner.state.send_modify(|snapshot| {
            snapshot.session = session;
            snapshot.hydrated = true;
        });
    }
}

fn classify_session(response: SessionResponse) -> SessionCheck {
    let Some(role) = response.role.as_deref() else {
        debug!("session response without role");
        return SessionCheck::Unauthenticated;
    };

    let role = match role.parse::<Role>() {
        Ok(role) => role,
        Err(err) => {
            warn!("{err}, treating as signed out");
            return SessionCheck::Unauthenticated;
        }
    };

    match response.data {
        Some(data) if !data.is_null() => SessionCheck::Authenticated {
            role,
            identity: Identity::new(data),
        },
        _ => SessionCheck::Unauthenticated,
    }
}

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    if valid_email(email) {
        Ok(())
    } else {
        Err(AuthError::Validation(
            "A valid email address is required.".to_string(),
        ))
    }
}

/// Marks an operation as in flight for as long as the guard lives. Dropping
/// the guard (return, `?`, or the future being dropped) releases the flag.
struct InFlight<'a> {
    state: &'a watch::Sender<Snapshot>,
    operation: Operation,
}

impl<'a> InFlight<'a> {
    fn enter(state: &'a watch::Sender<Snapshot>, operation: Operation) -> Self {
        state.send_modify(|snapshot| snapshot.pending.enter(operation));
        Self { state, operation }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let operation = self.operation;
        self.state
            .send_modify(|snapshot| snapshot.pending.leave(operation));
    }
}
