use thiserror::Error;

/// Errors surfaced by the session store and the HTTP helpers.
///
/// `Network` and `Timeout` mean the backend never answered. `Http`,
/// `InvalidCode` and `Parse` mean it did, and the message is safe to show.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("{0}")]
    Validation(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Invalid or expired code: {0}")]
    InvalidCode(String),
    #[error("Response error: {0}")]
    Parse(String),
}

impl AuthError {
    /// The request never got an answer from the backend.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, AuthError::Network(_) | AuthError::Timeout(_))
    }

    /// The backend answered and rejected or garbled the request.
    #[must_use]
    pub fn is_business(&self) -> bool {
        matches!(
            self,
            AuthError::Http { .. } | AuthError::InvalidCode(_) | AuthError::Parse(_)
        )
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
