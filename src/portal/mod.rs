//! Portal core: the session store that talks to the backend, and the route
//! table that turns a session snapshot plus a path into render or redirect.
//!
//! ## Data flow
//!
//! 1. A UI action calls a `SessionStore` method (one HTTP call).
//! 2. The store replaces its `Snapshot` in one step.
//! 3. The `Navigator` sees the change and re-runs `routes::authorize`.
//! 4. The UI draws the resulting `Screen`.
//!
//! ## Endpoints
//!
//! - `POST /auth/login/{role}` returns `{status, data}`
//! - `GET /auth/session` returns `{data, role}`
//! - `POST /auth/logout`
//! - `POST /auth/password-reset/request` with `{email}`
//! - `PATCH /auth/password-reset/confirm` with `{email, otp_code, newPassword}`

pub mod api;
pub mod config;
pub mod errors;
pub mod navigator;
pub mod role;
pub mod routes;
pub mod session;
pub mod store;

pub use api::ApiClient;
pub use config::AppConfig;
pub use errors::AuthError;
pub use navigator::{Navigator, Screen};
pub use role::Role;
pub use routes::{authorize, Access, Decision, View};
pub use session::{Identity, Operation, Session, SessionCheck, Snapshot};
pub use store::{Credentials, ResetNotice, SessionStore};
