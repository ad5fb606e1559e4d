//! # Campus (school portal session gate)
//!
//! `campus` is the client-side authentication and navigation core of the
//! school portal. It talks to the portal's REST backend over a cookie-based
//! session and decides, for every navigation, whether a page renders or the
//! visitor is redirected.
//!
//! ## Roles
//!
//! A session belongs to exactly one of four roles (`admin`, `teacher`,
//! `student`, `parent`), or to nobody. Switching roles always requires a new
//! login; the session is never edited in place.
//!
//! ## Fail-closed
//!
//! Anything that prevents the session check from confirming an identity
//! (network error, `401`, unknown role) is treated as anonymous. The backend
//! remains the only real access control; the route table here is a UX gate.

pub mod cli;
pub mod portal;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
