//! Session values shared between the store, the route table and the views.
//! A snapshot is always replaced as a whole, never patched field by field.

use super::role::Role;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Profile payload returned by the backend. Its shape varies per role, so it
/// is kept as raw JSON and only read through lenient accessors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(Value);

impl Identity {
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Best-effort label for headers and prompts.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = self.field("name").or_else(|| self.field("full_name")) {
            return Some(name.to_string());
        }

        match (self.field("first_name"), self.field("last_name")) {
            (Some(first), Some(last)) => return Some(format!("{first} {last}")),
            (Some(first), None) => return Some(first.to_string()),
            _ => {}
        }

        self.field("email").map(ToString::to_string)
    }
}

/// The signed-in identity. One role, one payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub role: Role,
    pub identity: Identity,
}

impl Session {
    #[must_use]
    pub fn new(role: Role, identity: Identity) -> Self {
        Self { role, identity }
    }
}

/// Result of asking the backend whether a session exists. Every failure
/// collapses into `Unauthenticated`.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionCheck {
    Authenticated { role: Role, identity: Identity },
    Unauthenticated,
}

impl SessionCheck {
    #[must_use]
    pub fn into_session(self) -> Option<Session> {
        match self {
            SessionCheck::Authenticated { role, identity } => Some(Session::new(role, identity)),
            SessionCheck::Unauthenticated => None,
        }
    }
}

/// Store operations that expose an in-flight flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    CheckSession,
    Login,
    Logout,
    RequestReset,
    ConfirmReset,
}

impl Operation {
    const fn slot(self) -> usize {
        match self {
            Operation::CheckSession => 0,
            Operation::Login => 1,
            Operation::Logout => 2,
            Operation::RequestReset => 3,
            Operation::ConfirmReset => 4,
        }
    }
}

/// Request-scoped flags. Counted so that overlapping calls of the same
/// operation only release the flag when the last one settles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pending {
    counts: [u32; 5],
}

impl Pending {
    #[must_use]
    pub fn is(&self, operation: Operation) -> bool {
        self.counts[operation.slot()] > 0
    }

    #[must_use]
    pub fn any(&self) -> bool {
        self.counts.iter().any(|count| *count > 0)
    }

    pub(crate) fn enter(&mut self, operation: Operation) {
        self.counts[operation.slot()] += 1;
    }

    pub(crate) fn leave(&mut self, operation: Operation) {
        let count = &mut self.counts[operation.slot()];
        *count = count.saturating_sub(1);
    }

    #[must_use]
    pub fn checking_session(&self) -> bool {
        self.is(Operation::CheckSession)
    }

    #[must_use]
    pub fn logging_in(&self) -> bool {
        self.is(Operation::Login)
    }

    #[must_use]
    pub fn logging_out(&self) -> bool {
        self.is(Operation::Logout)
    }
}

/// What readers see: the session, the in-flight flags and whether the
/// session has been settled at least once since start-up.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub session: Option<Session>,
    pub pending: Pending,
    pub hydrated: bool,
}

impl Snapshot {
    /// Settled snapshot with nobody signed in.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            session: None,
            pending: Pending::default(),
            hydrated: true,
        }
    }

    /// Settled snapshot for the given session.
    #[must_use]
    pub fn signed_in(session: Session) -> Self {
        Self {
            session: Some(session),
            pending: Pending::default(),
            hydrated: true,
        }
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.session.as_ref().map(|session| session.role)
    }

    /// True while start-up has not produced an answer yet and nobody is known
    /// to be signed in.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.session.is_none() && (!self.hydrated || self.pending.checking_session())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_name_prefers_full_name_fields() {
        let identity = Identity::new(json!({"name": "Ada Lovelace", "email": "ada@school.test"}));
        assert_eq!(identity.display_name().as_deref(), Some("Ada Lovelace"));

        let identity = Identity::new(json!({"first_name": "Alan", "last_name": "Turing"}));
        assert_eq!(identity.display_name().as_deref(), Some("Alan Turing"));

        let identity = Identity::new(json!({"email": "grace@school.test"}));
        assert_eq!(identity.display_name().as_deref(), Some("grace@school.test"));

        assert_eq!(Identity::new(json!([1, 2])).display_name(), None);
    }

    #[test]
    fn pending_counts_overlapping_calls() {
        let mut pending = Pending::default();
        pending.enter(Operation::RequestReset);
        pending.enter(Operation::RequestReset);
        pending.leave(Operation::RequestReset);
        assert!(pending.is(Operation::RequestReset));
        pending.leave(Operation::RequestReset);
        assert!(!pending.is(Operation::RequestReset));
        assert!(!pending.any());

        pending.leave(Operation::Logout);
        assert!(!pending.logging_out());
    }

    #[test]
    fn loading_only_without_a_known_session() {
        assert!(Snapshot::default().is_loading());
        assert!(!Snapshot::anonymous().is_loading());

        let mut snapshot = Snapshot::anonymous();
        snapshot.pending.enter(Operation::CheckSession);
        assert!(snapshot.is_loading());

        let mut snapshot = Snapshot::signed_in(Session::new(Role::Parent, Identity::default()));
        snapshot.pending.enter(Operation::CheckSession);
        assert!(!snapshot.is_loading());
    }

    #[test]
    fn session_check_maps_to_optional_session() {
        let check = SessionCheck::Authenticated {
            role: Role::Admin,
            identity: Identity::new(json!({"id": 1})),
        };
        assert_eq!(check.into_session().map(|s| s.role), Some(Role::Admin));
        assert_eq!(SessionCheck::Unauthenticated.into_session(), None);
    }
}
