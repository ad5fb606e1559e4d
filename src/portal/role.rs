use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Portal roles. A session always belongs to exactly one of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Parent,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Teacher, Role::Student, Role::Parent];

    /// Lowercase name used by the backend in paths and payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Parent => "parent",
        }
    }

    /// Landing page for a signed-in user of this role.
    #[must_use]
    pub const fn dashboard(self) -> &'static str {
        match self {
            Role::Admin => "/admin-dashboard",
            Role::Teacher => "/teacher-dashboard",
            Role::Student => "/student-dashboard",
            Role::Parent => "/parent-dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            "parent" => Ok(Role::Parent),
            _ => Err(UnknownRole(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_backend_spelling() {
        assert_eq!("teacher".parse::<Role>(), Ok(Role::Teacher));
        assert_eq!(" Parent ".parse::<Role>(), Ok(Role::Parent));
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
    }

    #[test]
    fn parse_rejects_unknown_roles() {
        assert_eq!(
            "principal".parse::<Role>(),
            Err(UnknownRole("principal".to_string()))
        );
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn dashboards_are_one_to_one() {
        let mut seen: Vec<&str> = Role::ALL.iter().map(|role| role.dashboard()).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), Role::ALL.len());
        assert_eq!(Role::Student.dashboard(), "/student-dashboard");
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&Role::Teacher).unwrap();
        assert_eq!(json, "\"teacher\"");
        let role: Role = serde_json::from_str("\"student\"").unwrap();
        assert_eq!(role, Role::Student);
    }
}
