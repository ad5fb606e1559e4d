pub mod auth;
pub mod route;
pub mod shell;

use crate::portal::{Role, Screen};
use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Shell,
    Route {
        path: String,
        role: Option<Role>,
    },
    Session,
    Login {
        role: Role,
        email: String,
        password: SecretString,
    },
    ForgotPassword {
        email: String,
    },
    ResetPassword {
        email: String,
        code: String,
        new_password: SecretString,
    },
}

/// One-line rendering of a screen for terminal output.
#[must_use]
pub fn describe(screen: &Screen) -> String {
    match screen {
        Screen::Loading { location } => format!("{location}  [checking session...]"),
        Screen::View {
            location,
            view,
            params,
        } => {
            let mut line = format!("{location}  [{}]", view.title());
            for (name, value) in params.iter() {
                line.push_str(&format!(" {name}={value}"));
            }
            line
        }
    }
}
