//! Interactive portal session. Keeps one store (and its cookie jar) alive
//! across commands so a login carries over to later navigations.

use crate::cli::{actions::describe, globals::GlobalArgs};
use crate::portal::{
    routes::{self, ROOT},
    ApiClient, AuthError, Credentials, Navigator, Role, SessionStore,
};
use anyhow::Result;
use secrecy::SecretString;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
commands:
  open <path>                         navigate to a page
  login <role> <email> <password>     sign in as admin, teacher, student or parent
  logout                              sign out
  session                             re-check the session with the server
  whoami                              show the signed-in identity
  forgot <email>                      request a password reset code
  reset <email> <code> <new-password> set a new password with a reset code
  routes                              list pages reachable without redirect
  help                                show this help
  quit                                leave the shell";

#[derive(Debug)]
pub enum ShellCommand {
    Open(String),
    Login {
        role: Role,
        email: String,
        password: SecretString,
    },
    Logout,
    Session,
    Whoami,
    Forgot(String),
    Reset {
        email: String,
        code: String,
        new_password: SecretString,
    },
    Routes,
    Help,
    Quit,
    Empty,
}

/// Parses one input line. `open` takes the rest of the line so paths with
/// spaces work.
pub fn parse(line: &str) -> std::result::Result<ShellCommand, String> {
    let line = line.trim();
    let (name, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(name, rest)| (name, rest.trim()));
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match (name, args.as_slice()) {
        ("", _) => ShellCommand::Empty,
        ("open", _) if !rest.is_empty() => ShellCommand::Open(rest.to_string()),
        ("login", [role, email, password]) => ShellCommand::Login {
            role: role.parse::<Role>().map_err(|err| err.to_string())?,
            email: (*email).to_string(),
            password: SecretString::from((*password).to_string()),
        },
        ("logout", []) => ShellCommand::Logout,
        ("session", []) => ShellCommand::Session,
        ("whoami", []) => ShellCommand::Whoami,
        ("forgot", [email]) => ShellCommand::Forgot((*email).to_string()),
        ("reset", [email, code, new_password]) => ShellCommand::Reset {
            email: (*email).to_string(),
            code: (*code).to_string(),
            new_password: SecretString::from((*new_password).to_string()),
        },
        ("routes", []) => ShellCommand::Routes,
        ("help" | "?", _) => ShellCommand::Help,
        ("quit" | "exit", []) => ShellCommand::Quit,
        _ => return Err(format!("cannot parse `{line}`, type `help`")),
    };

    Ok(command)
}

/// Handle the shell action
pub async fn handle(globals: &GlobalArgs) -> Result<()> {
    let store = SessionStore::new(ApiClient::new(globals.config()?)?);
    let mut navigator = Navigator::new(store);

    println!("{}", describe(&navigator.navigate(ROOT)));
    println!("{}", describe(&navigator.boot().await));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} > ", navigator.location());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse(&line) {
            Ok(ShellCommand::Quit) => break,
            Ok(command) => execute(&mut navigator, command).await,
            Err(message) => println!("{message}"),
        }
    }

    Ok(())
}

async fn execute(navigator: &mut Navigator, command: ShellCommand) {
    let store = navigator.store().clone();

    match command {
        ShellCommand::Open(path) => println!("{}", describe(&navigator.navigate(&path))),
        ShellCommand::Login {
            role,
            email,
            password,
        } => match store
            .login_as(role, &Credentials::new(email, password))
            .await
        {
            Ok(_) => println!("{}", describe(&navigator.refresh())),
            Err(err) => report(&err),
        },
        ShellCommand::Logout => match store.logout().await {
            Ok(()) => println!("{}", describe(&navigator.refresh())),
            Err(err) => report(&err),
        },
        ShellCommand::Session => {
            store.check_session().await;
            println!("{}", describe(&navigator.refresh()));
        }
        ShellCommand::Whoami => match store.session() {
            Some(session) => println!(
                "{} {}",
                session.role,
                session
                    .identity
                    .display_name()
                    .unwrap_or_else(|| session.identity.as_json().to_string())
            ),
            None => println!("not signed in"),
        },
        ShellCommand::Forgot(email) => match store.request_password_reset(&email).await {
            Ok(notice) => println!(
                "{}",
                notice
                    .message
                    .unwrap_or_else(|| format!("A reset code was sent to {email}"))
            ),
            Err(err) => report(&err),
        },
        ShellCommand::Reset {
            email,
            code,
            new_password,
        } => match store
            .confirm_password_reset(&email, &code, &new_password)
            .await
        {
            Ok(notice) => println!(
                "{}",
                notice
                    .message
                    .unwrap_or_else(|| "Password updated".to_string())
            ),
            Err(err) => report(&err),
        },
        ShellCommand::Routes => {
            for route in routes::reachable(store.snapshot().role()) {
                println!("  {:<50} {}", route.pattern, route.view.title());
            }
        }
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Quit | ShellCommand::Empty => {}
    }
}

fn report(err: &AuthError) {
    match err {
        AuthError::InvalidCode(_) => println!("the reset code is invalid or has expired"),
        err if err.is_transport() => println!("cannot reach the portal: {err}"),
        err => println!("{err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn open_keeps_spaces_in_path() {
        match parse("open /about us").unwrap() {
            ShellCommand::Open(path) => assert_eq!(path, "/about us"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn login_parses_role_and_secret() {
        match parse("login teacher frizzle@school.test magic-bus").unwrap() {
            ShellCommand::Login {
                role,
                email,
                password,
            } => {
                assert_eq!(role, Role::Teacher);
                assert_eq!(email, "frizzle@school.test");
                assert_eq!(password.expose_secret(), "magic-bus");
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(parse("login janitor a@b.c pw").is_err());
        assert!(parse("login teacher a@b.c").is_err());
    }

    #[test]
    fn simple_commands() {
        assert!(matches!(parse("  "), Ok(ShellCommand::Empty)));
        assert!(matches!(parse("logout"), Ok(ShellCommand::Logout)));
        assert!(matches!(parse("exit"), Ok(ShellCommand::Quit)));
        assert!(matches!(parse("routes"), Ok(ShellCommand::Routes)));
        assert!(matches!(parse("forgot p@school.test"), Ok(ShellCommand::Forgot(_))));
        assert!(matches!(
            parse("reset p@school.test 123456 n3w"),
            Ok(ShellCommand::Reset { .. })
        ));
        assert!(parse("open").is_err());
        assert!(parse("dance").is_err());
    }
}
