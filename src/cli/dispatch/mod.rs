use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::portal::Role;
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;

fn required(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .map(ToString::to_string)
        .ok_or_else(|| anyhow!("missing required argument: --{name}"))
}

fn secret(matches: &ArgMatches, name: &str) -> Result<SecretString> {
    required(matches, name).map(SecretString::from)
}

pub fn handler(matches: &ArgMatches) -> Result<(Action, GlobalArgs)> {
    let mut globals = GlobalArgs::new(required(matches, "api-url")?);
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        globals.set_timeout(*timeout);
    }

    let action = match matches.subcommand() {
        Some(("shell", _)) => Action::Shell,
        Some(("route", sub_m)) => Action::Route {
            path: sub_m
                .get_one::<String>("path")
                .map(ToString::to_string)
                .context("missing path")?,
            role: sub_m.get_one::<Role>("as").copied(),
        },
        Some(("session", _)) => Action::Session,
        Some(("login", sub_m)) => Action::Login {
            role: sub_m
                .get_one::<Role>("role")
                .copied()
                .context("missing required argument: --role")?,
            email: required(sub_m, "email")?,
            password: secret(sub_m, "password")?,
        },
        Some(("forgot-password", sub_m)) => Action::ForgotPassword {
            email: required(sub_m, "email")?,
        },
        Some(("reset-password", sub_m)) => Action::ResetPassword {
            email: required(sub_m, "email")?,
            code: required(sub_m, "code")?,
            new_password: secret(sub_m, "new-password")?,
        },
        _ => return Err(anyhow!("unknown subcommand")),
    };

    Ok((action, globals))
}
