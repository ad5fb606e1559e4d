use crate::{portal::Role, GIT_COMMIT_HASH};
use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn validator_role() -> ValueParser {
    ValueParser::from(move |role: &str| -> std::result::Result<Role, String> {
        role.parse::<Role>().map_err(|err| err.to_string())
    })
}

fn email_arg() -> Arg {
    Arg::new("email")
        .short('e')
        .long("email")
        .help("Account email address")
        .env("CAMPUS_EMAIL")
        .required(true)
}

/// Package version plus the commit it was built from.
#[must_use]
pub fn version() -> String {
    format!("{} - {}", env!("CARGO_PKG_VERSION"), GIT_COMMIT_HASH)
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("campus")
        .about("School portal session gate")
        .version(version())
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg(
            Arg::new("api-url")
                .short('u')
                .long("api-url")
                .help("Portal API base URL, example: https://api.school.tld")
                .default_value("http://localhost:3000")
                .env("CAMPUS_API_URL")
                .global(true),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .help("Request timeout in seconds")
                .default_value("10")
                .env("CAMPUS_TIMEOUT")
                .global(true)
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("CAMPUS_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(Command::new("shell").about("Interactive portal session"))
        .subcommand(
            Command::new("route")
                .about("Show what a path resolves to, without contacting the API")
                .arg(
                    Arg::new("path")
                        .help("Path to open, example: /teacher-dashboard")
                        .required(true),
                )
                .arg(
                    Arg::new("as")
                        .long("as")
                        .help("Evaluate as a signed-in role: admin, teacher, student, parent")
                        .value_parser(validator_role()),
                ),
        )
        .subcommand(Command::new("session").about("Check the current session"))
        .subcommand(
            Command::new("login")
                .about("Sign in and show the landing page")
                .arg(
                    Arg::new("role")
                        .short('r')
                        .long("role")
                        .help("admin, teacher, student or parent")
                        .env("CAMPUS_ROLE")
                        .required(true)
                        .value_parser(validator_role()),
                )
                .arg(email_arg())
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("Account password")
                        .env("CAMPUS_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("forgot-password")
                .about("Request a one-time password reset code")
                .arg(email_arg()),
        )
        .subcommand(
            Command::new("reset-password")
                .about("Set a new password with a one-time code")
                .arg(email_arg())
                .arg(
                    Arg::new("code")
                        .short('c')
                        .long("code")
                        .help("One-time code from the reset email")
                        .required(true),
                )
                .arg(
                    Arg::new("new-password")
                        .short('n')
                        .long("new-password")
                        .help("New account password")
                        .env("CAMPUS_NEW_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "campus");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "School portal session gate"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            format!("{} - {}", env!("CARGO_PKG_VERSION"), GIT_COMMIT_HASH)
        );
    }

    #[test]
    fn test_login_args() {
        temp_env::with_vars(
            [
                ("CAMPUS_PASSWORD", None::<&str>),
                ("CAMPUS_EMAIL", None),
                ("CAMPUS_ROLE", None),
                ("CAMPUS_API_URL", None),
            ],
            || {
                let matches = new().get_matches_from(vec![
                    "campus",
                    "login",
                    "--role",
                    "teacher",
                    "--email",
                    "frizzle@school.test",
                    "--password",
                    "magic-bus",
                    "--api-url",
                    "https://api.school.test",
                ]);

                assert_eq!(
                    matches.get_one::<String>("api-url").map(|s| s.to_string()),
                    Some("https://api.school.test".to_string())
                );
                let (name, sub) = matches.subcommand().unwrap();
                assert_eq!(name, "login");
                assert_eq!(sub.get_one::<Role>("role").copied(), Some(Role::Teacher));
                assert_eq!(
                    sub.get_one::<String>("email").map(|s| s.to_string()),
                    Some("frizzle@school.test".to_string())
                );
            },
        );
    }

    #[test]
    fn test_invalid_role_is_rejected() {
        let result = new().try_get_matches_from(vec![
            "campus",
            "route",
            "/",
            "--as",
            "janitor",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("CAMPUS_API_URL", Some("https://api.school.test")),
                ("CAMPUS_TIMEOUT", Some("30")),
                ("CAMPUS_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["campus", "session"]);
                assert_eq!(
                    matches.get_one::<String>("api-url").map(|s| s.to_string()),
                    Some("https://api.school.test".to_string())
                );
                assert_eq!(matches.get_one::<u64>("timeout").copied(), Some(30));
                assert_eq!(matches.get_one::<u8>("verbosity").map(|s| *s), Some(2));
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("CAMPUS_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["campus", "shell"]);
                assert_eq!(
                    matches.get_one::<u8>("verbosity").map(|s| *s),
                    Some(index as u8)
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("CAMPUS_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["campus".to_string(), "shell".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    let v = format!("-{}", "v".repeat(index));
                    args.push(v);
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>("verbosity").map(|s| *s),
                    Some(index as u8)
                );
            });
        }
    }
}
