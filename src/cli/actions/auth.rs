use crate::cli::{
    actions::{describe, Action},
    globals::GlobalArgs,
};
use crate::portal::{
    routes::ROOT, ApiClient, AuthError, Credentials, Navigator, SessionCheck, SessionStore,
};
use anyhow::{bail, Result};
use tracing::debug;

/// Handle the one-shot session actions
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let store = SessionStore::new(ApiClient::new(globals.config()?)?);

    match action {
        Action::Session => match store.check_session().await {
            SessionCheck::Authenticated { role, identity } => {
                let name = identity.display_name().unwrap_or_else(|| "unknown".to_string());
                println!("signed in as {role}: {name}");
            }
            SessionCheck::Unauthenticated => println!("not signed in"),
        },

        Action::Login {
            role,
            email,
            password,
        } => {
            let credentials = Credentials::new(email, password);
            let session = store.login_as(role, &credentials).await?;
            debug!("session role: {}", session.role);

            let mut navigator = Navigator::new(store);
            println!("{}", describe(&navigator.navigate(ROOT)));
        }

        Action::ForgotPassword { email } => {
            let notice = store.request_password_reset(&email).await?;
            println!(
                "{}",
                notice
                    .message
                    .unwrap_or_else(|| format!("A reset code was sent to {email}"))
            );
        }

        Action::ResetPassword {
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
            Err(AuthError::InvalidCode(message)) => {
                bail!("the reset code is invalid or has expired: {message}")
            }
            Err(err) => return Err(err.into()),
        },

        Action::Shell | Action::Route { .. } => bail!("not a session action"),
    }

    Ok(())
}
