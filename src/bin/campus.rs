use anyhow::Result;
use campus::cli::{actions, actions::Action, start};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let (action, globals) = start()?;

    // Handle the action
    match action {
        Action::Shell => actions::shell::handle(&globals).await?,
        Action::Route { .. } => actions::route::handle(action, &globals)?,
        Action::Session
        | Action::Login { .. }
        | Action::ForgotPassword { .. }
        | Action::ResetPassword { .. } => actions::auth::handle(action, &globals).await?,
    }

    Ok(())
}
