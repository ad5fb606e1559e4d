use crate::cli::{
    actions::{describe, Action},
    globals::GlobalArgs,
};
use crate::portal::{ApiClient, Identity, Navigator, Session, SessionStore};
use anyhow::Result;
use serde_json::json;

/// Resolve a path for a fabricated session. No request is sent.
pub fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    if let Action::Route { path, role } = action {
        let session = role.map(|role| Session::new(role, Identity::new(json!({ "role": role }))));
        let api = ApiClient::new(globals.config()?)?;
        let mut navigator = Navigator::new(SessionStore::with_session(api, session));

        let screen = navigator.navigate(&path);
        if screen.location() != path {
            println!("{path} -> redirected");
        }
        println!("{}", describe(&screen));
    }

    Ok(())
}
