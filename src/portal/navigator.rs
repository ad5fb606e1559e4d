//! The app loop around the route table: holds the current location, follows
//! redirects and re-evaluates whenever the session store publishes a change.

use super::{
    routes::{self, Decision, Params, View},
    session::{Session, Snapshot},
    store::SessionStore,
};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Upper bound on redirect hops for one navigation.
const MAX_REDIRECTS: usize = 4;

/// What the user is looking at after a navigation settles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Loading {
        location: String,
    },
    View {
        location: String,
        view: View,
        params: Params,
    },
}

impl Screen {
    #[must_use]
    pub fn location(&self) -> &str {
        match self {
            Screen::Loading { location } | Screen::View { location, .. } => location,
        }
    }

    #[must_use]
    pub fn view(&self) -> Option<View> {
        match self {
            Screen::Loading { .. } => None,
            Screen::View { view, .. } => Some(*view),
        }
    }
}

pub struct Navigator {
    store: SessionStore,
    changes: watch::Receiver<Snapshot>,
    location: String,
    /// Session and loading state behind the last rendered screen.
    seen: (Option<Session>, bool),
}

fn route_state(snapshot: &Snapshot) -> (Option<Session>, bool) {
    (snapshot.session.clone(), snapshot.is_loading())
}

impl Navigator {
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        let changes = store.subscribe();
        let seen = route_state(&changes.borrow());
        Self {
            store,
            changes,
            location: routes::ROOT.to_string(),
            seen,
        }
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Runs the start-up session check, then shows the current location.
    pub async fn boot(&mut self) -> Screen {
        self.store.check_session().await;
        self.refresh()
    }

    /// Opens `path`, following redirects until a page renders.
    pub fn navigate(&mut self, path: &str) -> Screen {
        self.location = path.to_string();
        self.refresh()
    }

    /// Re-evaluates the current location against the latest snapshot.
    pub fn refresh(&mut self) -> Screen {
        let snapshot = self.changes.borrow_and_update().clone();
        self.seen = route_state(&snapshot);
        self.resolve(&snapshot)
    }

    /// Waits until the session or the loading state differs from the last
    /// rendered screen and returns the re-evaluated screen, or `None` once
    /// the store is gone. Writes that only toggle in-flight flags are skipped.
    pub async fn changed(&mut self) -> Option<Screen> {
        let seen = self.seen.clone();
        self.changes
            .wait_for(|snapshot| route_state(snapshot) != seen)
            .await
            .ok()?;
        Some(self.refresh())
    }

    fn resolve(&mut self, snapshot: &Snapshot) -> Screen {
        for _ in 0..=MAX_REDIRECTS {
            match routes::authorize(&self.location, snapshot) {
                Decision::Loading => {
                    return Screen::Loading {
                        location: self.location.clone(),
                    }
                }
                Decision::Render { view, params } => {
                    return Screen::View {
                        location: self.location.clone(),
                        view,
                        params,
                    }
                }
                Decision::Redirect(target) => {
                    debug!("redirect {} -> {}", self.location, target);
                    self.location = target.to_string();
                }
            }
        }

        warn!("too many redirects ending at {}", self.location);

        Screen::View {
            location: self.location.clone(),
            view: View::NotFound,
            params: Params::default(),
        }
    }
}
