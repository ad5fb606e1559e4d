//! Declarative route table and the one function that applies it.
//!
//! Every navigation is checked against the latest session snapshot. Nested
//! pages carry their own rule; being allowed on a dashboard grants nothing
//! for the pages below it. This is a UX gate only, the API enforces access.

use super::{role::Role, session::Snapshot};
use std::borrow::Cow;

/// Public root, where unauthorized visitors are sent.
pub const ROOT: &str = "/";

/// Who may open a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Anyone, signed in or not.
    Public,
    /// Anonymous visitors only; signed-in users go to their dashboard.
    PublicOnly,
    /// Any signed-in user.
    Authenticated,
    /// Signed-in users of exactly this role.
    Only(Role),
}

impl Access {
    #[must_use]
    pub fn allows(self, role: Option<Role>) -> bool {
        match self {
            Access::Public => true,
            Access::PublicOnly => role.is_none(),
            Access::Authenticated => role.is_some(),
            Access::Only(required) => role == Some(required),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Home,
    Login,
    About,
    Contact,
    ForgotPassword,
    Events,
    EventDetail,
    Profile,
    AdminDashboard,
    AdminUsers,
    AdminEvents,
    AdminEventNew,
    AdminEventEdit,
    TeacherDashboard,
    TeacherAttendance,
    TeacherCourse,
    TeacherQuizzes,
    TeacherGrades,
    StudentDashboard,
    StudentGrades,
    StudentAttendance,
    StudentCourse,
    StudentQuiz,
    ParentDashboard,
    ParentChildGrades,
    ParentChildAttendance,
    NotFound,
}

impl View {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Login => "Sign in",
            View::About => "About us",
            View::Contact => "Contact",
            View::ForgotPassword => "Forgot password",
            View::Events => "Events",
            View::EventDetail => "Event",
            View::Profile => "Profile",
            View::AdminDashboard => "Admin dashboard",
            View::AdminUsers => "Users",
            View::AdminEvents => "Manage events",
            View::AdminEventNew => "New event",
            View::AdminEventEdit => "Edit event",
            View::TeacherDashboard => "Teacher dashboard",
            View::TeacherAttendance => "Attendance",
            View::TeacherCourse => "Course",
            View::TeacherQuizzes => "Quizzes",
            View::TeacherGrades => "Grades",
            View::StudentDashboard => "Student dashboard",
            View::StudentGrades => "My grades",
            View::StudentAttendance => "My attendance",
            View::StudentCourse => "Course content",
            View::StudentQuiz => "Quiz",
            View::ParentDashboard => "Parent dashboard",
            View::ParentChildGrades => "Child grades",
            View::ParentChildAttendance => "Child attendance",
            View::NotFound => "Page not found",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Route {
    pub pattern: &'static str,
    pub access: Access,
    pub view: View,
}

const fn route(pattern: &'static str, access: Access, view: View) -> Route {
    Route {
        pattern,
        access,
        view,
    }
}

pub const ROUTES: &[Route] = &[
    route("/", Access::PublicOnly, View::Home),
    route("/login", Access::PublicOnly, View::Login),
    route("/about us", Access::PublicOnly, View::About),
    route("/contact", Access::PublicOnly, View::Contact),
    route("/forgot-password", Access::Public, View::ForgotPassword),
    route("/events", Access::Public, View::Events),
    route("/events/:event_id", Access::Public, View::EventDetail),
    route("/profile", Access::Authenticated, View::Profile),
    route("/admin-dashboard", Access::Only(Role::Admin), View::AdminDashboard),
    route("/admin-dashboard/users", Access::Only(Role::Admin), View::AdminUsers),
    route("/admin-dashboard/events", Access::Only(Role::Admin), View::AdminEvents),
    route("/admin-dashboard/events/new", Access::Only(Role::Admin), View::AdminEventNew),
    route(
        "/admin-dashboard/events/:event_id/edit",
        Access::Only(Role::Admin),
        View::AdminEventEdit,
    ),
    route("/teacher-dashboard", Access::Only(Role::Teacher), View::TeacherDashboard),
    route(
        "/teacher-dashboard/attendance",
        Access::Only(Role::Teacher),
        View::TeacherAttendance,
    ),
    route(
        "/teacher-dashboard/courses/:course_id",
        Access::Only(Role::Teacher),
        View::TeacherCourse,
    ),
    route(
        "/teacher-dashboard/courses/:course_id/quizzes",
        Access::Only(Role::Teacher),
        View::TeacherQuizzes,
    ),
    route(
        "/teacher-dashboard/courses/:course_id/grades",
        Access::Only(Role::Teacher),
        View::TeacherGrades,
    ),
    route("/student-dashboard", Access::Only(Role::Student), View::StudentDashboard),
    route("/student-dashboard/grades", Access::Only(Role::Student), View::StudentGrades),
    route(
        "/student-dashboard/attendance",
        Access::Only(Role::Student),
        View::StudentAttendance,
    ),
    route(
        "/student-dashboard/courses/:course_id",
        Access::Only(Role::Student),
        View::StudentCourse,
    ),
    route(
        "/student-dashboard/quizzes/:quiz_id",
        Access::Only(Role::Student),
        View::StudentQuiz,
    ),
    route("/parent-dashboard", Access::Only(Role::Parent), View::ParentDashboard),
    route(
        "/parent-dashboard/children/:student_id/grades",
        Access::Only(Role::Parent),
        View::ParentChildGrades,
    ),
    route(
        "/parent-dashboard/children/:student_id/attendance",
        Access::Only(Role::Parent),
        View::ParentChildAttendance,
    ),
];

/// Values captured from `:name` segments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params(Vec<(&'static str, String)>);

impl Params {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(key, value)| (*key, value.as_str()))
    }
}

/// Outcome of one navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Start-up session check still running and nobody known yet.
    Loading,
    Render { view: View, params: Params },
    Redirect(&'static str),
}

impl Route {
    /// Matches normalized segments against the pattern, capturing parameters.
    #[must_use]
    pub fn matches(&self, segments: &[String]) -> Option<Params> {
        let pattern: Vec<&'static str> = split(self.pattern).collect();
        if pattern.len() != segments.len() {
            return None;
        }

        let mut params = Vec::new();
        for (expected, actual) in pattern.into_iter().zip(segments) {
            if let Some(name) = expected.strip_prefix(':') {
                params.push((name, actual.clone()));
            } else if expected != actual.as_str() {
                return None;
            }
        }

        Some(Params(params))
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Drops query and fragment, percent-decodes, and splits into segments.
#[must_use]
pub fn normalize(path: &str) -> Vec<String> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let decoded = urlencoding::decode(path).unwrap_or(Cow::Borrowed(path));
    split(&decoded).map(str::to_owned).collect()
}

/// Decides render or redirect for `path` against the built-in table.
#[must_use]
pub fn authorize(path: &str, snapshot: &Snapshot) -> Decision {
    authorize_with(ROUTES, path, snapshot)
}

/// Same policy as [`authorize`] over any table. The first matching route wins.
#[must_use]
pub fn authorize_with(table: &[Route], path: &str, snapshot: &Snapshot) -> Decision {
    if snapshot.is_loading() {
        return Decision::Loading;
    }

    let segments = normalize(path);
    let Some((route, params)) = table
        .iter()
        .find_map(|route| route.matches(&segments).map(|params| (route, params)))
    else {
        return Decision::Render {
            view: View::NotFound,
            params: Params::default(),
        };
    };

    let role = snapshot.role();
    if route.access.allows(role) {
        return Decision::Render {
            view: route.view,
            params,
        };
    }

    match (route.access, role) {
        (Access::PublicOnly, Some(role)) => Decision::Redirect(role.dashboard()),
        _ => Decision::Redirect(ROOT),
    }
}

/// Routes a visitor with `role` may open directly, without redirect.
pub fn reachable(role: Option<Role>) -> impl Iterator<Item = &'static Route> {
    ROUTES.iter().filter(move |route| route.access.allows(role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::session::{Identity, Operation, Session};

    fn as_role(role: Role) -> Snapshot {
        Snapshot::signed_in(Session::new(role, Identity::default()))
    }

    fn renders(decision: &Decision, expected: View) -> bool {
        matches!(decision, Decision::Render { view, .. } if *view == expected)
    }

    #[test]
    fn public_only_pages_send_users_to_their_dashboard() {
        assert_eq!(
            authorize("/", &as_role(Role::Teacher)),
            Decision::Redirect("/teacher-dashboard")
        );
        assert_eq!(
            authorize("/about us", &as_role(Role::Student)),
            Decision::Redirect("/student-dashboard")
        );
        assert_eq!(
            authorize("/login", &as_role(Role::Admin)),
            Decision::Redirect("/admin-dashboard")
        );
        assert_eq!(
            authorize("/contact", &as_role(Role::Parent)),
            Decision::Redirect("/parent-dashboard")
        );
        assert!(renders(&authorize("/", &Snapshot::anonymous()), View::Home));
    }

    #[test]
    fn role_pages_send_others_to_root() {
        assert_eq!(
            authorize("/teacher-dashboard", &Snapshot::anonymous()),
            Decision::Redirect(ROOT)
        );
        assert_eq!(
            authorize("/teacher-dashboard", &as_role(Role::Student)),
            Decision::Redirect(ROOT)
        );
        assert!(renders(
            &authorize("/teacher-dashboard", &as_role(Role::Teacher)),
            View::TeacherDashboard
        ));
    }

    #[test]
    fn public_pages_render_for_everyone() {
        assert!(renders(&authorize("/events", &Snapshot::anonymous()), View::Events));
        for role in Role::ALL {
            assert!(renders(&authorize("/events", &as_role(role)), View::Events));
            assert!(renders(
                &authorize("/forgot-password", &as_role(role)),
                View::ForgotPassword
            ));
        }
    }

    #[test]
    fn nested_pages_check_their_own_role() {
        assert_eq!(
            authorize("/teacher-dashboard/courses/42/grades", &as_role(Role::Parent)),
            Decision::Redirect(ROOT)
        );
        assert_eq!(
            authorize("/parent-dashboard/children/9/grades", &as_role(Role::Student)),
            Decision::Redirect(ROOT)
        );

        let decision = authorize("/teacher-dashboard/courses/42/grades", &as_role(Role::Teacher));
        match decision {
            Decision::Render { view, params } => {
                assert_eq!(view, View::TeacherGrades);
                assert_eq!(params.get("course_id"), Some("42"));
            }
            other => panic!("unexpected decision {other:?}"),
        }
    }

    #[test]
    fn unknown_paths_render_not_found() {
        assert!(renders(&authorize("/nope", &Snapshot::anonymous()), View::NotFound));
        for role in Role::ALL {
            assert!(renders(
                &authorize("/teacher-dashboard/unknown/deep", &as_role(role)),
                View::NotFound
            ));
        }
    }

    #[test]
    fn authenticated_pages_need_any_session() {
        assert_eq!(authorize("/profile", &Snapshot::anonymous()), Decision::Redirect(ROOT));
        for role in Role::ALL {
            assert!(renders(&authorize("/profile", &as_role(role)), View::Profile));
        }
    }

    #[test]
    fn loading_while_start_up_check_runs() {
        assert_eq!(authorize("/events", &Snapshot::default()), Decision::Loading);

        let mut snapshot = Snapshot::anonymous();
        snapshot.pending.enter(Operation::CheckSession);
        assert_eq!(authorize("/nope", &snapshot), Decision::Loading);

        let mut snapshot = as_role(Role::Admin);
        snapshot.pending.enter(Operation::CheckSession);
        assert!(renders(&authorize("/admin-dashboard", &snapshot), View::AdminDashboard));
    }

    #[test]
    fn paths_are_normalized() {
        assert_eq!(normalize("/about%20us"), vec!["about us".to_string()]);
        assert_eq!(normalize("/events/?page=2#top"), vec!["events".to_string()]);
        assert!(normalize("/").is_empty());
        assert!(normalize("").is_empty());
        assert_eq!(
            authorize("/about%20us", &as_role(Role::Student)),
            Decision::Redirect("/student-dashboard")
        );
        assert!(renders(
            &authorize("//student-dashboard//grades/", &as_role(Role::Student)),
            View::StudentGrades
        ));
    }

    #[test]
    fn literal_segments_win_in_table_order() {
        let decision = authorize("/admin-dashboard/events/new", &as_role(Role::Admin));
        assert!(renders(&decision, View::AdminEventNew));
    }

    #[test]
    fn custom_tables_use_the_same_policy() {
        let table = [route("/reports/:term", Access::Only(Role::Admin), View::AdminDashboard)];
        assert_eq!(
            authorize_with(&table, "/reports/fall", &as_role(Role::Teacher)),
            Decision::Redirect(ROOT)
        );
        assert!(renders(
            &authorize_with(&table, "/", &Snapshot::anonymous()),
            View::NotFound
        ));
    }

    #[test]
    fn every_dashboard_is_reachable_by_its_role() {
        for role in Role::ALL {
            assert!(renders(
                &authorize(role.dashboard(), &as_role(role)),
                match role {
                    Role::Admin => View::AdminDashboard,
                    Role::Teacher => View::TeacherDashboard,
                    Role::Student => View::StudentDashboard,
                    Role::Parent => View::ParentDashboard,
                }
            ));
            assert!(reachable(Some(role)).any(|route| route.pattern == role.dashboard()));
        }
        assert!(reachable(None).all(|route| !route.pattern.contains("dashboard")));
    }
}
