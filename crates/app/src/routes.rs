//! The route table and its resolution against the session state.
//!
//! Public routes and unknown paths bypass the guard entirely; everything
//! else runs through `hims_auth::evaluate` with the route's required-role
//! set.

use hims_auth::{Role, RouteOutcome, SessionView, evaluate};

const STAFF: &[Role] = &[Role::Admin, Role::Warden];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    /// Signed-in users of any role.
    Authenticated,
    Roles(&'static [Role]),
}

struct Route {
    path: &'static str,
    access: Access,
}

const ROUTES: &[Route] = &[
    Route {
        path: "/auth",
        access: Access::Public,
    },
    Route {
        path: "/unauthorized",
        access: Access::Public,
    },
    Route {
        path: "/",
        access: Access::Authenticated,
    },
    Route {
        path: "/settings",
        access: Access::Authenticated,
    },
    Route {
        path: "/students",
        access: Access::Roles(STAFF),
    },
    Route {
        path: "/inventory",
        access: Access::Roles(STAFF),
    },
    Route {
        path: "/hostels",
        access: Access::Roles(STAFF),
    },
    Route {
        path: "/allocations",
        access: Access::Roles(STAFF),
    },
    Route {
        path: "/reports",
        access: Access::Roles(ADMIN_ONLY),
    },
];

/// Where a navigation attempt ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Render the page at this path.
    Page(&'static str),
    /// Session state is still bootstrapping.
    Loading,
    /// User known, role still being fetched.
    CheckingPermissions,
    RedirectToLogin { from: String },
    RedirectToDenied,
    NotFound,
}

pub struct Router;

impl Router {
    pub fn resolve(path: &str, view: &SessionView) -> Navigation {
        let Some(route) = ROUTES.iter().find(|r| r.path == path) else {
            return Navigation::NotFound;
        };

        let required = match route.access {
            Access::Public => return Navigation::Page(route.path),
            Access::Authenticated => None,
            Access::Roles(roles) => Some(roles),
        };

        match evaluate(required, view, path) {
            RouteOutcome::Render => Navigation::Page(route.path),
            RouteOutcome::Loading => Navigation::Loading,
            RouteOutcome::CheckingPermissions => Navigation::CheckingPermissions,
            RouteOutcome::RedirectToLogin { from } => Navigation::RedirectToLogin { from },
            RouteOutcome::RedirectToDenied => Navigation::RedirectToDenied,
        }
    }

    pub fn paths() -> impl Iterator<Item = &'static str> {
        ROUTES.iter().map(|r| r.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hims_core::UserId;

    fn resolved(role: Option<Role>) -> SessionView {
        SessionView {
            user: Some(UserId::new()),
            role,
            is_loading: false,
        }
    }

    #[test]
    fn public_routes_bypass_the_guard_even_while_loading() {
        let loading = SessionView::loading();
        assert_eq!(Router::resolve("/auth", &loading), Navigation::Page("/auth"));
        assert_eq!(
            Router::resolve("/unauthorized", &loading),
            Navigation::Page("/unauthorized")
        );
    }

    #[test]
    fn unknown_paths_are_not_found_regardless_of_session() {
        assert_eq!(
            Router::resolve("/nope", &SessionView::anonymous()),
            Navigation::NotFound
        );
        assert_eq!(
            Router::resolve("/nope", &resolved(Some(Role::Admin))),
            Navigation::NotFound
        );
    }

    #[test]
    fn anonymous_users_are_sent_to_login_with_the_origin_path() {
        assert_eq!(
            Router::resolve("/students", &SessionView::anonymous()),
            Navigation::RedirectToLogin {
                from: "/students".to_string()
            }
        );
    }

    #[test]
    fn role_gates_per_route() {
        let warden = resolved(Some(Role::Warden));
        assert_eq!(Router::resolve("/", &warden), Navigation::Page("/"));
        assert_eq!(
            Router::resolve("/students", &warden),
            Navigation::Page("/students")
        );
        assert_eq!(Router::resolve("/reports", &warden), Navigation::RedirectToDenied);

        let student = resolved(Some(Role::Student));
        assert_eq!(Router::resolve("/settings", &student), Navigation::Page("/settings"));
        assert_eq!(Router::resolve("/inventory", &student), Navigation::RedirectToDenied);

        let admin = resolved(Some(Role::Admin));
        assert_eq!(Router::resolve("/reports", &admin), Navigation::Page("/reports"));
    }

    #[test]
    fn pending_role_holds_gated_routes_only() {
        let pending = resolved(None);
        assert_eq!(
            Router::resolve("/hostels", &pending),
            Navigation::CheckingPermissions
        );
        // No role requirement set: authenticated is enough.
        assert_eq!(Router::resolve("/", &pending), Navigation::Page("/"));
    }
}
